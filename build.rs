use std::{env, fs, path::Path};

fn main() {
    // OUT_DIR = target/debug/build/<crate>/out; three levels up is the
    // directory the binary lands in.
    let out_dir = env::var("OUT_DIR").expect("Cannot read OUT_DIR");

    let exe_dir = Path::new(&out_dir)
        .ancestors()
        .nth(3)
        .expect("Cannot find executable directory");

    let src = Path::new("config.json");
    let dst = exe_dir.join("config.json");

    match fs::copy(src, &dst) {
        Ok(_) => println!("cargo:warning=Copied config.json to {}", dst.display()),
        Err(e) => println!("cargo:warning=Could NOT copy config.json: {}", e),
    }
}
