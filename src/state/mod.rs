pub mod champions;
