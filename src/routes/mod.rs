pub mod champion_routes;
pub mod system_routes;
