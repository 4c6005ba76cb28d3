pub mod champion_service;
pub mod champion_store;
