pub mod config;
pub mod db;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod session;
pub mod store;
pub mod templates_structs;
pub mod viewmodel;
