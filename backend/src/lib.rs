pub mod auth;
pub mod config;
pub mod errors;
pub mod services;
pub mod session;
pub mod store;
