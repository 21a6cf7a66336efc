pub mod bot;
pub mod carrier;
pub mod classifier;
pub mod config;
pub mod error;
pub mod models;
pub mod monitor;
pub mod store;
pub mod telegram;
