pub mod config;
pub mod constants;
pub mod driver;
pub mod engine;
pub mod entity;
pub mod error;
pub mod level;
pub mod library;
pub mod logging;
pub mod rng;
pub mod session;
pub mod tile;
pub mod types;
