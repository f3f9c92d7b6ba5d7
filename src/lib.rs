pub mod app;
pub mod cli;
pub mod command;
pub mod config;
pub mod controller;
pub mod engine;
pub mod error;
pub mod library;
pub mod logging;
pub mod models;


pub use error::*;
pub use models::*;
