pub mod auth;
pub mod config;
pub mod engine;
pub mod inputs;
pub mod output;
pub mod server;
