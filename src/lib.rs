pub mod app;
pub mod auth;
pub mod cli;
pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod search;
pub mod server;
pub mod services;
pub mod types;
pub mod validate;

#[cfg(test)]
pub mod testing;
