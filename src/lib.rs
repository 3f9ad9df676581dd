pub mod cli;
pub mod config;
pub mod db;
pub mod entities;
pub mod error;
pub mod extract;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
