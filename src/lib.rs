// src/lib.rs

pub mod backend;
pub mod config;
pub mod error;
pub mod feed;
pub mod handlers;
pub mod models;
pub mod mutations;
pub mod routes;
pub mod session;
pub mod state;
pub mod utils;
pub mod views;

pub use routes::create_router;
