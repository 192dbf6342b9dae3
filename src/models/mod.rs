// src/models/mod.rs

pub mod account;
pub mod like;
pub mod post;
