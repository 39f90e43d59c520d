//! Request handlers

pub mod admin;
pub mod health;
pub mod platform;
pub mod posts;
