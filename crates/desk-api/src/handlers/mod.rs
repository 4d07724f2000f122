//! HTTP request handlers

pub mod flags;
pub mod health;
pub mod history;
pub mod threads;
