//! Command handlers

pub mod config;
pub mod export;
pub mod import;
pub mod status;
