// src/lib.rs

//! AINow aggregation library

pub mod dashboard;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod storage;
pub mod utils;

pub use dashboard::Dashboard;
