// src/lib.rs
pub mod candles;
pub mod classify;
pub mod config;
pub mod data;
pub mod engine;
pub mod errors;
pub mod timeframe;
pub mod zones;
