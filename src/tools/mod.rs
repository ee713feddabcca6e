// src/tools/mod.rs
pub mod stock;
