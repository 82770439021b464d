// src/models/mod.rs

pub mod assignment;
pub mod category;
pub mod submission;
pub mod user;
