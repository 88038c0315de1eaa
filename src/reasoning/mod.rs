// src/reasoning/mod.rs

pub mod chunk;
pub mod clients;
pub mod config;
pub mod controller;
pub mod error;
pub mod event;
pub mod generator;
pub mod instructions;
pub mod memory;
pub mod rewriter;
pub mod session;
pub mod signal;

// Export the loop itself so callers can write reasoning::ReasoningLoop.
pub use controller::ReasoningLoop;
