//! Provider specific [`TextGenerator`](crate::generator::TextGenerator) implementations.

pub mod openai;
