// src/services/mod.rs

pub mod gemini;
pub mod generation;
pub mod grading;
pub mod parser;
pub mod prompt;
pub mod quiz_set;
