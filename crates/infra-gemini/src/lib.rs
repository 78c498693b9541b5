// SocialSpark Infrastructure - Gemini
// Implements the inference ports over the Gemini generateContent REST API

pub mod backend;
pub mod client;
pub mod prompts;

pub use backend::GeminiBackend;
pub use client::{GeminiClient, GeminiConfig, DEFAULT_API_BASE, DEFAULT_MODEL};
