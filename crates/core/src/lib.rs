// SocialSpark Core - Domain Logic, Ports & Generation Orchestration
// NO infrastructure dependencies: HTTP backends and image decoding live in infra crates

pub mod application;
pub mod domain;
pub mod error;
pub mod port;

pub use error::{AppError, Result};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
