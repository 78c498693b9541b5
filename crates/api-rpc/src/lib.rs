//! JSON-RPC API Layer
//!
//! Exposes the generation session over JSON-RPC 2.0: submit an upload, poll
//! job status, and drive the auto-theme switch.

pub mod error;
pub mod handler;
pub mod server;
pub mod types;

pub use handler::RpcHandler;
pub use server::{RpcServer, RpcServerConfig};
