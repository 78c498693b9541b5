// Domain Layer - Pure business logic and entities

pub mod content;
pub mod error;
pub mod job;
pub mod theme;

// Re-exports
pub use content::{
    AdapterKind, GeneratedContent, JobFailure, JobOutcome, MoodTheme, GENERIC_FAILURE_NOTICE,
};
pub use error::DomainError;
pub use job::{Generation, ImageFormat, ImagePayload, Job, JobId, JobState, MAX_IMAGE_BYTES};
pub use theme::{palette_for, ThemePalette, PALETTE_KEYS};
