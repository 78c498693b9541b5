// Port Layer - Interfaces for external dependencies

pub mod id_provider; // For deterministic testing
pub mod inference;
pub mod presentation;
pub mod time_provider;

// Re-exports
pub use id_provider::IdProvider;
pub use inference::{
    CaptionGenerator, CaptionRequest, FailureKind, HashtagGenerator, HashtagRequest,
    InferenceError, MoodClassifier, MoodRequest,
};
pub use presentation::{InMemoryPresentation, PresentationContext};
pub use time_provider::TimeProvider;
