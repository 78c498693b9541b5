// Application Layer - Generation Use Cases

pub mod adapters;
pub mod constants;
pub mod orchestrator;
pub mod progress;
pub mod retry;
pub mod session;
pub mod theme;

// Re-exports
pub use adapters::{CaptionAdapter, HashtagsAdapter, InferenceAdapter, MoodThemeAdapter};
pub use orchestrator::GenerationOrchestrator;
pub use progress::{ProgressConfig, ProgressHandle, ProgressReporter};
pub use retry::RetryPolicy;
pub use session::{GenerationSession, JobStatus, SubmitRequest, ThemeView};
pub use theme::ThemeApplier;
