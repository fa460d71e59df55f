//! sketchstep-session: Guide generation sessions and their I/O edge.
//!
//! Composes the pure analysis of `sketchstep-pipeline` with the renderer
//! of `sketchstep-render`, writes one PNG per step into a session-scoped
//! directory, and describes the run with serializable records. Also hosts
//! the blueprint analysis run and the pluggable record-store and
//! narrative-feedback capabilities.

pub mod analysis;
pub mod config;
pub mod error;
pub mod feedback;
pub mod guide;
pub mod records;
pub mod store;

pub use analysis::{BlueprintReport, analyze_drawing};
pub use config::GuideConfig;
pub use error::SessionError;
pub use feedback::{DrawingFeedback, FeedbackError, FeedbackGenerator, PlaceholderFeedback};
pub use guide::{generate_drawing_steps, generate_session, is_valid_session_id, new_session_id};
pub use records::{SessionRecord, StepRecord};
pub use store::{JsonFileStore, RecordStore, StoredSession};
