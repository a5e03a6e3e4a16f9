//! Interaction matching for test doubles.
//!
//! Decides whether a call made against a real or fake object (a recorded
//! interaction) is equivalent to a call declared as expected (a stubbed
//! interaction), and provides a recording proxy that forwards calls to a
//! real object while recording each one.

pub mod config;
pub mod errors;
pub mod fake;
pub mod interaction;
pub mod logging;
pub mod matcher;
pub mod matching;
pub mod proxy;
pub mod recording;
pub mod repository;
pub mod runtime;
pub mod value;

pub use config::{MatchingConfig, MimicConfig};
pub use errors::MimicError;
pub use fake::{Fake, FakeEntity, Stub};
pub use interaction::{CallError, CallResult, ErrorClass, Interaction, Outcome};
pub use matcher::{ArgumentMatcher, Matcher};
pub use matching::{Comparator, Mismatch};
pub use proxy::{Dispatch, RecordingProxy};
pub use repository::{InMemoryInteractionRepository, InteractionRepository};
pub use value::{CustomValue, Value, ValueKind};
