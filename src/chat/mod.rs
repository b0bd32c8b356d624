//! Collaborators around the editor: where lines go, where transcript text
//! comes from, and when to ring the bell.

pub mod bell;
pub mod outbox;
pub mod transcript;

pub use bell::{BellMatcher, PatternFile};
pub use outbox::{AppendFile, LineSink};
pub use transcript::{executable_filter, ChildKiller, TranscriptSource, TranscriptStream};
