//! The interactive loop and its readiness primitive.
//!
//! - `event_loop` owns the editor and renderer and reacts to keys and
//!   transcript chunks.
//! - `poller` waits on the keyboard and transcript descriptors.

pub mod event_loop;
pub mod poller;

pub use event_loop::{ChatSession, Flow, SessionEnd, SessionOptions};
pub use poller::{wait_either, Readiness};
