//! Spaced-repetition vocabulary trainer.
//!
//! The scheduling core (`scheduler`, `selection`, `stats`) is pure and works
//! on in-memory [`words::Word`] records. `storage` persists them and
//! `session` wires the two together for a caller such as the CLI.

pub mod clock;
pub mod config;
pub mod debug;
pub mod scheduler;
pub mod selection;
pub mod session;
pub mod stats;
pub mod storage;
pub mod words;

pub use scheduler::{Judgment, LadderScheduler, Scheduler};
pub use words::{Group, NewWord, Word};
