//! Process-wide replacer runtime: shared state, scan cycles and scheduling.

pub mod driver;
pub mod replacer;
pub mod state;

pub use replacer::{
    CycleReport,
    ReplacerError,
    TextReplacer,
};
pub use state::{
    CycleGuard,
    ReplacerState,
};
