//! Merge Engine
//!
//! Folds an account's legacy app storages into its combined record:
//! - Stage A: one bucket entry per app id, larger storage wins
//! - Stage B: merge into the existing record, existing keys win
//! - Stage C: strip denylisted app ids before every write

pub mod denylist;
pub mod engine;

pub use denylist::{Denylist, DEPRECATED_APP_IDS};
pub use engine::{MergeDecision, MergeEngine};
