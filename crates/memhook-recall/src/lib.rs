//! memhook-recall: relevance ranking and attention state for memory topic files.
//!
//! Two entry points share one set of stores:
//!
//! - [`run_search`]: a prompt arrives; decay attention, rank the catalog,
//!   tier the winners, boost them and write the result artifact.
//! - [`record_touch`]: a file was used; make it hot and pair it with
//!   everything touched in the trailing window.

pub mod context;
pub mod index;
pub mod scorer;
pub mod search;
pub mod store;
pub mod tier;
pub mod touch;
pub mod tracking;

pub use context::build_subagent_context;
pub use index::{load_index, parse_index};
pub use scorer::{rank, ProvisionalSet, QueryTokens, ScoreBreakdown, ScoredEntry, ScoringContext};
pub use search::{clear_previous_result, run_search, RenderedResult, SearchOutcome};
pub use store::{JsonStore, Loaded, StateStores};
pub use tier::{cleanup_warm_files, Disclosure, Tier};
pub use touch::{record_touch, TouchEvent, TouchOutcome};
pub use tracking::TrackingLog;
