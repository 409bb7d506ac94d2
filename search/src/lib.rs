//! Cascade setting-key fuzzy search.
//!
//! Provides non-blocking fuzzy search over declared setting keys, split by
//! whether the declaration exposes an instance reader.
//!
//! # Design
//!
//! - Two independent fuzzy indexes: exposed and restricted.
//! - Each index is append-only (Nucleo has no deletions), so we track:
//!   - `injected_keys`: keys injected into Nucleo at least once
//!   - `tombstones`: keys to filter out from search results
//! - Search filters out stale Nucleo entries using tombstones.
//! - Heavy compaction/rebuild runs during periodic maintenance, not on every
//!   search.
//!
//! # Non-blocking API
//!
//! - `set_query()`: Sets the search pattern
//! - `tick()`: Drives search forward without blocking (calls nucleo.tick(0))
//! - `exposed_results()`, `restricted_results()`: Get search results

mod config;
mod engine;

pub use config::{CaseMatching, SearchConfig};
pub use engine::{SearchEngine, SearchQuery, SearchResults};
