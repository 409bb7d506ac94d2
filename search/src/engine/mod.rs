mod index;
mod query;

use crate::config::{CaseMatching, SearchConfig};
use cascade_core::SettingKey;
use index::Index;
use nucleo::pattern::{CaseMatching as NucleoCaseMatching, Normalization};
use std::sync::Arc;

pub use index::SearchResults;
pub use query::SearchQuery;

pub struct SearchEngine {
    exposed: Index,
    restricted: Index,
    config: SearchConfig,
}

impl SearchEngine {
    /// The `notify` callback is invoked by Nucleo's background worker when new
    /// results are ready.
    pub fn new(
        exposed: Vec<SettingKey>,
        restricted: Vec<SettingKey>,
        config: SearchConfig,
        notify: Arc<dyn Fn() + Send + Sync>,
    ) -> Self {
        Self {
            exposed: Index::new(
                exposed,
                config.rebuild_threshold,
                config.exposed_result_limit,
                notify.clone(),
            ),
            restricted: Index::new(
                restricted,
                config.rebuild_threshold,
                config.restricted_result_limit,
                notify,
            ),
            config,
        }
    }
}

/// Mutation operations.
impl SearchEngine {
    /// Records a declaration whose instance reader is exposed.
    pub fn declare_exposed(&mut self, key: SettingKey) {
        self.restricted.remove(&key);
        self.exposed.insert(key);
    }

    /// Records a node-only declaration (no instance reader).
    pub fn declare_restricted(&mut self, key: SettingKey) {
        self.exposed.remove(&key);
        self.restricted.insert(key);
    }

    /// Drops a key from both indexes, e.g. after a scheme reload.
    pub fn remove(&mut self, key: &SettingKey) {
        self.exposed.remove(key);
        self.restricted.remove(key);
    }
}

/// Search operations.
impl SearchEngine {
    pub fn set_query(&mut self, query: SearchQuery) {
        let SearchQuery::Fuzzy(ref pattern) = query;

        let case_matching = match self.config.case_matching {
            CaseMatching::Sensitive => NucleoCaseMatching::Respect,
            CaseMatching::Insensitive => NucleoCaseMatching::Ignore,
            CaseMatching::Smart => NucleoCaseMatching::Smart,
        };

        let normalization = if self.config.unicode_normalization {
            Normalization::Smart
        } else {
            Normalization::Never
        };

        self.exposed
            .set_pattern(pattern, case_matching, normalization);
        self.restricted
            .set_pattern(pattern, case_matching, normalization);
    }

    /// Returns true if results may have changed.
    pub fn tick(&mut self) -> bool {
        let exposed_changed = self.exposed.tick();
        let restricted_changed = self.restricted.tick();
        exposed_changed || restricted_changed
    }

    pub fn is_done(&self) -> bool {
        self.exposed.is_done() && self.restricted.is_done()
    }

    pub fn exposed_results(&self) -> SearchResults<'_> {
        self.exposed.results()
    }

    pub fn restricted_results(&self) -> SearchResults<'_> {
        self.restricted.results()
    }
}

/// Exact match operations (O(1) lookup).
impl SearchEngine {
    /// Returns true if the key is in the exposed index.
    pub fn has_exposed(&self, key: &SettingKey) -> bool {
        self.exposed.is_present(key)
    }

    /// Returns true if the key is in the restricted index.
    pub fn has_restricted(&self, key: &SettingKey) -> bool {
        self.restricted.is_present(key)
    }

    /// Returns true if the key is in either index.
    pub fn has_key(&self, key: &SettingKey) -> bool {
        self.has_exposed(key) || self.has_restricted(key)
    }
}

/// Maintenance operations.
impl SearchEngine {
    /// Triggers index rebuild if pending deletions exceed the threshold.
    pub fn maintenance_compact(&mut self) {
        self.exposed.rebuild_if_needed();
        self.restricted.rebuild_if_needed();
    }
}
