use std::collections::HashMap;

use crate::models::{ColorFilter, Relic};

/// Derived candidate view and current pick of one selection column.
///
/// `labels`, `groups` and `cycle` are rebuilt together by every derivation;
/// `selected`, when present, always refers to a relic inside some group; a
/// derivation that drops it clears it.
#[derive(Debug, Default)]
pub struct ColumnState {
    pub(crate) color: ColorFilter,
    pub(crate) search: String,
    pub(crate) labels: Vec<String>,
    pub(crate) groups: HashMap<String, Vec<Relic>>,
    pub(crate) cycle: HashMap<String, usize>,
    pub(crate) selected: Option<Relic>,
}

impl ColumnState {
    pub fn color(&self) -> ColorFilter {
        self.color
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn selected(&self) -> Option<&Relic> {
        self.selected.as_ref()
    }

    /// All candidate labels, sorted for display.
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Labels with the active search filter applied (case-insensitive
    /// substring). The underlying grouping is untouched.
    pub fn visible_labels(&self) -> Vec<String> {
        if self.search.is_empty() {
            return self.labels.clone();
        }
        let query = self.search.to_lowercase();
        self.labels
            .iter()
            .filter(|label| label.to_lowercase().contains(&query))
            .cloned()
            .collect()
    }

    /// Distinct relics behind one displayed label.
    pub fn group(&self, label: &str) -> Option<&[Relic]> {
        self.groups.get(label).map(Vec::as_slice)
    }

    pub fn cycle_index(&self, label: &str) -> Option<usize> {
        self.cycle.get(label).copied()
    }

    pub(crate) fn selection_survives(&self) -> bool {
        match &self.selected {
            None => true,
            Some(relic) => self.groups.values().any(|group| group.contains(relic)),
        }
    }
}
