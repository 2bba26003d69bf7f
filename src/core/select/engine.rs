use log::debug;
use std::collections::BTreeMap;

use super::column::ColumnState;
use crate::core::catalog::ColorIndex;
use crate::models::{AttributeSet, ColorFilter, Relic};

pub const COLUMN_COUNT: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleDirection {
    Forward,
    Backward,
}

/// The three-column selection state machine.
///
/// Columns are independent except for mutual exclusion: a relic whose full
/// attribute set equals a sibling column's current selection is never offered
/// as a candidate, so one physical relic cannot be picked twice under
/// different attribute views. All operations on stale labels, empty groups or
/// out-of-range columns are no-ops.
pub struct SelectionEngine {
    index: ColorIndex,
    columns: [ColumnState; COLUMN_COUNT],
}

impl SelectionEngine {
    pub fn new(index: ColorIndex) -> Self {
        let mut engine = Self {
            index,
            columns: Default::default(),
        };
        for column in 0..COLUMN_COUNT {
            engine.derive(column);
        }
        engine
    }

    pub fn column(&self, column: usize) -> Option<&ColumnState> {
        self.columns.get(column)
    }

    pub fn selections(&self) -> [Option<&Relic>; COLUMN_COUNT] {
        std::array::from_fn(|i| self.columns[i].selected.as_ref())
    }

    /// Swap in a freshly built index (a scan snapshot or reload) and re-derive
    /// every column. Selections that no longer exist are cleared.
    pub fn replace_index(&mut self, index: ColorIndex) {
        self.index = index;
        let mut cleared = false;
        for column in 0..COLUMN_COUNT {
            cleared |= self.derive(column);
        }
        if cleared {
            // Clearing only relaxes exclusions, so one settling pass is enough.
            for column in 0..COLUMN_COUNT {
                self.derive(column);
            }
        }
    }

    pub fn set_color(&mut self, column: usize, filter: ColorFilter) {
        if column >= COLUMN_COUNT {
            return;
        }
        self.columns[column].color = filter;
        if self.derive(column) {
            self.reconcile_siblings(column);
        }
    }

    /// Case-insensitive substring filter over the label view; grouping is
    /// untouched.
    pub fn set_search(&mut self, column: usize, query: impl Into<String>) {
        if let Some(col) = self.columns.get_mut(column) {
            col.search = query.into();
        }
    }

    pub fn visible_labels(&self, column: usize) -> Vec<String> {
        self.columns
            .get(column)
            .map(ColumnState::visible_labels)
            .unwrap_or_default()
    }

    /// Pick the relic behind `label` at the group's current cycle position.
    /// Returns `false` (no mutation) for unknown labels or an out-of-range
    /// cycle position.
    pub fn select(&mut self, column: usize, label: &str) -> bool {
        if column >= COLUMN_COUNT {
            return false;
        }
        let picked = {
            let col = &self.columns[column];
            let Some(group) = col.groups.get(label) else {
                return false;
            };
            let position = col.cycle.get(label).copied().unwrap_or(0);
            match group.get(position) {
                Some(relic) => relic.clone(),
                None => return false,
            }
        };
        debug!("column {column}: selected '{}'", picked.name);
        self.columns[column].selected = Some(picked);
        self.reconcile_siblings(column);
        true
    }

    pub fn clear_selection(&mut self, column: usize) {
        if column >= COLUMN_COUNT {
            return;
        }
        if self.columns[column].selected.take().is_some() {
            self.reconcile_siblings(column);
        }
    }

    /// Step through a variant group. Advances the cycle position modulo the
    /// group size (wrapping both directions), re-points the selection, and
    /// migrates the group and cycle entries from the old counter-suffixed
    /// label to the new one in the same operation, so the old key never
    /// coexists with the new. Returns the new label, or `None` for unknown
    /// labels and groups of size ≤ 1.
    pub fn cycle(
        &mut self,
        column: usize,
        label: &str,
        direction: CycleDirection,
    ) -> Option<String> {
        if column >= COLUMN_COUNT {
            return None;
        }
        let (picked, position, new_label) = {
            let col = &self.columns[column];
            let group = col.groups.get(label)?;
            let len = group.len();
            if len <= 1 {
                return None;
            }
            let current = col.cycle.get(label).copied().unwrap_or(0);
            let position = match direction {
                CycleDirection::Forward => (current + 1) % len,
                CycleDirection::Backward => (current + len - 1) % len,
            };
            let new_label = format!("{} ({}/{})", base_label(label), position + 1, len);
            (group[position].clone(), position, new_label)
        };

        let col = &mut self.columns[column];
        if new_label != label {
            if let Some(group) = col.groups.remove(label) {
                col.groups.insert(new_label.clone(), group);
            }
            col.cycle.remove(label);
            if let Some(slot) = col.labels.iter_mut().find(|l| l.as_str() == label) {
                *slot = new_label.clone();
            }
        }
        col.cycle.insert(new_label.clone(), position);
        col.selected = Some(picked);
        self.reconcile_siblings(column);
        Some(new_label)
    }

    fn exclusion_sets(&self, column: usize) -> Vec<AttributeSet> {
        self.columns
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != column)
            .filter_map(|(_, col)| col.selected.as_ref())
            .map(Relic::attribute_set)
            .collect()
    }

    /// Rebuild one column's candidate view under the current exclusions.
    /// Returns `true` when the column's selection vanished and was cleared.
    fn derive(&mut self, column: usize) -> bool {
        let used = self.exclusion_sets(column);
        let entries = self.index.entries(self.columns[column].color);

        let mut grouped: BTreeMap<String, Vec<Relic>> = BTreeMap::new();
        for (attribute, relic) in entries {
            if used.iter().any(|set| *set == relic.attribute_set()) {
                continue;
            }
            let group = grouped.entry(attribute).or_default();
            if !group.contains(&relic) {
                group.push(relic);
            }
        }

        let col = &mut self.columns[column];
        col.labels.clear();
        col.groups.clear();
        col.cycle.clear();
        for (attribute, group) in grouped {
            let label = if group.len() > 1 {
                format!("{} (1/{})", attribute, group.len())
            } else {
                attribute
            };
            col.labels.push(label.clone());
            col.cycle.insert(label.clone(), 0);
            col.groups.insert(label, group);
        }
        col.labels.sort();

        if col.selection_survives() {
            false
        } else {
            col.selected = None;
            true
        }
    }

    /// Re-derive the other two columns after `changed`'s selection moved.
    fn reconcile_siblings(&mut self, changed: usize) {
        let mut cleared = false;
        for column in 0..COLUMN_COUNT {
            if column != changed {
                cleared |= self.derive(column);
            }
        }
        if cleared {
            for column in 0..COLUMN_COUNT {
                if column != changed {
                    self.derive(column);
                }
            }
        }
    }
}

/// Strip a trailing `" (i/N)"` cycle counter; anything else, parentheses in
/// the attribute text included, stays.
fn base_label(label: &str) -> &str {
    if let Some(idx) = label.rfind(" (") {
        if let Some(body) = label[idx + 2..].strip_suffix(')') {
            if let Some((num, den)) = body.split_once('/') {
                let counter = !num.is_empty()
                    && !den.is_empty()
                    && num.chars().all(|c| c.is_ascii_digit())
                    && den.chars().all(|c| c.is_ascii_digit());
                if counter {
                    return &label[..idx];
                }
            }
        }
    }
    label
}
