//! The interactive picker facade: one owner for the persisted relic table,
//! the color index, and the three-column selection engine.

use log::{info, warn};
use std::path::PathBuf;

use crate::core::catalog::{RelicStore, StoreError};
use crate::core::select::{CycleDirection, SelectionEngine};
use crate::models::{ColorFilter, Relic};
use crate::scanner::ScanOutcome;

/// What the front end renders for one picked relic: the name row plus the
/// compacted attribute rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedRelicView {
    pub name: String,
    pub attributes: Vec<String>,
}

impl SelectedRelicView {
    fn of(relic: &Relic) -> Self {
        Self {
            name: relic.name.clone(),
            attributes: relic.attributes().map(str::to_string).collect(),
        }
    }
}

pub struct RelicSelector {
    store: RelicStore,
    engine: SelectionEngine,
    table_path: PathBuf,
}

impl RelicSelector {
    /// Open the picker over a persisted relic table. A missing table is not
    /// an error: the picker starts blank and the file appears with the first
    /// applied scan.
    pub fn open(table_path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let table_path = table_path.into();
        let store = if table_path.exists() {
            RelicStore::load_csv(&table_path)?
        } else {
            warn!(
                "📄 relic table {} not found; starting blank",
                table_path.display()
            );
            RelicStore::new()
        };
        info!("📂 RelicSelector: {} relics loaded", store.len());

        let engine = SelectionEngine::new(store.index_by_color());
        Ok(Self {
            store,
            engine,
            table_path,
        })
    }

    /// Publish a finished scan: persist the snapshot, then swap the engine
    /// over to it. A cancelled scan is discarded and changes nothing.
    pub fn apply_scan(&mut self, outcome: ScanOutcome) -> Result<bool, StoreError> {
        if outcome.cancelled {
            info!("🛑 cancelled scan discarded");
            return Ok(false);
        }
        outcome.store.save_csv(&self.table_path)?;
        info!(
            "💾 {} unique relics saved to {}",
            outcome.store.len(),
            self.table_path.display()
        );
        self.engine.replace_index(outcome.store.index_by_color());
        self.store = outcome.store;
        Ok(true)
    }

    /// Re-read the table from disk, for edits made outside the app.
    pub fn reload(&mut self) -> Result<(), StoreError> {
        let store = RelicStore::load_csv(&self.table_path)?;
        self.engine.replace_index(store.index_by_color());
        self.store = store;
        Ok(())
    }

    pub fn store(&self) -> &RelicStore {
        &self.store
    }

    pub fn set_color(&mut self, column: usize, filter: ColorFilter) {
        self.engine.set_color(column, filter);
    }

    pub fn color(&self, column: usize) -> ColorFilter {
        self.engine
            .column(column)
            .map(|col| col.color())
            .unwrap_or_default()
    }

    pub fn set_search(&mut self, column: usize, query: impl Into<String>) {
        self.engine.set_search(column, query);
    }

    /// The labels the column's list box shows right now.
    pub fn candidates(&self, column: usize) -> Vec<String> {
        self.engine.visible_labels(column)
    }

    pub fn select(&mut self, column: usize, label: &str) -> bool {
        self.engine.select(column, label)
    }

    pub fn cycle(
        &mut self,
        column: usize,
        label: &str,
        direction: CycleDirection,
    ) -> Option<String> {
        self.engine.cycle(column, label, direction)
    }

    pub fn clear_selection(&mut self, column: usize) {
        self.engine.clear_selection(column);
    }

    pub fn selection(&self, column: usize) -> Option<SelectedRelicView> {
        self.engine
            .column(column)?
            .selected()
            .map(SelectedRelicView::of)
    }
}
