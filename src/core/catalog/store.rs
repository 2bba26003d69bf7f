use log::warn;
use std::collections::{HashMap, HashSet};
use std::path::Path;

use super::hasher::RelicHasher;
use super::StoreError;
use crate::models::{ColorFilter, Relic, RelicColor};

const HEADERS: [&str; 4] = ["Name", "Slot 1", "Slot 2", "Slot 3"];

/// Deduplicated relic records plus the seen-hash set that rejects repeat
/// observations. Records are immutable once ingested and only vanish on a
/// full reload.
#[derive(Debug)]
pub struct RelicStore {
    relics: Vec<Relic>,
    seen: HashSet<String>,
    hasher: RelicHasher,
}

impl RelicStore {
    pub fn new() -> Self {
        Self::with_hasher(RelicHasher::new())
    }

    pub fn with_hasher(hasher: RelicHasher) -> Self {
        Self {
            relics: Vec::new(),
            seen: HashSet::new(),
            hasher,
        }
    }

    /// Returns `false` (and leaves the store untouched) when the relic's
    /// content hash was already seen.
    pub fn ingest(&mut self, relic: Relic) -> bool {
        let digest = self.hasher.digest_relic(&relic);
        if !self.seen.insert(digest) {
            return false;
        }
        self.relics.push(relic);
        true
    }

    pub fn relics(&self) -> &[Relic] {
        &self.relics
    }

    pub fn len(&self) -> usize {
        self.relics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.relics.is_empty()
    }

    pub fn clear(&mut self) {
        self.relics.clear();
        self.seen.clear();
    }

    /// Load a persisted relic table. The delimiter is auto-detected from the
    /// first line (tab wins over comma); rows with fewer than two columns or
    /// a blank name are skipped, not fatal.
    pub fn load_csv(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let delimiter = if text.lines().next().map_or(false, |line| line.contains('\t')) {
            b'\t'
        } else {
            b','
        };

        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .flexible(true)
            .from_reader(text.as_bytes());

        let mut store = Self::new();
        let mut skipped = 0usize;
        for record in reader.records() {
            let record = match record {
                Ok(record) => record,
                Err(_) => {
                    skipped += 1;
                    continue;
                }
            };
            let name = record.get(0).unwrap_or("").trim().to_string();
            if record.len() < 2 || name.is_empty() {
                skipped += 1;
                continue;
            }
            let cells: Vec<String> = (1..=3)
                .map(|i| record.get(i).unwrap_or("").to_string())
                .collect();
            store.ingest(Relic::from_cells(name, &cells));
        }

        if skipped > 0 {
            warn!("⚠️ skipped {skipped} malformed relic rows");
        }
        Ok(store)
    }

    pub fn save_csv(&self, path: impl AsRef<Path>) -> Result<(), StoreError> {
        let mut writer = csv::Writer::from_path(path.as_ref())?;
        writer.write_record(HEADERS)?;
        for relic in &self.relics {
            writer.write_record([
                relic.name.as_str(),
                relic.slots[0].as_str(),
                relic.slots[1].as_str(),
                relic.slots[2].as_str(),
            ])?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Fan the store out into per-color `(attribute, relic)` pairs. Relics
    /// whose name does not resolve to a known color stay in the raw store but
    /// get no index entries.
    pub fn index_by_color(&self) -> ColorIndex {
        let mut buckets: HashMap<RelicColor, Vec<(String, Relic)>> = RelicColor::ALL
            .into_iter()
            .map(|color| (color, Vec::new()))
            .collect();

        for relic in &self.relics {
            let Some(color) = relic.color() else { continue };
            if let Some(bucket) = buckets.get_mut(&color) {
                for attribute in relic.attributes() {
                    bucket.push((attribute.to_string(), relic.clone()));
                }
            }
        }

        ColorIndex { buckets }
    }
}

impl Default for RelicStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Immutable per-color view over the store, rebuilt whenever the record set
/// changes.
#[derive(Debug, Clone)]
pub struct ColorIndex {
    buckets: HashMap<RelicColor, Vec<(String, Relic)>>,
}

impl ColorIndex {
    pub fn empty() -> Self {
        Self {
            buckets: HashMap::new(),
        }
    }

    pub fn bucket(&self, color: RelicColor) -> &[(String, Relic)] {
        self.buckets.get(&color).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Entries for one color, or the union of every color for `Any`, in
    /// stable color-table order.
    pub fn entries(&self, filter: ColorFilter) -> Vec<(String, Relic)> {
        match filter {
            ColorFilter::Only(color) => self.bucket(color).to_vec(),
            ColorFilter::Any => RelicColor::ALL
                .into_iter()
                .flat_map(|color| self.bucket(color).iter().cloned())
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
