use std::collections::HashSet;
use std::path::Path;

use super::TextError;

/// The canonical string universe: every known relic name and attribute
/// phrase, loaded once from two line-delimited lists. Immutable for the
/// process lifetime; entry order is load order and drives fuzzy
/// tie-breaking.
#[derive(Debug)]
pub struct VocabularyIndex {
    entries: Vec<String>,
    lookup: HashSet<String>,
}

impl VocabularyIndex {
    /// Union of the name list and the attribute list, names first.
    pub fn load(
        name_path: impl AsRef<Path>,
        attribute_path: impl AsRef<Path>,
    ) -> Result<Self, TextError> {
        let mut entries = read_lines(name_path.as_ref())?;
        entries.extend(read_lines(attribute_path.as_ref())?);
        Ok(Self::from_entries(entries))
    }

    /// Degraded-mode vocabulary: every lookup misses, normalization becomes
    /// pass-through cleaning.
    pub fn empty() -> Self {
        Self::from_entries(Vec::new())
    }

    pub fn from_entries(entries: impl IntoIterator<Item = String>) -> Self {
        let mut deduped = Vec::new();
        let mut lookup = HashSet::new();
        for entry in entries {
            if lookup.insert(entry.clone()) {
                deduped.push(entry);
            }
        }
        Self {
            entries: deduped,
            lookup,
        }
    }

    pub fn contains(&self, text: &str) -> bool {
        self.lookup.contains(text)
    }

    /// All entries in load order.
    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn read_lines(path: &Path) -> Result<Vec<String>, TextError> {
    let text =
        std::fs::read_to_string(path).map_err(|source| TextError::VocabularyLoadFailed {
            path: path.display().to_string(),
            source,
        })?;
    Ok(text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}
