use sha2::{Digest, Sha256};

use crate::models::Relic;

/// Delimiter between digest fields; never appears in scraped text once the
/// cleaner has run.
const FIELD_DELIMITER: &str = "|";

/// How slot fields enter the digest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SlotOrder {
    /// Slot 1/2/3 are positional; the same attributes in a different slot
    /// order hash differently.
    #[default]
    Positional,
    /// Slots are a set; they are sorted before joining.
    Unordered,
}

/// Computes the canonical dedup key of a relic observation.
///
/// Every field is trimmed and lowercased first, so case and surrounding
/// whitespace never split one physical relic into two records.
#[derive(Debug, Clone, Copy, Default)]
pub struct RelicHasher {
    order: SlotOrder,
}

impl RelicHasher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_order(order: SlotOrder) -> Self {
        Self { order }
    }

    /// `sha256(name|slot1|slot2|slot3)` as lowercase hex.
    pub fn digest(&self, name: &str, slots: &[String]) -> String {
        let mut parts: Vec<String> = Vec::with_capacity(1 + slots.len());
        parts.push(canonical_field(name));
        let mut slot_parts: Vec<String> = slots.iter().map(|s| canonical_field(s)).collect();
        if self.order == SlotOrder::Unordered {
            slot_parts.sort();
        }
        parts.extend(slot_parts);

        let joined = parts.join(FIELD_DELIMITER);
        format!("{:x}", Sha256::digest(joined.as_bytes()))
    }

    pub fn digest_relic(&self, relic: &Relic) -> String {
        self.digest(&relic.name, &relic.slots)
    }
}

fn canonical_field(field: &str) -> String {
    field.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slots(values: [&str; 3]) -> [String; 3] {
        values.map(str::to_string)
    }

    #[test]
    fn test_digest_is_sha256_hex() {
        let hasher = RelicHasher::new();
        let digest = hasher.digest("Delicate Burning Scene", &slots(["X", "Y", "Z"]));
        assert_eq!(digest.len(), 64);
        assert!(digest.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_case_and_whitespace_invariant() {
        let hasher = RelicHasher::new();
        let a = hasher.digest("Delicate Burning Scene", &slots(["X", "Y", "Z"]));
        let b = hasher.digest("  delicate burning scene ", &slots([" x ", "y", "Z "]));
        assert_eq!(a, b);
    }

    #[test]
    fn test_any_field_change_changes_digest() {
        let hasher = RelicHasher::new();
        let base = hasher.digest("Delicate Burning Scene", &slots(["X", "Y", "Z"]));
        assert_ne!(
            base,
            hasher.digest("Delicate Burning Urn", &slots(["X", "Y", "Z"]))
        );
        assert_ne!(
            base,
            hasher.digest("Delicate Burning Scene", &slots(["X", "Y", "W"]))
        );
        assert_ne!(
            base,
            hasher.digest("Delicate Burning Scene", &slots(["X", "Y", ""]))
        );
    }

    #[test]
    fn test_positional_is_slot_order_sensitive() {
        let hasher = RelicHasher::new();
        let a = hasher.digest("Delicate Burning Scene", &slots(["X", "Y", "Z"]));
        let b = hasher.digest("Delicate Burning Scene", &slots(["Z", "Y", "X"]));
        assert_ne!(a, b);
    }

    #[test]
    fn test_unordered_treats_slots_as_a_set() {
        let hasher = RelicHasher::with_order(SlotOrder::Unordered);
        let a = hasher.digest("Delicate Burning Scene", &slots(["X", "Y", "Z"]));
        let b = hasher.digest("Delicate Burning Scene", &slots(["Z", "Y", "X"]));
        assert_eq!(a, b);

        // The name stays positional: it never mixes into the slot set.
        let c = hasher.digest("X", &slots(["Delicate Burning Scene", "Y", "Z"]));
        assert_ne!(a, c);
    }
}
