//! Maps cleaned OCR text onto the canonical vocabulary.
//!
//! Exact membership first, then the best fuzzy match at or above the cutoff,
//! then graceful fallback to the cleaned text. Results are memoized per
//! cleaned string in a bounded LRU; the cache never changes what is returned,
//! only how fast.

use log::debug;
use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::Mutex;

use super::cleaner::TextCleaner;
use super::vocabulary::VocabularyIndex;

pub const MAX_SCORE: u8 = 100;

#[derive(Debug, Clone)]
pub struct NormalizerConfig {
    /// Minimum similarity score, in [0, 100], for a fuzzy match to count.
    pub fuzzy_cutoff: u8,
    /// Memo capacity; least-recently-used entries are evicted.
    pub cache_capacity: usize,
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        Self {
            fuzzy_cutoff: 85,
            cache_capacity: 2048,
        }
    }
}

/// Outcome of one normalization: the canonical (or cleaned-fallback) text and
/// the match score, `None` when nothing in the vocabulary matched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Normalized {
    pub text: String,
    pub score: Option<u8>,
}

pub struct FuzzyNormalizer {
    cleaner: TextCleaner,
    vocabulary: VocabularyIndex,
    cutoff: u8,
    cache: Mutex<LruCache<String, Normalized>>,
}

impl FuzzyNormalizer {
    pub fn new(cleaner: TextCleaner, vocabulary: VocabularyIndex) -> Self {
        Self::with_config(cleaner, vocabulary, NormalizerConfig::default())
    }

    pub fn with_config(
        cleaner: TextCleaner,
        vocabulary: VocabularyIndex,
        config: NormalizerConfig,
    ) -> Self {
        let capacity = NonZeroUsize::new(config.cache_capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            cleaner,
            vocabulary,
            cutoff: config.fuzzy_cutoff,
            cache: Mutex::new(LruCache::new(capacity)),
        }
    }

    pub fn vocabulary(&self) -> &VocabularyIndex {
        &self.vocabulary
    }

    pub fn normalize(&self, raw: &str) -> String {
        self.normalize_scored(raw).text
    }

    pub fn normalize_scored(&self, raw: &str) -> Normalized {
        if raw.is_empty() {
            return Normalized {
                text: String::new(),
                score: None,
            };
        }

        let cleaned = self.cleaner.clean(raw);

        if let Ok(mut cache) = self.cache.lock() {
            if let Some(hit) = cache.get(&cleaned) {
                return hit.clone();
            }
        }

        let result = self.resolve(&cleaned);

        if let Ok(mut cache) = self.cache.lock() {
            cache.put(cleaned, result.clone());
        }

        result
    }

    fn resolve(&self, cleaned: &str) -> Normalized {
        if self.vocabulary.contains(cleaned) {
            return Normalized {
                text: cleaned.to_string(),
                score: Some(MAX_SCORE),
            };
        }

        // Strictly-greater keeps the earliest entry on score ties, so the
        // result is pinned to vocabulary load order.
        let mut best: Option<(&str, u8)> = None;
        for entry in self.vocabulary.entries() {
            let score = similarity(cleaned, entry);
            if best.map_or(true, |(_, b)| score > b) {
                best = Some((entry, score));
            }
        }

        match best {
            Some((entry, score)) if score >= self.cutoff => {
                debug!("fuzzy match: '{cleaned}' -> '{entry}' ({score})");
                Normalized {
                    text: entry.to_string(),
                    score: Some(score),
                }
            }
            _ => Normalized {
                text: cleaned.to_string(),
                score: None,
            },
        }
    }
}

/// Normalized edit similarity in [0, 100].
pub fn similarity(a: &str, b: &str) -> u8 {
    (strsim::normalized_levenshtein(a, b) * f64::from(MAX_SCORE)).round() as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vocab(entries: &[&str]) -> VocabularyIndex {
        VocabularyIndex::from_entries(entries.iter().map(|s| s.to_string()))
    }

    fn normalizer(entries: &[&str]) -> FuzzyNormalizer {
        FuzzyNormalizer::new(TextCleaner::new(), vocab(entries))
    }

    #[test]
    fn test_empty_input_is_empty_output() {
        let n = normalizer(&["Poison Moth Flight"]);
        assert_eq!(n.normalize(""), "");
        assert_eq!(n.normalize_scored("").score, None);
    }

    #[test]
    fn test_exact_member_scores_max() {
        let n = normalizer(&["Poison Moth Flight"]);
        let out = n.normalize_scored("Poison Moth Flight");
        assert_eq!(out.text, "Poison Moth Flight");
        assert_eq!(out.score, Some(MAX_SCORE));
    }

    #[test]
    fn test_misread_suffix_recovers_vocabulary_entry() {
        let n = normalizer(&["Burning Armament's Grace", "Poison Moth Flight"]);
        let out = n.normalize_scored("Poison Moth Flightat");
        assert_eq!(out.text, "Poison Moth Flight");
        assert!(out.score.unwrap() >= 85);
    }

    #[test]
    fn test_below_cutoff_falls_back_to_cleaned() {
        let n = normalizer(&["Poison Moth Flight"]);
        let out = n.normalize_scored("completely   unrelated");
        assert_eq!(out.text, "completely unrelated");
        assert_eq!(out.score, None);
    }

    #[test]
    fn test_idempotent_for_canonical_output() {
        let n = normalizer(&["Burning Armament's Grace", "Poison Moth Flight"]);
        let once = n.normalize("Poison Moth Flightat");
        let twice = n.normalize(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_cache_never_changes_results() {
        let uncached = normalizer(&["Burning Armament's Grace", "Poison Moth Flight"]);
        let cached = normalizer(&["Burning Armament's Grace", "Poison Moth Flight"]);

        for input in ["Poison Moth Flightat", "Poison Moth Flightat", "", "zzz"] {
            // `cached` has seen these inputs before, `uncached` is rebuilt fresh.
            let fresh = normalizer(&["Burning Armament's Grace", "Poison Moth Flight"]);
            assert_eq!(cached.normalize_scored(input), fresh.normalize_scored(input));
            assert_eq!(
                cached.normalize_scored(input),
                uncached.normalize_scored(input)
            );
        }
    }

    #[test]
    fn test_tie_break_prefers_first_entry() {
        // Both entries are the same edit distance from the input; the winner
        // follows vocabulary load order, not container iteration order.
        let tied = |entries: &[&str]| {
            let cleaner = TextCleaner::with_rules(crate::core::text::CleanRules {
                replacements: Vec::new(),
            });
            let config = NormalizerConfig {
                fuzzy_cutoff: 50,
                cache_capacity: 16,
            };
            FuzzyNormalizer::with_config(cleaner, vocab(entries), config)
        };
        assert_eq!(tied(&["night", "might"]).normalize("sight"), "night");
        assert_eq!(tied(&["might", "night"]).normalize("sight"), "might");
    }

    #[test]
    fn test_empty_vocabulary_passes_cleaned_text_through() {
        let n = FuzzyNormalizer::new(TextCleaner::new(), VocabularyIndex::empty());
        let out = n.normalize_scored("Endureat  night");
        assert_eq!(out.text, "Endure at night");
        assert_eq!(out.score, None);
    }

    #[test]
    fn test_eviction_does_not_change_results() {
        let config = NormalizerConfig {
            fuzzy_cutoff: 85,
            cache_capacity: 1,
        };
        let n = FuzzyNormalizer::with_config(
            TextCleaner::new(),
            vocab(&["Poison Moth Flight"]),
            config,
        );
        let first = n.normalize_scored("Poison Moth Flightat");
        n.normalize_scored("something else entirely");
        let again = n.normalize_scored("Poison Moth Flightat");
        assert_eq!(first, again);
    }

    #[test]
    fn test_similarity_bounds() {
        assert_eq!(similarity("abc", "abc"), 100);
        assert_eq!(similarity("abc", "xyz"), 0);
        let mid = similarity("Poison Moth Flight at", "Poison Moth Flight");
        assert!(mid >= 85 && mid < 100);
    }
}
