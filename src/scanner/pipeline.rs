use log::info;
use rayon::prelude::*;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use std::sync::Arc;

use super::ObservationSource;
use crate::core::catalog::RelicStore;
use crate::core::text::FuzzyNormalizer;
use crate::models::{RawObservation, Relic};

#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Process every Nth frame; successive frames are near-identical, so most
    /// can be skipped outright.
    pub frame_skip: u64,
    /// Emit a progress report every N seen frames.
    pub progress_every: u64,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            frame_skip: 3,
            progress_every: 30,
        }
    }
}

impl ScanConfig {
    /// No skipping: short clips where every frame counts.
    pub fn every_frame() -> Self {
        Self {
            frame_skip: 1,
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanProgress {
    Frame {
        seen: u64,
        total: Option<u64>,
        unique: usize,
    },
    Finished {
        seen: u64,
        unique: usize,
    },
    Cancelled {
        seen: u64,
        unique: usize,
    },
}

/// Result of one full scan: the completely-built store snapshot. Consumers
/// never observe a half-updated store; this is the only handoff.
#[derive(Debug)]
pub struct ScanOutcome {
    pub store: RelicStore,
    /// Frames actually normalized and ingested (post skip).
    pub processed: u64,
    /// Observations rejected as already-seen.
    pub duplicates: u64,
    pub cancelled: bool,
}

impl ScanOutcome {
    pub(crate) fn aborted() -> Self {
        Self {
            store: RelicStore::new(),
            processed: 0,
            duplicates: 0,
            cancelled: true,
        }
    }
}

/// Drives an [`ObservationSource`] to completion: skip, normalize, ingest.
pub struct ScanPipeline {
    normalizer: Arc<FuzzyNormalizer>,
    config: ScanConfig,
}

impl ScanPipeline {
    pub fn new(normalizer: Arc<FuzzyNormalizer>) -> Self {
        Self::with_config(normalizer, ScanConfig::default())
    }

    pub fn with_config(normalizer: Arc<FuzzyNormalizer>, config: ScanConfig) -> Self {
        Self { normalizer, config }
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// One observation through the normalizer; empty slots stay empty.
    pub fn normalize_observation(&self, observation: &RawObservation) -> Relic {
        let name = self.normalizer.normalize(&observation.name);
        let slots = std::array::from_fn(|i| self.normalizer.normalize(&observation.slots[i]));
        Relic::new(name, slots)
    }

    /// Normalize a decoded frame batch across worker threads. Ordering is
    /// preserved; dedup still happens serially at ingest.
    pub fn normalize_batch(&self, observations: &[RawObservation]) -> Vec<Relic> {
        observations
            .par_iter()
            .map(|observation| self.normalize_observation(observation))
            .collect()
    }

    /// Batch variant of the scan loop: normalize in parallel, ingest in
    /// order. Returns how many relics were newly inserted.
    pub fn ingest_batch(&self, store: &mut RelicStore, observations: &[RawObservation]) -> usize {
        self.normalize_batch(observations)
            .into_iter()
            .filter(|relic| store.ingest(relic.clone()))
            .count()
    }

    /// Run the producer loop over a whole video. Cancellation is coarse:
    /// the flag is polled once per frame, never mid-normalization. The store
    /// is built privately and handed over only in the outcome.
    pub fn run(
        &self,
        source: &mut dyn ObservationSource,
        progress: Option<&Sender<ScanProgress>>,
        cancel: &AtomicBool,
    ) -> ScanOutcome {
        let total = source.total_hint();
        match total {
            Some(frames) => info!("🎥 scan started ({frames} frames)"),
            None => info!("🎥 scan started (unknown length)"),
        }

        let mut store = RelicStore::new();
        let mut seen = 0u64;
        let mut processed = 0u64;
        let mut duplicates = 0u64;
        let mut cancelled = false;

        while let Some(observation) = source.next_observation() {
            if cancel.load(Ordering::Relaxed) {
                cancelled = true;
                break;
            }
            let frame = seen;
            seen += 1;

            if self.config.frame_skip <= 1 || frame % self.config.frame_skip == 0 {
                let relic = self.normalize_observation(&observation);
                if !store.ingest(relic) {
                    duplicates += 1;
                }
                processed += 1;
            }

            if let Some(tx) = progress {
                if self.config.progress_every > 0 && seen % self.config.progress_every == 0 {
                    let _ = tx.send(ScanProgress::Frame {
                        seen,
                        total,
                        unique: store.len(),
                    });
                }
            }
        }

        let report = if cancelled {
            info!("🛑 scan cancelled after {} frames", seen);
            ScanProgress::Cancelled {
                seen,
                unique: store.len(),
            }
        } else {
            info!("✅ scan finished: {} unique relics", store.len());
            ScanProgress::Finished {
                seen,
                unique: store.len(),
            }
        };
        if let Some(tx) = progress {
            let _ = tx.send(report);
        }

        ScanOutcome {
            store,
            processed,
            duplicates,
            cancelled,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::text::{TextCleaner, VocabularyIndex};
    use crate::scanner::MockObservationSource;
    use std::sync::mpsc;

    fn pipeline(entries: &[&str], config: ScanConfig) -> ScanPipeline {
        let vocabulary =
            VocabularyIndex::from_entries(entries.iter().map(|s| s.to_string()));
        let normalizer = Arc::new(FuzzyNormalizer::new(TextCleaner::new(), vocabulary));
        ScanPipeline::with_config(normalizer, config)
    }

    fn observation(name: &str, slots: [&str; 3]) -> RawObservation {
        RawObservation::new(name, slots[0], slots[1], slots[2])
    }

    #[test]
    fn test_normalize_observation_maps_all_fields() {
        let p = pipeline(
            &["Delicate Burning Scene", "Poison Moth Flight"],
            ScanConfig::every_frame(),
        );
        let relic = p.normalize_observation(&observation(
            "Delicate  Burning Scene",
            ["Poison Moth Flightat", "", ""],
        ));
        assert_eq!(relic.name, "Delicate Burning Scene");
        assert_eq!(relic.slots[0], "Poison Moth Flight");
        assert_eq!(relic.slots[1], "");
    }

    #[test]
    fn test_run_dedups_repeated_frames() {
        let p = pipeline(&[], ScanConfig::every_frame());
        let mut source = MockObservationSource::repeated(
            observation("Delicate Burning Scene", ["X", "Y", "Z"]),
            10,
        );

        let outcome = p.run(&mut source, None, &AtomicBool::new(false));
        assert!(!outcome.cancelled);
        assert_eq!(outcome.store.len(), 1);
        assert_eq!(outcome.processed, 10);
        assert_eq!(outcome.duplicates, 9);
    }

    #[test]
    fn test_run_honors_frame_skip() {
        let config = ScanConfig {
            frame_skip: 3,
            progress_every: 0,
        };
        let p = pipeline(&[], config);
        // Ten distinct frames; only frames 0, 3, 6, 9 are processed.
        let frames: Vec<RawObservation> = (0..10)
            .map(|i| observation(&format!("Relic Burning {i}"), ["X", "", ""]))
            .collect();
        let mut source = MockObservationSource::new(frames);

        let outcome = p.run(&mut source, None, &AtomicBool::new(false));
        assert_eq!(outcome.processed, 4);
        assert_eq!(outcome.store.len(), 4);
    }

    #[test]
    fn test_run_reports_progress_and_finish() {
        let config = ScanConfig {
            frame_skip: 1,
            progress_every: 2,
        };
        let p = pipeline(&[], config);
        let frames: Vec<RawObservation> = (0..5)
            .map(|i| observation(&format!("Relic Burning {i}"), ["X", "", ""]))
            .collect();
        let mut source = MockObservationSource::new(frames);

        let (tx, rx) = mpsc::channel();
        let outcome = p.run(&mut source, Some(&tx), &AtomicBool::new(false));
        drop(tx);

        let reports: Vec<ScanProgress> = rx.iter().collect();
        assert_eq!(
            reports.first(),
            Some(&ScanProgress::Frame {
                seen: 2,
                total: Some(5),
                unique: 2,
            })
        );
        assert_eq!(
            reports.last(),
            Some(&ScanProgress::Finished {
                seen: 5,
                unique: outcome.store.len(),
            })
        );
    }

    #[test]
    fn test_run_cancelled_before_first_frame() {
        let p = pipeline(&[], ScanConfig::every_frame());
        let mut source = MockObservationSource::repeated(
            observation("Delicate Burning Scene", ["X", "", ""]),
            100,
        );

        let cancel = AtomicBool::new(true);
        let outcome = p.run(&mut source, None, &cancel);
        assert!(outcome.cancelled);
        assert!(outcome.store.is_empty());
        assert_eq!(outcome.processed, 0);
    }

    #[test]
    fn test_batch_matches_streaming_results() {
        let p = pipeline(&["Poison Moth Flight"], ScanConfig::every_frame());
        let frames: Vec<RawObservation> = vec![
            observation("Delicate Burning Scene", ["Poison Moth Flightat", "", ""]),
            observation("Delicate Burning Scene", ["Poison Moth Flightat", "", ""]),
            observation("Grand Burning Urn", ["Endureat night", "", ""]),
        ];

        let mut batch_store = RelicStore::new();
        let inserted = p.ingest_batch(&mut batch_store, &frames);
        assert_eq!(inserted, 2);

        let mut source = MockObservationSource::new(frames);
        let outcome = p.run(&mut source, None, &AtomicBool::new(false));
        assert_eq!(outcome.store.relics(), batch_store.relics());
    }
}
