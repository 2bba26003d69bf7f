//! Background scan sessions.
//!
//! The scan producer gets its own worker thread so it never blocks the
//! interactive surface. While it runs it has exclusive ownership of the store
//! it is building; the finished snapshot is handed over once, in `wait`.

use log::{error, info};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver};
use std::sync::Arc;
use std::thread::JoinHandle;

use crate::scanner::{ObservationSource, ScanOutcome, ScanPipeline, ScanProgress};

pub struct ScanSession {
    progress: Receiver<ScanProgress>,
    cancel: Arc<AtomicBool>,
    worker: Option<JoinHandle<ScanOutcome>>,
}

impl ScanSession {
    /// Start scanning `source` on a worker thread.
    pub fn spawn<S>(pipeline: ScanPipeline, source: S) -> Self
    where
        S: ObservationSource + Send + 'static,
    {
        info!("🎬 ScanSession: started");
        let (tx, rx) = mpsc::channel();
        let cancel = Arc::new(AtomicBool::new(false));
        let cancel_flag = Arc::clone(&cancel);

        let worker = std::thread::spawn(move || {
            let mut source = source;
            pipeline.run(&mut source, Some(&tx), &cancel_flag)
        });

        Self {
            progress: rx,
            cancel,
            worker: Some(worker),
        }
    }

    /// Drain any progress reports emitted since the last poll.
    pub fn poll_progress(&self) -> Vec<ScanProgress> {
        self.progress.try_iter().collect()
    }

    /// Request a stop; honored at the next frame boundary.
    pub fn cancel(&self) {
        self.cancel.store(true, Ordering::Relaxed);
    }

    pub fn is_finished(&self) -> bool {
        self.worker.as_ref().map_or(true, JoinHandle::is_finished)
    }

    /// Block until the worker is done and take the finished snapshot. A
    /// panicked worker yields an empty cancelled outcome instead of
    /// propagating.
    pub fn wait(mut self) -> ScanOutcome {
        match self.worker.take() {
            Some(worker) => match worker.join() {
                Ok(outcome) => outcome,
                Err(_) => {
                    error!("💥 scan worker panicked; discarding partial scan");
                    ScanOutcome::aborted()
                }
            },
            None => ScanOutcome::aborted(),
        }
    }
}

impl Drop for ScanSession {
    fn drop(&mut self) {
        // An abandoned session must not leave the worker scanning forever.
        self.cancel.store(true, Ordering::Relaxed);
        info!("🗑️ ScanSession: released");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::text::{FuzzyNormalizer, TextCleaner, VocabularyIndex};
    use crate::models::RawObservation;
    use crate::scanner::{MockObservationSource, ScanConfig};

    fn pipeline() -> ScanPipeline {
        let normalizer = Arc::new(FuzzyNormalizer::new(
            TextCleaner::new(),
            VocabularyIndex::empty(),
        ));
        ScanPipeline::with_config(normalizer, ScanConfig::every_frame())
    }

    /// Yields frames forever; only cancellation ends a scan over it.
    struct EndlessSource;

    impl ObservationSource for EndlessSource {
        fn next_observation(&mut self) -> Option<RawObservation> {
            Some(RawObservation::new("Delicate Burning Scene", "X", "Y", "Z"))
        }
    }

    #[test]
    fn test_session_runs_to_completion() {
        let frames = vec![
            RawObservation::new("Delicate Burning Scene", "X", "Y", "Z"),
            RawObservation::new("Delicate Burning Scene", "X", "Y", "Z"),
            RawObservation::new("Grand Burning Urn", "A", "", ""),
        ];
        let session = ScanSession::spawn(pipeline(), MockObservationSource::new(frames));

        let outcome = session.wait();
        assert!(!outcome.cancelled);
        assert_eq!(outcome.store.len(), 2);
        assert_eq!(outcome.duplicates, 1);
    }

    #[test]
    fn test_session_reports_final_progress() {
        let frames = vec![RawObservation::new("Delicate Burning Scene", "X", "", "")];
        let session = ScanSession::spawn(pipeline(), MockObservationSource::new(frames));

        // The final report is sent before the worker returns, so once the
        // worker is done it is guaranteed to be buffered.
        while !session.is_finished() {
            std::thread::sleep(std::time::Duration::from_millis(1));
        }
        let reports = session.poll_progress();
        assert!(matches!(
            reports.last(),
            Some(ScanProgress::Finished { seen: 1, unique: 1 })
        ));

        let outcome = session.wait();
        assert!(!outcome.cancelled);
    }

    #[test]
    fn test_cancel_stops_endless_source() {
        let session = ScanSession::spawn(pipeline(), EndlessSource);
        session.cancel();

        let outcome = session.wait();
        assert!(outcome.cancelled);
    }
}
