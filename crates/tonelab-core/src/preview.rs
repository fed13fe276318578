//! Background preview rendering with latest-wins semantics.
//!
//! The display thread submits control changes to a [`PreviewWorker`] and
//! polls for finished frames. Every submission cancels the ones before it:
//! queued jobs are coalesced down to the newest, a running job stops at its
//! next stage boundary, and any frame that is no longer current by the time
//! it is polled is dropped. Only the most recent request is ever delivered.

use std::sync::mpsc::{self, RecvTimeoutError, TryRecvError};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread;
use std::time::{Duration, Instant};

use thiserror::Error;

use crate::adjustments::adjust_cancellable;
use crate::cancel::{CancelToken, RenderGate};
use crate::types::Image;
use crate::Controls;

/// Errors reported by the preview worker.
#[derive(Debug, Error)]
pub enum PreviewError {
    /// The worker thread has exited
    #[error("Preview worker disconnected")]
    Disconnected,

    /// The worker thread could not be started
    #[error("Failed to spawn preview worker: {0}")]
    Spawn(#[from] std::io::Error),
}

/// A rendered preview ready for display.
#[derive(Debug, Clone)]
pub struct PreviewFrame {
    /// Generation of the request that produced this frame
    pub sequence: u64,
    /// Controls the frame was rendered with
    pub controls: Controls,
    /// The adjusted image
    pub image: Image,
    /// Wall time spent in the pipeline
    pub render_time: Duration,
}

/// Counters describing what happened to submitted requests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PreviewStats {
    /// Requests accepted by `submit`
    pub submitted: u64,
    /// Renders that ran to completion and were handed to the display channel
    pub completed: u64,
    /// Requests abandoned by the worker because a newer one arrived
    pub cancelled: u64,
    /// Finished frames discarded at poll time because they were stale
    pub dropped: u64,
}

struct RenderJob {
    token: CancelToken,
    controls: Controls,
}

enum WorkerMessage {
    Render(RenderJob),
    SetBaseline(Arc<Image>),
}

/// Owns the background render thread for one editing session.
pub struct PreviewWorker {
    gate: RenderGate,
    submit_tx: mpsc::Sender<WorkerMessage>,
    result_rx: mpsc::Receiver<PreviewFrame>,
    stats: Arc<Mutex<PreviewStats>>,
}

impl PreviewWorker {
    /// Start a worker rendering against `baseline`.
    pub fn new(baseline: Image) -> Result<Self, PreviewError> {
        let (submit_tx, submit_rx) = mpsc::channel();
        let (result_tx, result_rx) = mpsc::channel();
        let stats = Arc::new(Mutex::new(PreviewStats::default()));

        let worker_stats = Arc::clone(&stats);
        let baseline = Arc::new(baseline);
        thread::Builder::new()
            .name("tonelab-preview".to_string())
            .spawn(move || run_worker(baseline, submit_rx, result_tx, worker_stats))?;

        Ok(Self {
            gate: RenderGate::new(),
            submit_tx,
            result_rx,
            stats,
        })
    }

    /// Request a render with `controls`, superseding every earlier request.
    ///
    /// Returns the generation assigned to this request.
    pub fn submit(&self, controls: Controls) -> Result<u64, PreviewError> {
        let token = self.gate.begin();
        let sequence = token.sequence();

        lock_stats(&self.stats).submitted += 1;

        self.submit_tx
            .send(WorkerMessage::Render(RenderJob { token, controls }))
            .map_err(|_| PreviewError::Disconnected)?;
        Ok(sequence)
    }

    /// Replace the baseline for subsequent renders and cancel in-flight ones.
    pub fn set_baseline(&self, baseline: Image) -> Result<(), PreviewError> {
        self.gate.cancel_all();
        log::debug!(
            "baseline replaced with {}x{} image",
            baseline.width(),
            baseline.height()
        );
        self.submit_tx
            .send(WorkerMessage::SetBaseline(Arc::new(baseline)))
            .map_err(|_| PreviewError::Disconnected)
    }

    /// Generation of the newest request.
    pub fn current_sequence(&self) -> u64 {
        self.gate.current()
    }

    /// Take the newest current frame without blocking.
    ///
    /// Older and stale frames waiting in the channel are discarded.
    pub fn try_receive(&self) -> Result<Option<PreviewFrame>, PreviewError> {
        let mut newest = None;
        loop {
            match self.result_rx.try_recv() {
                Ok(frame) => newest = self.keep_if_current(frame, newest),
                Err(TryRecvError::Empty) => return Ok(newest),
                Err(TryRecvError::Disconnected) => {
                    return match newest {
                        Some(frame) => Ok(Some(frame)),
                        None => Err(PreviewError::Disconnected),
                    };
                }
            }
        }
    }

    /// Block for up to `timeout` waiting for a current frame.
    pub fn recv_timeout(&self, timeout: Duration) -> Result<Option<PreviewFrame>, PreviewError> {
        let deadline = Instant::now() + timeout;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.result_rx.recv_timeout(remaining) {
                Ok(frame) => {
                    if let Some(frame) = self.keep_if_current(frame, None) {
                        // A newer frame may already be queued behind this one.
                        // A disconnect after that still leaves `frame` to show.
                        let newer = self.try_receive().ok().flatten();
                        return Ok(newer.or(Some(frame)));
                    }
                }
                Err(RecvTimeoutError::Timeout) => return Ok(None),
                Err(RecvTimeoutError::Disconnected) => return Err(PreviewError::Disconnected),
            }
        }
    }

    /// Snapshot of the request counters.
    pub fn stats(&self) -> PreviewStats {
        *lock_stats(&self.stats)
    }

    /// Keep `frame` if it is still current, otherwise count it as dropped and
    /// fall back to `previous`.
    fn keep_if_current(
        &self,
        frame: PreviewFrame,
        previous: Option<PreviewFrame>,
    ) -> Option<PreviewFrame> {
        let (kept, dropped) = if self.gate.is_current(frame.sequence) {
            (Some(frame), u64::from(previous.is_some()))
        } else {
            log::trace!("dropping stale frame {}", frame.sequence);
            (previous, 1)
        };

        if dropped > 0 {
            lock_stats(&self.stats).dropped += dropped;
        }
        kept
    }
}

// The counters stay meaningful after a panic elsewhere, so poisoning is ignored
fn lock_stats(stats: &Mutex<PreviewStats>) -> MutexGuard<'_, PreviewStats> {
    stats.lock().unwrap_or_else(PoisonError::into_inner)
}

fn run_worker(
    mut baseline: Arc<Image>,
    submit_rx: mpsc::Receiver<WorkerMessage>,
    result_tx: mpsc::Sender<PreviewFrame>,
    stats: Arc<Mutex<PreviewStats>>,
) {
    while let Ok(message) = submit_rx.recv() {
        let mut pending = None;
        handle_message(message, &mut baseline, &mut pending, &stats);
        while let Ok(next) = submit_rx.try_recv() {
            handle_message(next, &mut baseline, &mut pending, &stats);
        }

        let Some(job) = pending else {
            continue;
        };
        if job.token.is_cancelled() {
            mark_cancelled(&stats, job.token.sequence());
            continue;
        }

        let started = Instant::now();
        let Some(image) = adjust_cancellable(&baseline, &job.controls, &job.token) else {
            mark_cancelled(&stats, job.token.sequence());
            continue;
        };
        let render_time = started.elapsed();
        log::debug!(
            "rendered frame {} ({}x{}) in {:?}",
            job.token.sequence(),
            image.width(),
            image.height(),
            render_time
        );

        lock_stats(&stats).completed += 1;
        let frame = PreviewFrame {
            sequence: job.token.sequence(),
            controls: job.controls,
            image,
            render_time,
        };
        if result_tx.send(frame).is_err() {
            log::warn!("preview result channel closed, stopping worker");
            return;
        }
    }
}

fn handle_message(
    message: WorkerMessage,
    baseline: &mut Arc<Image>,
    pending: &mut Option<RenderJob>,
    stats: &Arc<Mutex<PreviewStats>>,
) {
    match message {
        WorkerMessage::Render(job) => {
            if let Some(replaced) = pending.replace(job) {
                mark_cancelled(stats, replaced.token.sequence());
            }
        }
        WorkerMessage::SetBaseline(image) => *baseline = image,
    }
}

fn mark_cancelled(stats: &Arc<Mutex<PreviewStats>>, sequence: u64) {
    log::trace!("render {} superseded", sequence);
    lock_stats(stats).cancelled += 1;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adjustments::adjust;
    use crate::placeholder::placeholder_image;
    use crate::types::Pixel;

    const WAIT: Duration = Duration::from_secs(10);

    fn large_image() -> Image {
        Image::filled(1500, 1500, Pixel::rgb(90, 120, 150)).unwrap()
    }

    #[test]
    fn test_single_request_is_delivered() {
        let baseline = placeholder_image();
        let worker = PreviewWorker::new(baseline.clone()).unwrap();
        let controls = Controls::new(10.0, 20.0, 30.0, 1.2);

        let sequence = worker.submit(controls).unwrap();
        let frame = worker.recv_timeout(WAIT).unwrap().expect("frame");

        assert_eq!(frame.sequence, sequence);
        assert_eq!(frame.controls, controls);
        assert_eq!(frame.image, adjust(&baseline, &controls));
    }

    #[test]
    fn test_latest_request_wins() {
        let baseline = large_image();
        let worker = PreviewWorker::new(baseline.clone()).unwrap();

        let first = Controls::new(50.0, 0.0, 0.0, 1.0);
        let second = Controls::new(-20.0, 40.0, 10.0, 0.9);
        worker.submit(first).unwrap();
        let latest = worker.submit(second).unwrap();

        let frame = worker.recv_timeout(WAIT).unwrap().expect("frame");
        assert_eq!(frame.sequence, latest);
        assert_eq!(frame.image, adjust(&baseline, &second));

        // Nothing from the superseded request shows up afterwards
        assert!(worker
            .recv_timeout(Duration::from_millis(200))
            .unwrap()
            .is_none());

        let stats = worker.stats();
        assert_eq!(stats.submitted, 2);
        assert!(stats.cancelled + stats.dropped >= 1);
    }

    #[test]
    fn test_burst_of_requests_delivers_only_last() {
        let baseline = large_image();
        let worker = PreviewWorker::new(baseline).unwrap();

        let mut latest = 0;
        for i in 0..8 {
            latest = worker
                .submit(Controls::new(i as f32, 0.0, 0.0, 1.0))
                .unwrap();
        }

        let frame = worker.recv_timeout(WAIT).unwrap().expect("frame");
        assert_eq!(frame.sequence, latest);
        assert_eq!(frame.controls.brightness, 7.0);
        assert_eq!(worker.stats().submitted, 8);
    }

    #[test]
    fn test_set_baseline_applies_to_next_request() {
        let worker = PreviewWorker::new(placeholder_image()).unwrap();
        let replacement = Image::filled(4, 4, Pixel::rgb(10, 10, 10)).unwrap();
        let controls = Controls::new(5.0, 0.0, 0.0, 1.0);

        worker.set_baseline(replacement).unwrap();
        worker.submit(controls).unwrap();

        let frame = worker.recv_timeout(WAIT).unwrap().expect("frame");
        assert_eq!(frame.image.width(), 4);
        assert!(frame.image.pixels().all(|p| p == Pixel::rgb(15, 15, 15)));
    }

    #[test]
    fn test_set_baseline_cancels_in_flight_request() {
        let worker = PreviewWorker::new(large_image()).unwrap();
        worker.submit(Controls::new(30.0, 0.0, 0.0, 1.0)).unwrap();
        worker
            .set_baseline(Image::filled(2, 2, Pixel::rgb(0, 0, 0)).unwrap())
            .unwrap();

        assert!(worker
            .recv_timeout(Duration::from_millis(500))
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_recv_timeout_keeps_frame_when_worker_exits() {
        let (submit_tx, _submit_rx) = mpsc::channel();
        let (result_tx, result_rx) = mpsc::channel();
        let worker = PreviewWorker {
            gate: RenderGate::new(),
            submit_tx,
            result_rx,
            stats: Arc::new(Mutex::new(PreviewStats::default())),
        };
        let sequence = worker.gate.begin().sequence();

        result_tx
            .send(PreviewFrame {
                sequence,
                controls: Controls::default(),
                image: placeholder_image(),
                render_time: Duration::ZERO,
            })
            .unwrap();
        drop(result_tx);

        let frame = worker.recv_timeout(WAIT).unwrap().expect("frame");
        assert_eq!(frame.sequence, sequence);
        assert!(matches!(
            worker.recv_timeout(WAIT),
            Err(PreviewError::Disconnected)
        ));
    }

    #[test]
    fn test_stats_survive_poisoned_lock() {
        let worker = PreviewWorker::new(placeholder_image()).unwrap();
        let stats = Arc::clone(&worker.stats);
        let _ = thread::spawn(move || {
            let _guard = stats.lock().unwrap();
            panic!("poison the stats lock");
        })
        .join();
        assert!(worker.stats.is_poisoned());

        let sequence = worker.submit(Controls::default()).unwrap();
        let frame = worker.recv_timeout(WAIT).unwrap().expect("frame");
        assert_eq!(frame.sequence, sequence);

        let stats = worker.stats();
        assert_eq!(stats.submitted, 1);
        assert_eq!(stats.completed, 1);
    }

    #[test]
    fn test_try_receive_empty() {
        let worker = PreviewWorker::new(placeholder_image()).unwrap();
        assert!(worker.try_receive().unwrap().is_none());
        assert_eq!(worker.current_sequence(), 0);
    }
}
