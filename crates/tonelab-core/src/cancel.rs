//! Latest-wins cancellation.
//!
//! A [`RenderGate`] hands out [`CancelToken`]s stamped with a generation
//! number. Issuing a new token moves the generation forward, which cancels
//! every token issued before it. Renders poll their token between stages and
//! give up as soon as they are superseded.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Issues generation-stamped cancellation tokens.
#[derive(Debug, Clone, Default)]
pub struct RenderGate {
    latest: Arc<AtomicU64>,
}

impl RenderGate {
    /// Create a gate at generation 0 with no outstanding tokens.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new render, cancelling every earlier token.
    pub fn begin(&self) -> CancelToken {
        let sequence = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
        CancelToken {
            sequence,
            latest: Arc::clone(&self.latest),
        }
    }

    /// Rebuild the token for a sequence returned by an earlier `begin`.
    ///
    /// Useful when the sequence number crossed an FFI boundary.
    pub fn token_for(&self, sequence: u64) -> CancelToken {
        CancelToken {
            sequence,
            latest: Arc::clone(&self.latest),
        }
    }

    /// Cancel every outstanding token without starting a new render.
    pub fn cancel_all(&self) {
        self.latest.fetch_add(1, Ordering::SeqCst);
    }

    /// The current generation.
    pub fn current(&self) -> u64 {
        self.latest.load(Ordering::SeqCst)
    }

    /// Whether `sequence` is still the newest generation.
    pub fn is_current(&self, sequence: u64) -> bool {
        self.current() == sequence
    }
}

/// Handle for one render request.
#[derive(Debug, Clone)]
pub struct CancelToken {
    sequence: u64,
    latest: Arc<AtomicU64>,
}

impl CancelToken {
    /// A token that is never cancelled, for synchronous callers.
    pub fn never() -> Self {
        Self {
            sequence: 0,
            latest: Arc::new(AtomicU64::new(0)),
        }
    }

    /// The generation this token was issued for.
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// True once a newer token has been issued or the gate cancelled.
    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.latest.load(Ordering::SeqCst) != self.sequence
    }

    #[inline]
    pub fn is_current(&self) -> bool {
        !self.is_cancelled()
    }
}
