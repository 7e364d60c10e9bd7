//! Cancel-and-restart timers driven by an external millisecond clock.

/// Single-shot debounce: only the last queued event in a burst fires, once
/// `delay_ms` has passed without another one.
#[derive(Debug, Clone)]
pub(crate) struct Debouncer {
    delay_ms: u64,
    pending: Option<u64>,
}

impl Debouncer {
    pub(crate) const fn new(delay_ms: u64) -> Self {
        Self {
            delay_ms,
            pending: None,
        }
    }

    /// (Re)start the timer at `now_ms`, replacing any pending deadline.
    pub(crate) const fn queue(&mut self, now_ms: u64) {
        self.pending = Some(now_ms);
    }

    /// Returns true exactly once when the quiet period has elapsed.
    pub(crate) fn take_ready(&mut self, now_ms: u64) -> bool {
        let Some(queued_at) = self.pending else {
            return false;
        };
        if now_ms.saturating_sub(queued_at) >= self.delay_ms {
            self.pending = None;
            true
        } else {
            false
        }
    }

    pub(crate) const fn cancel(&mut self) {
        self.pending = None;
    }

    pub(crate) const fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// When the pending event will fire, if any.
    pub(crate) fn deadline(&self) -> Option<u64> {
        self.pending.map(|queued_at| queued_at.saturating_add(self.delay_ms))
    }
}

/// Outcome shown by the transient save indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveStatus {
    Saved,
    Failed,
}

/// A status that reverts on its own after a fixed delay.
#[derive(Debug, Clone)]
pub(crate) struct StatusIndicator {
    revert_after_ms: u64,
    current: Option<(SaveStatus, u64)>,
}

impl StatusIndicator {
    pub(crate) const fn new(revert_after_ms: u64) -> Self {
        Self {
            revert_after_ms,
            current: None,
        }
    }

    /// Show `status`, restarting the revert timer.
    pub(crate) const fn show(&mut self, status: SaveStatus, now_ms: u64) {
        self.current = Some((status, now_ms.saturating_add(self.revert_after_ms)));
    }

    /// Clear an expired status. Returns true if something was cleared.
    pub(crate) fn expire(&mut self, now_ms: u64) -> bool {
        if self
            .current
            .is_some_and(|(_, expires_at)| expires_at <= now_ms)
        {
            self.current = None;
            return true;
        }
        false
    }

    pub(crate) fn current(&self) -> Option<SaveStatus> {
        self.current.map(|(status, _)| status)
    }

    /// When the showing status reverts, if any.
    pub(crate) fn deadline(&self) -> Option<u64> {
        self.current.map(|(_, expires_at)| expires_at)
    }
}
