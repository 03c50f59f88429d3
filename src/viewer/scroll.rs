//! Scroll invalidation and the settle pass.
//!
//! While the user scrolls, each frame repaints everything at the new offset.
//! Once scrolling has been quiet for the settle delay, one more full pass
//! runs so anything drawn mid-scroll is redone at rest.

use web_time::Instant;

use super::{GridPainter, GridSource, GridView};

/// Delay (ms) after scroll stops before triggering a settle render.
pub(crate) const SCROLL_SETTLE_DELAY_MS: u64 = 100;

impl<S, P> GridView<S, P>
where
    S: GridSource + 'static,
    P: GridPainter + 'static,
{
    /// Record a scroll offset change and (re)arm the settle timer.
    pub fn mark_scroll_dirty(&mut self, now: Instant) {
        {
            let mut state = self.state.borrow_mut();
            state.sync_viewport();
            state.dirty.mark_scroll();
        }
        self.scheduler.schedule();
        self.settle.trigger(now);
    }

    /// Run the settle pass once the quiet period has elapsed.
    ///
    /// Returns `true` when a settle pass was scheduled.
    pub fn poll_settle(&mut self, now: Instant) -> bool {
        if !self.settle.poll(now) {
            return false;
        }
        tracing::debug!(target: "gridframe.view", "scroll_settled");
        self.state.borrow_mut().dirty.mark_all();
        self.render();
        true
    }

    pub fn is_settle_armed(&self) -> bool {
        self.settle.is_armed()
    }
}
