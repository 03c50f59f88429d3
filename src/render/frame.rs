//! "Request next tick" primitives behind the render scheduler.
//!
//! In the browser a frame request maps onto `requestAnimationFrame`. Other
//! hosts pump frames themselves: [`HostFrames`] raises a [`FrameSignal`]
//! that the host loop observes, and [`IntervalPump`] turns that signal into
//! paced frame timestamps.

use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use web_time::Instant;

use crate::error::Result;

/// Opaque id of an outstanding frame request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameHandle(pub i64);

/// Something that can arrange for the scheduler's frame callback to run on
/// the next display refresh.
pub trait FrameRequester {
    /// Request one frame. The host later calls back into the scheduler.
    fn request_frame(&mut self) -> Result<FrameHandle>;

    /// Cancel an outstanding request. Unknown handles are ignored.
    fn cancel_frame(&mut self, handle: FrameHandle);
}

#[derive(Debug, Clone, Copy, Default)]
struct SignalState {
    requested: Option<FrameHandle>,
    next_id: i64,
    requests: u64,
}

/// Shared flag between a [`HostFrames`] requester and the host loop.
#[derive(Debug, Clone, Default)]
pub struct FrameSignal {
    inner: Rc<Cell<SignalState>>,
}

impl FrameSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a frame is currently requested and not yet taken.
    pub fn is_requested(&self) -> bool {
        self.inner.get().requested.is_some()
    }

    /// Total number of requests raised so far (cancelled ones included).
    pub fn request_count(&self) -> u64 {
        self.inner.get().requests
    }

    /// Consume the outstanding request, if any.
    pub fn take(&self) -> Option<FrameHandle> {
        let mut state = self.inner.get();
        let handle = state.requested.take();
        self.inner.set(state);
        handle
    }

    fn raise(&self) -> FrameHandle {
        let mut state = self.inner.get();
        state.next_id = state.next_id.wrapping_add(1);
        state.requests = state.requests.saturating_add(1);
        let handle = FrameHandle(state.next_id);
        state.requested = Some(handle);
        self.inner.set(state);
        handle
    }

    fn lower(&self, handle: FrameHandle) {
        let mut state = self.inner.get();
        if state.requested == Some(handle) {
            state.requested = None;
            self.inner.set(state);
        }
    }
}

/// Host-pumped requester: raises a [`FrameSignal`] and leaves firing to the
/// host, which calls `on_frame` on its next refresh.
#[derive(Debug, Clone, Default)]
pub struct HostFrames {
    signal: FrameSignal,
}

impl HostFrames {
    pub fn new(signal: FrameSignal) -> Self {
        Self { signal }
    }

    pub fn signal(&self) -> &FrameSignal {
        &self.signal
    }
}

impl FrameRequester for HostFrames {
    fn request_frame(&mut self) -> Result<FrameHandle> {
        Ok(self.signal.raise())
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        self.signal.lower(handle);
    }
}

/// Timer-driven pump for hosts without a display-refresh callback.
///
/// The host polls with the current time; a frame timestamp (milliseconds
/// since `origin`) comes back at most once per interval while a frame is
/// requested.
#[derive(Debug, Clone)]
pub struct IntervalPump {
    signal: FrameSignal,
    interval: Duration,
    origin: Instant,
    last_fire: Option<Instant>,
}

impl IntervalPump {
    /// Roughly one 60Hz refresh.
    pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(16);

    pub fn new(signal: FrameSignal, origin: Instant) -> Self {
        Self {
            signal,
            interval: Self::DEFAULT_INTERVAL,
            origin,
            last_fire: None,
        }
    }

    #[must_use]
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Earliest instant at which [`IntervalPump::poll`] could fire, or
    /// `None` when no frame is requested.
    pub fn next_deadline(&self) -> Option<Instant> {
        if !self.signal.is_requested() {
            return None;
        }
        Some(match self.last_fire {
            Some(last) => last + self.interval,
            None => self.origin,
        })
    }

    /// Fire the requested frame if the interval has elapsed.
    pub fn poll(&mut self, now: Instant) -> Option<f64> {
        if let Some(last) = self.last_fire {
            if now.saturating_duration_since(last) < self.interval {
                return None;
            }
        }
        self.signal.take()?;
        self.last_fire = Some(now);
        Some(now.saturating_duration_since(self.origin).as_secs_f64() * 1000.0)
    }
}

#[cfg(target_arch = "wasm32")]
pub use animation::AnimationFrames;

#[cfg(target_arch = "wasm32")]
mod animation {
    use std::cell::RefCell;
    use std::rc::Weak;

    use wasm_bindgen::closure::Closure;
    use wasm_bindgen::JsCast;

    use super::{FrameHandle, FrameRequester};
    use crate::error::{GridError, Result};
    use crate::render::scheduler::{RenderScheduler, SharedScheduler};

    /// `requestAnimationFrame`-backed requester.
    pub struct AnimationFrames {
        closure: Closure<dyn FnMut(f64)>,
    }

    impl AnimationFrames {
        pub(crate) fn new(scheduler: Weak<RefCell<RenderScheduler>>) -> Self {
            let closure = Closure::wrap(Box::new(move |timestamp: f64| {
                if let Some(shared) = scheduler.upgrade() {
                    SharedScheduler::from_rc(shared).fire(timestamp);
                }
            }) as Box<dyn FnMut(f64)>);
            Self { closure }
        }
    }

    impl FrameRequester for AnimationFrames {
        fn request_frame(&mut self) -> Result<FrameHandle> {
            let window =
                web_sys::window().ok_or_else(|| GridError::FrameRequest("no window".into()))?;
            let id = window
                .request_animation_frame(self.closure.as_ref().unchecked_ref())
                .map_err(|e| GridError::FrameRequest(format!("{e:?}")))?;
            Ok(FrameHandle(i64::from(id)))
        }

        fn cancel_frame(&mut self, handle: FrameHandle) {
            let Some(window) = web_sys::window() else {
                return;
            };
            if let Ok(id) = i32::try_from(handle.0) {
                let _ = window.cancel_animation_frame(id);
            }
        }
    }
}
