//! Frame-aligned batching of repaint requests.
//!
//! Any number of requests made before the next display refresh coalesce into
//! one frame. A frame runs the queued tasks in priority order
//! (high, normal, low; ties in insertion order) and then the single main
//! render callback.
//!
//! ```text
//!   Idle --schedule_task--> Pending --on_frame--> Idle
//!     ^                        |
//!     +------ cancel_all ------+
//! ```
//!
//! Callbacks are trusted: a panicking task aborts the rest of its frame.

use std::cell::RefCell;
use std::fmt;
use std::mem;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use web_time::Instant;

use super::frame::{FrameHandle, FrameRequester, HostFrames};

/// Window over which frames are counted for [`RenderScheduler::fps`].
const FPS_WINDOW_MS: f64 = 1000.0;

/// Task id used by [`RenderScheduler::schedule`].
pub const DEFAULT_TASK_ID: &str = "default";

/// Relative ordering of tasks within one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderPriority {
    /// Selection, cursor - must settle first
    High,
    /// Cell content changes
    Normal,
    /// Grid lines, backgrounds
    Low,
}

/// One-shot task callback.
pub type TaskCallback = Box<dyn FnOnce()>;

/// Main render callback, run at the end of every executed frame.
pub type RenderCallback = Rc<dyn Fn()>;

/// A queued unit of frame work, keyed by `id`.
pub struct RenderTask {
    pub id: String,
    pub priority: RenderPriority,
    pub callback: TaskCallback,
    pub timestamp: Instant,
}

impl fmt::Debug for RenderTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderTask")
            .field("id", &self.id)
            .field("priority", &self.priority)
            .field("timestamp", &self.timestamp)
            .finish_non_exhaustive()
    }
}

/// Work drained out of the scheduler for one frame.
///
/// Running a frame needs no access to the scheduler, so callbacks are free
/// to schedule more work; that work lands in the next frame.
#[must_use = "a frame does nothing until it is run"]
pub struct Frame {
    tasks: Vec<RenderTask>,
    render: Option<RenderCallback>,
}

impl Frame {
    pub fn task_count(&self) -> usize {
        self.tasks.len()
    }

    /// Run the tasks by priority, then the render callback.
    pub fn run(self) {
        let Self { mut tasks, render } = self;
        // Stable sort keeps insertion order within a priority.
        tasks.sort_by_key(|task| task.priority);
        for task in tasks {
            (task.callback)();
        }
        if let Some(render) = render {
            render();
        }
    }
}

/// Batches render requests into single refresh-aligned frames.
pub struct RenderScheduler {
    tasks: Vec<RenderTask>,
    render_callback: Option<RenderCallback>,
    requester: Box<dyn FrameRequester>,
    frame: Option<FrameHandle>,
    frame_count: u32,
    last_fps_update: f64,
    fps: u32,
}

impl Default for RenderScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderScheduler {
    /// Scheduler backed by a host-pumped [`HostFrames`] requester.
    pub fn new() -> Self {
        Self::with_requester(HostFrames::default())
    }

    pub fn with_requester(requester: impl FrameRequester + 'static) -> Self {
        Self {
            tasks: Vec::new(),
            render_callback: None,
            requester: Box::new(requester),
            frame: None,
            frame_count: 0,
            last_fps_update: 0.0,
            fps: 0,
        }
    }

    /// Register the callback run at the end of every executed frame.
    pub fn set_render_callback(&mut self, callback: impl Fn() + 'static) {
        self.render_callback = Some(Rc::new(callback));
    }

    /// Request a frame without extra work.
    pub fn schedule(&mut self) {
        self.schedule_task(DEFAULT_TASK_ID, RenderPriority::Normal, || {});
    }

    /// Insert or replace the task keyed by `id`, requesting a frame if idle.
    ///
    /// A replaced task keeps its queue position.
    pub fn schedule_task(
        &mut self,
        id: impl Into<String>,
        priority: RenderPriority,
        callback: impl FnOnce() + 'static,
    ) {
        let id = id.into();
        let task = RenderTask {
            id,
            priority,
            callback: Box::new(callback),
            timestamp: Instant::now(),
        };
        match self.tasks.iter_mut().find(|queued| queued.id == task.id) {
            Some(queued) => *queued = task,
            None => self.tasks.push(task),
        }
        self.request_frame();
    }

    /// Selection, cursor
    pub fn schedule_high_priority(
        &mut self,
        id: impl Into<String>,
        callback: impl FnOnce() + 'static,
    ) {
        self.schedule_task(id, RenderPriority::High, callback);
    }

    /// Content
    pub fn schedule_normal(
        &mut self,
        id: impl Into<String>,
        callback: impl FnOnce() + 'static,
    ) {
        self.schedule_task(id, RenderPriority::Normal, callback);
    }

    /// Grid, backgrounds
    pub fn schedule_low(&mut self, id: impl Into<String>, callback: impl FnOnce() + 'static) {
        self.schedule_task(id, RenderPriority::Low, callback);
    }

    /// Remove one queued task. The frame request, if any, stays pending.
    pub fn cancel_task(&mut self, id: &str) {
        self.tasks.retain(|task| task.id != id);
    }

    /// Cancel the pending frame request and drop every queued task.
    pub fn cancel_all(&mut self) {
        if let Some(handle) = self.frame.take() {
            self.requester.cancel_frame(handle);
        }
        self.tasks.clear();
    }

    /// Discard pending work and render synchronously.
    ///
    /// Forced frames do not count towards [`RenderScheduler::fps`].
    pub fn render_now(&mut self) {
        self.cancel_all();
        self.take_frame().run();
    }

    /// Refresh-callback entry point: execute the pending frame.
    ///
    /// Firing with no frame requested (a stale callback after a cancel) is a
    /// no-op apart from the render callback, and is not counted in fps.
    pub fn on_frame(&mut self, timestamp_ms: f64) {
        self.begin_frame(timestamp_ms).run();
    }

    /// First half of [`RenderScheduler::on_frame`]: return to idle, update
    /// the fps counter and drain the queued work.
    pub fn begin_frame(&mut self, timestamp_ms: f64) -> Frame {
        if self.frame.take().is_some() {
            self.frame_count = self.frame_count.saturating_add(1);
            if timestamp_ms - self.last_fps_update >= FPS_WINDOW_MS {
                self.fps = self.frame_count;
                self.frame_count = 0;
                self.last_fps_update = timestamp_ms;
            }
        } else {
            tracing::trace!(target: "gridframe.scheduler", timestamp_ms, "frame_unrequested");
        }

        let frame = self.take_frame();
        tracing::debug!(
            target: "gridframe.scheduler",
            tasks = frame.task_count(),
            timestamp_ms,
            "frame"
        );
        frame
    }

    pub fn is_pending(&self) -> bool {
        self.frame.is_some()
    }

    pub fn pending_count(&self) -> usize {
        self.tasks.len()
    }

    /// Requested frames executed through `on_frame` during the last full second.
    pub fn fps(&self) -> u32 {
        self.fps
    }

    /// Cancel everything and drop the render callback.
    pub fn destroy(&mut self) {
        self.cancel_all();
        self.render_callback = None;
    }

    fn take_frame(&mut self) -> Frame {
        Frame {
            tasks: mem::take(&mut self.tasks),
            render: self.render_callback.clone(),
        }
    }

    fn request_frame(&mut self) {
        if self.frame.is_some() {
            return;
        }
        match self.requester.request_frame() {
            Ok(handle) => self.frame = Some(handle),
            Err(err) => {
                // Stay idle so the next schedule call retries.
                tracing::warn!(
                    target: "gridframe.scheduler",
                    error = %err,
                    queued = self.tasks.len(),
                    "frame_request_failed"
                );
            }
        }
    }
}

impl Drop for RenderScheduler {
    fn drop(&mut self) {
        if let Some(handle) = self.frame.take() {
            self.requester.cancel_frame(handle);
        }
    }
}

impl fmt::Debug for RenderScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderScheduler")
            .field("tasks", &self.tasks)
            .field("pending", &self.is_pending())
            .field("has_render_callback", &self.render_callback.is_some())
            .field("fps", &self.fps)
            .finish_non_exhaustive()
    }
}

/// Single-threaded shared handle to a [`RenderScheduler`].
///
/// Frame execution borrows the scheduler only long enough to drain it, so
/// tasks and the render callback may hold a clone and schedule again.
#[derive(Clone, Default)]
pub struct SharedScheduler {
    inner: Rc<RefCell<RenderScheduler>>,
}

impl SharedScheduler {
    pub fn new(scheduler: RenderScheduler) -> Self {
        Self {
            inner: Rc::new(RefCell::new(scheduler)),
        }
    }

    /// Scheduler driven by `window.requestAnimationFrame`.
    #[cfg(target_arch = "wasm32")]
    pub fn with_animation_frames() -> Self {
        let inner = Rc::new_cyclic(|weak| {
            RefCell::new(RenderScheduler::with_requester(
                super::frame::AnimationFrames::new(std::rc::Weak::clone(weak)),
            ))
        });
        Self { inner }
    }

    #[cfg(target_arch = "wasm32")]
    pub(crate) fn from_rc(inner: Rc<RefCell<RenderScheduler>>) -> Self {
        Self { inner }
    }

    /// Run `f` with the scheduler borrowed mutably.
    ///
    /// Must not be called from inside a task or render callback that is
    /// being run by [`RenderScheduler::on_frame`] on the same scheduler.
    pub fn with<R>(&self, f: impl FnOnce(&mut RenderScheduler) -> R) -> R {
        f(&mut *self.inner.borrow_mut())
    }

    pub fn set_render_callback(&self, callback: impl Fn() + 'static) {
        self.with(|s| s.set_render_callback(callback));
    }

    pub fn schedule(&self) {
        self.with(RenderScheduler::schedule);
    }

    pub fn schedule_task(
        &self,
        id: impl Into<String>,
        priority: RenderPriority,
        callback: impl FnOnce() + 'static,
    ) {
        self.with(|s| s.schedule_task(id, priority, callback));
    }

    pub fn cancel_task(&self, id: &str) {
        self.with(|s| s.cancel_task(id));
    }

    pub fn cancel_all(&self) {
        self.with(RenderScheduler::cancel_all);
    }

    /// Execute the pending frame with the scheduler released.
    pub fn fire(&self, timestamp_ms: f64) {
        let frame = self.with(|s| s.begin_frame(timestamp_ms));
        frame.run();
    }

    /// Discard pending work and render synchronously, scheduler released.
    pub fn render_now(&self) {
        let frame = self.with(|s| {
            s.cancel_all();
            s.take_frame()
        });
        frame.run();
    }

    pub fn is_pending(&self) -> bool {
        self.inner.borrow().is_pending()
    }

    pub fn pending_count(&self) -> usize {
        self.inner.borrow().pending_count()
    }

    pub fn fps(&self) -> u32 {
        self.inner.borrow().fps()
    }

    pub fn destroy(&self) {
        self.with(RenderScheduler::destroy);
    }
}

impl fmt::Debug for SharedScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.inner.try_borrow() {
            Ok(scheduler) => scheduler.fmt(f),
            Err(_) => f.write_str("SharedScheduler(<running>)"),
        }
    }
}
