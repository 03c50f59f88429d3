//! Render coordination: what to repaint and when.
//!
//! This module provides:
//! - Dirty-region tracking with merging and full-redraw escalation
//! - A frame scheduler that coalesces repaint requests per display refresh
//! - Frame request primitives (host-pumped, interval-pumped, animation frames)
//! - Throttle/debounce gates for input pacing

pub mod dirty;
pub mod frame;
pub mod pacing;
pub mod scheduler;

pub use dirty::{DirtyKind, DirtyRegion, DirtyState, DirtyTracker, MAX_DIRTY_REGIONS};
pub use frame::{FrameHandle, FrameRequester, FrameSignal, HostFrames, IntervalPump};
pub use pacing::{Debounce, Throttle, ThrottleDecision};
pub use scheduler::{
    Frame, RenderCallback, RenderPriority, RenderScheduler, RenderTask, SharedScheduler,
    TaskCallback, DEFAULT_TASK_ID,
};

#[cfg(target_arch = "wasm32")]
pub use frame::AnimationFrames;
