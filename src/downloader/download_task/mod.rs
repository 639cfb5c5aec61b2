//! Download task execution -- one runner per submitted task.
//!
//! Split into focused submodules:
//! - [`context`] - Shared state and event/registry helpers for one task
//! - [`orchestration`] - Top-level lifecycle driving the extractor
//! - [`progress`] - Percent normalization of tool samples
//! - [`artifact`] - Locating, relocating and cleaning up produced files

mod artifact;
mod context;
mod orchestration;
mod progress;


pub(crate) use context::TaskContext;
pub(crate) use orchestration::run_download_task;
