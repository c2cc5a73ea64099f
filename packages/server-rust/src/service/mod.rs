//! Response orchestration for domain handlers.
//!
//! - `classify`: declared status -> response branch
//! - `operation`: per-call options and outcome labels
//! - `response`: the rendered response object
//! - `orchestrator`: the validate/invoke/classify pipeline

pub mod classify;
pub mod operation;
pub mod orchestrator;
pub mod response;

pub use classify::StatusClass;
pub use operation::{ExecuteOptions, Outcome, Packaging, REQUEST_CANCELLED};
pub use orchestrator::{ResponseOrchestrator, FAULT_PREFIX};
pub use response::{ApiResponse, ResponseBody};
