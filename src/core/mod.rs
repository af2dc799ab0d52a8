//! 核心层：错误分级、运行状态、优先级排序、运行上下文

pub mod context;
pub mod error;
pub mod ranker;
pub mod state;

pub use context::RunContext;
pub use error::{PlanError, ToolError};
pub use ranker::{prioritize, urgency_score};
pub use state::{Appointment, Notification, Request, RunEffect, RunState};
