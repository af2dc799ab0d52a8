//! 计划层：类型、构建器、执行器

pub mod builder;
pub mod executor;
pub mod types;

pub use builder::PlanBuilder;
pub use executor::PlanExecutor;
pub use types::{ExecutionReport, Plan, Step, StepArg, StepOutcome, StepStatus};
