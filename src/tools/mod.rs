//! 工具箱：注册表与三种能力（日程、通知、工单簿记）

pub mod bookkeeping;
pub mod notifier;
pub mod registry;
pub mod scheduler;

use serde_json::Value;

use crate::core::ToolError;

pub use bookkeeping::RequestBookkeepingTool;
pub use notifier::NotifierTool;
pub use registry::{Tool, ToolOutput, ToolRegistry};
pub use scheduler::SchedulerTool;

/// 从 JSON 参数中取必填字符串；缺失或类型不符为 Soft（参数校验类错误）
pub(crate) fn require_str<'a>(args: &'a Value, field: &str) -> Result<&'a str, ToolError> {
    args.get(field)
        .and_then(|v| v.as_str())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ToolError::soft(format!("missing required field '{}'", field)))
}
