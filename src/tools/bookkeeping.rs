//! 工单簿记工具：add / rank / list
//!
//! add 要求四个字段齐全（缺失为 Soft），以 RequestAdded 变更交执行器落账；
//! rank 在快照上重算分值并报告顺序，不改动工单；list 报告当前患者列表。
//! 未知 action 为 Soft。

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;

use crate::core::{prioritize, Request, RunContext, RunEffect, ToolError};
use crate::tools::registry::{Tool, ToolOutput};
use crate::tools::require_str;

/// 工单簿记工具
pub struct RequestBookkeepingTool;

impl RequestBookkeepingTool {
    pub const ID: &'static str = "request_manager";
}

#[async_trait]
impl Tool for RequestBookkeepingTool {
    fn name(&self) -> &str {
        Self::ID
    }

    fn description(&self) -> &str {
        "Manage patient appointment requests (actions: add, rank, list)."
    }

    fn parameters_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "action": { "type": "string", "description": "Action to perform: add, rank, or list" },
                "patient": { "type": "string", "description": "Patient name (required for add)" },
                "condition": { "type": "string", "description": "Condition (required for add)" },
                "urgency": { "type": "string", "description": "Urgency level: urgent, moderate, routine (required for add)" },
                "email": { "type": "string", "description": "Patient email (required for add)" }
            },
            "required": ["action"]
        })
    }

    async fn execute(&self, ctx: &RunContext, args: Value) -> Result<ToolOutput, ToolError> {
        let action = require_str(&args, "action")?;
        match action {
            "add" => {
                let patient = require_str(&args, "patient")?.to_string();
                let condition = require_str(&args, "condition")?.to_string();
                let urgency = require_str(&args, "urgency")?.to_string();
                let email = require_str(&args, "email")?.to_string();

                let request = Request::new(&patient, condition, urgency, email, Utc::now());
                Ok(ToolOutput::with_effect(
                    format!("Added request for {}", patient),
                    RunEffect::RequestAdded(request),
                ))
            }
            "rank" => {
                let ranked = prioritize(&ctx.worklist);
                let order: Vec<&str> = ranked.iter().map(|r| r.patient.as_str()).collect();
                Ok(ToolOutput::text(format!(
                    "Prioritized requests: [{}]",
                    order.join(", ")
                )))
            }
            "list" => {
                let patients: Vec<&str> =
                    ctx.worklist.iter().map(|r| r.patient.as_str()).collect();
                Ok(ToolOutput::text(format!(
                    "Current requests: [{}]",
                    patients.join(", ")
                )))
            }
            other => Err(ToolError::soft(format!("unknown action: {}", other))),
        }
    }
}
