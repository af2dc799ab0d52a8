//! 日程工具：在日历后端上预定固定时段
//!
//! 日期必须是无歧义的 YYYY-MM-DD；校验失败为 Soft。预约永远占用配置时区内
//! 10:00–11:00 的一小时窗口——这是刻意的简化策略，不做通用排程求解。
//! 后端拒绝单次操作为 Soft，认证失败为 Hard。

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::Value;

use crate::core::{Appointment, RunContext, RunEffect, ToolError};
use crate::providers::{CalendarBackend, ProviderError};
use crate::tools::registry::{Tool, ToolOutput};
use crate::tools::require_str;

/// 预约开始整点（固定策略）
const SLOT_START_HOUR: u32 = 10;

/// 日程工具：date / patient / condition -> 预约记录
pub struct SchedulerTool {
    calendar: Arc<dyn CalendarBackend>,
    timezone: String,
}

impl SchedulerTool {
    pub const ID: &'static str = "schedule_tool";

    pub fn new(calendar: Arc<dyn CalendarBackend>, timezone: impl Into<String>) -> Self {
        Self {
            calendar,
            timezone: timezone.into(),
        }
    }
}

#[async_trait]
impl Tool for SchedulerTool {
    fn name(&self) -> &str {
        Self::ID
    }

    fn description(&self) -> &str {
        "Schedule an appointment in the fixed 10:00-11:00 slot on the given date."
    }

    fn parameters_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "date": { "type": "string", "description": "Appointment date (format: YYYY-MM-DD)" },
                "patient": { "type": "string", "description": "Patient name" },
                "condition": { "type": "string", "description": "Reason for appointment" }
            },
            "required": ["date", "patient", "condition"]
        })
    }

    async fn execute(&self, ctx: &RunContext, args: Value) -> Result<ToolOutput, ToolError> {
        let date_raw = require_str(&args, "date")?;
        let patient = require_str(&args, "patient")?.to_string();
        let condition = require_str(&args, "condition")?.to_string();

        let date = NaiveDate::parse_from_str(date_raw, "%Y-%m-%d").map_err(|_| {
            ToolError::soft(format!("invalid date format: {}. Use YYYY-MM-DD", date_raw))
        })?;

        // 固定一小时窗口；整点常量必然合法
        let start = date
            .and_hms_opt(SLOT_START_HOUR, 0, 0)
            .expect("valid slot start");
        let end = date
            .and_hms_opt(SLOT_START_HOUR + 1, 0, 0)
            .expect("valid slot end");

        let summary = format!("Appointment for {}", patient);
        let description = format!("Condition: {}", condition);
        let event_id = self
            .calendar
            .create_event(&summary, &description, start, end, &self.timezone)
            .await
            .map_err(|e| match e {
                ProviderError::Auth(reason) => {
                    ToolError::hard(format!("calendar unavailable: {}", reason))
                }
                ProviderError::Rejected(reason) => {
                    ToolError::soft(format!("failed to schedule event: {}", reason))
                }
            })?;

        let appointment = Appointment {
            patient: patient.clone(),
            condition,
            start,
            end,
            timezone: self.timezone.clone(),
            event_id: event_id.clone(),
            email: ctx.email_for(&patient),
        };

        Ok(ToolOutput::with_effect(
            format!(
                "Scheduled appointment for {} on {} at 10:00 {}. Event ID: {}",
                patient, date_raw, self.timezone, event_id
            ),
            RunEffect::AppointmentBooked(appointment),
        ))
    }
}
