//! 通知工具：按固定模板发送确认邮件
//!
//! to / subject / body 必填，缺失为 Soft；可选 event 输入（预约凭据，来自上游
//! 日程步骤的输出）附在正文末尾。传输层拒绝为 Soft，认证失败为 Hard。

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::core::{Notification, RunContext, RunEffect, ToolError};
use crate::providers::{MailBackend, ProviderError};
use crate::tools::registry::{Tool, ToolOutput};
use crate::tools::require_str;

/// 通知工具：组装邮件并经邮件后端发送
pub struct NotifierTool {
    mail: Arc<dyn MailBackend>,
}

impl NotifierTool {
    pub const ID: &'static str = "email_tool";

    pub fn new(mail: Arc<dyn MailBackend>) -> Self {
        Self { mail }
    }
}

#[async_trait]
impl Tool for NotifierTool {
    fn name(&self) -> &str {
        Self::ID
    }

    fn description(&self) -> &str {
        "Send a confirmation email to a patient."
    }

    fn parameters_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "to": { "type": "string", "description": "Recipient email address" },
                "subject": { "type": "string", "description": "Email subject" },
                "body": { "type": "string", "description": "Email body content" },
                "event": { "type": "string", "description": "Booking reference from the scheduling step (optional)" }
            },
            "required": ["to", "subject", "body"]
        })
    }

    async fn execute(&self, _ctx: &RunContext, args: Value) -> Result<ToolOutput, ToolError> {
        let to = require_str(&args, "to")?.to_string();
        let subject = require_str(&args, "subject")?.to_string();
        let mut body = require_str(&args, "body")?.to_string();

        if let Some(event) = args.get("event").and_then(|v| v.as_str()) {
            body.push_str(&format!("\nBooking reference: {}", event));
        }

        let message_id = self
            .mail
            .send(&to, &subject, &body)
            .await
            .map_err(|e| match e {
                ProviderError::Auth(reason) => {
                    ToolError::hard(format!("mail service unavailable: {}", reason))
                }
                ProviderError::Rejected(reason) => {
                    ToolError::soft(format!("failed to send email: {}", reason))
                }
            })?;

        Ok(ToolOutput::with_effect(
            format!("Email sent to {}. Message ID: {}", to, message_id),
            RunEffect::NotificationSent(Notification {
                recipient: to,
                outcome: "sent".to_string(),
            }),
        ))
    }
}
