//! 内存版后端实现
//!
//! 不出网：日历事件与邮件只记录在内存里并打日志，事件/消息标识用 UUID。
//! `unauthorized` 构造器模拟凭证缺失，使工具走 Hard 失败路径。

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use uuid::Uuid;

use crate::providers::{CalendarBackend, MailBackend, ProviderError};

/// 已创建的日历事件（内存记录）
#[derive(Debug, Clone)]
pub struct StoredEvent {
    pub event_id: String,
    pub summary: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub timezone: String,
}

/// 内存日历：事件存入 Vec，可配置为未授权状态
#[derive(Default)]
pub struct InMemoryCalendar {
    events: Mutex<Vec<StoredEvent>>,
    unauthorized: bool,
}

impl InMemoryCalendar {
    pub fn new() -> Self {
        Self::default()
    }

    /// 模拟 credentials 缺失：所有调用返回 Auth 错误
    pub fn unauthorized() -> Self {
        Self {
            events: Mutex::new(Vec::new()),
            unauthorized: true,
        }
    }

    pub fn events(&self) -> Vec<StoredEvent> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl CalendarBackend for InMemoryCalendar {
    async fn create_event(
        &self,
        summary: &str,
        description: &str,
        start: NaiveDateTime,
        end: NaiveDateTime,
        timezone: &str,
    ) -> Result<String, ProviderError> {
        if self.unauthorized {
            return Err(ProviderError::Auth(
                "calendar credentials missing; cannot authenticate".to_string(),
            ));
        }
        let event_id = Uuid::new_v4().simple().to_string();
        tracing::info!(event_id = %event_id, summary = %summary, "calendar event created");
        tracing::debug!(description = %description, "event detail");
        if let Ok(mut events) = self.events.lock() {
            events.push(StoredEvent {
                event_id: event_id.clone(),
                summary: summary.to_string(),
                start,
                end,
                timezone: timezone.to_string(),
            });
        }
        Ok(event_id)
    }
}

/// 已发送的邮件（内存记录）
#[derive(Debug, Clone)]
pub struct StoredMail {
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// 内存邮件后端：可配置未授权或拒收指定域名
#[derive(Default)]
pub struct InMemoryMailer {
    sent: Mutex<Vec<StoredMail>>,
    unauthorized: bool,
    rejected_domain: Option<String>,
}

impl InMemoryMailer {
    pub fn new() -> Self {
        Self::default()
    }

    /// 模拟 Gmail 凭证缺失
    pub fn unauthorized() -> Self {
        Self {
            unauthorized: true,
            ..Self::default()
        }
    }

    /// 拒收指定域名的收件人（模拟远端对单次发送的拒绝）
    pub fn rejecting_domain(domain: impl Into<String>) -> Self {
        Self {
            rejected_domain: Some(domain.into()),
            ..Self::default()
        }
    }

    pub fn sent(&self) -> Vec<StoredMail> {
        self.sent.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl MailBackend for InMemoryMailer {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<String, ProviderError> {
        if self.unauthorized {
            return Err(ProviderError::Auth(
                "mail credentials missing; cannot authenticate".to_string(),
            ));
        }
        if let Some(domain) = &self.rejected_domain {
            if to.ends_with(domain.as_str()) {
                return Err(ProviderError::Rejected(format!(
                    "recipient domain '{}' refused delivery",
                    domain
                )));
            }
        }
        let message_id = Uuid::new_v4().simple().to_string();
        tracing::info!(to = %to, message_id = %message_id, "mail sent");
        if let Ok(mut sent) = self.sent.lock() {
            sent.push(StoredMail {
                to: to.to_string(),
                subject: subject.to_string(),
                body: body.to_string(),
            });
        }
        Ok(message_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn slot() -> (NaiveDateTime, NaiveDateTime) {
        let date = NaiveDate::from_ymd_opt(2025, 4, 12).unwrap();
        (
            date.and_hms_opt(10, 0, 0).unwrap(),
            date.and_hms_opt(11, 0, 0).unwrap(),
        )
    }

    #[tokio::test]
    async fn test_calendar_records_event() {
        let calendar = InMemoryCalendar::new();
        let (start, end) = slot();
        let id = calendar
            .create_event("Appointment for Jane", "Condition: checkup", start, end, "UTC")
            .await
            .unwrap();
        let events = calendar.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event_id, id);
    }

    #[tokio::test]
    async fn test_unauthorized_calendar_fails_auth() {
        let calendar = InMemoryCalendar::unauthorized();
        let (start, end) = slot();
        let err = calendar
            .create_event("x", "y", start, end, "UTC")
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::Auth(_)));
    }

    #[tokio::test]
    async fn test_mailer_rejects_domain() {
        let mailer = InMemoryMailer::rejecting_domain("@bounce.example");
        let err = mailer
            .send("joe@bounce.example", "hi", "body")
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::Rejected(_)));
        assert!(mailer.sent().is_empty());
    }
}
