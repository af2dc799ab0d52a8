//! 外部服务边界：日历与邮件后端
//!
//! 真正的日历/邮件客户端（及其凭证生命周期）不属于编排核心，这里只定义
//! 工具消费的 trait 与错误分类：Auth -> 工具层转 Hard，Rejected -> 转 Soft。

pub mod memory;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use thiserror::Error;

pub use memory::{InMemoryCalendar, InMemoryMailer};

/// 后端调用失败的分类（供工具映射为 Soft / Hard）
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    /// 凭证缺失或认证失败：本次运行内该依赖不可用
    #[error("authentication failed: {0}")]
    Auth(String),

    /// 远端拒绝了这一次操作（配额、格式、临时故障）
    #[error("request rejected: {0}")]
    Rejected(String),
}

/// 日历后端：创建一个事件并返回外部事件标识
#[async_trait]
pub trait CalendarBackend: Send + Sync {
    async fn create_event(
        &self,
        summary: &str,
        description: &str,
        start: NaiveDateTime,
        end: NaiveDateTime,
        timezone: &str,
    ) -> Result<String, ProviderError>;
}

/// 邮件后端：发送一封邮件并返回消息标识
#[async_trait]
pub trait MailBackend: Send + Sync {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<String, ProviderError>;
}
