//! 意图解析：自由文本命令 -> 结构化意图
//!
//! 编排核心不理解自然语言；这里是被建模的外部协作者：纯函数
//! `parse(text) -> Intent | ParseError`，规则匹配，不调用任何模型。
//! add 命令的逗号格式沿用原格式：
//! `book appointment for [name], [condition], [urgency], email [addr]`。

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 单动作簿记操作（喂给 PlanBuilder 的单动作模式）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookkeepingAction {
    /// 字段缺失时保留 None，由 PlanBuilder 在构建期拒绝
    Add {
        patient: Option<String>,
        condition: Option<String>,
        urgency: Option<String>,
        email: Option<String>,
    },
    Rank,
    List,
}

/// 识别出的意图
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    /// 工单簿记（add / rank / list）
    Bookkeeping(BookkeepingAction),
    /// 为整个工单批量排程；notify 时附带确认邮件步骤
    ScheduleAll { notify: bool },
    /// 为既有预约补发确认邮件
    NotifyAll,
    /// 无法识别（上层自行提示，不走 LLM 兜底）
    Unclear,
}

/// 解析失败：格式不符
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error(
        "Please provide details like: book appointment for [name] with [condition], [urgency], email [email]"
    )]
    MalformedAdd,
}

/// 规则匹配：大小写不敏感，命令动词优先级与原版一致
pub fn parse(text: &str) -> Result<Intent, ParseError> {
    let lower = text.to_lowercase();

    if lower.contains("add request") || lower.contains("book appointment") {
        return parse_add(text).map(Intent::Bookkeeping);
    }

    if lower.contains("prioritize") || lower.contains("rank") {
        return Ok(Intent::Bookkeeping(BookkeepingAction::Rank));
    }

    if lower.contains("list") {
        return Ok(Intent::Bookkeeping(BookkeepingAction::List));
    }

    if lower.contains("schedule") {
        return Ok(Intent::ScheduleAll {
            notify: lower.contains("notify"),
        });
    }

    if lower.contains("send email") || lower.contains("send emails") {
        return Ok(Intent::NotifyAll);
    }

    Ok(Intent::Unclear)
}

/// 解析逗号分隔的 add 命令；患者名缺失即判格式错误，其余字段缺失交由
/// PlanBuilder 的构建期校验拒绝
fn parse_add(text: &str) -> Result<BookkeepingAction, ParseError> {
    let parts: Vec<&str> = text.split(',').collect();

    let head = parts[0];
    let patient = head
        .to_lowercase()
        .rfind(" for ")
        .and_then(|idx| head.get(idx + 5..))
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .ok_or(ParseError::MalformedAdd)?;

    let condition = parts
        .get(1)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty());
    let urgency = parts
        .get(2)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty());
    let email = parts.get(3).and_then(|s| {
        let trimmed = s.trim();
        let lower = trimmed.to_lowercase();
        let addr = lower
            .find("email")
            .and_then(|idx| trimmed.get(idx + 5..))
            .map(|rest| rest.trim())
            .unwrap_or(trimmed);
        if addr.is_empty() {
            None
        } else {
            Some(addr.to_string())
        }
    });

    Ok(BookkeepingAction::Add {
        patient: Some(patient),
        condition,
        urgency,
        email,
    })
}
