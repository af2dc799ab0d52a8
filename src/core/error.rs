//! 错误类型：工具失败分级与计划构建错误
//!
//! 工具错误只分两级：Soft（本次请求有问题，跳过该步继续）与 Hard（依赖不可用，
//! 中止剩余计划）。未归类的异常一律按 Hard 处理，避免在状态不明时继续执行。

use thiserror::Error;

/// 工具执行错误，按影响范围分级
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ToolError {
    /// 步骤级错误：参数校验失败或远端拒绝了这一次操作
    #[error("soft failure: {0}")]
    Soft(String),

    /// 计划级错误：底层依赖（凭证、注册表）在本次运行中不可用
    #[error("hard failure: {0}")]
    Hard(String),
}

impl ToolError {
    pub fn soft(reason: impl Into<String>) -> Self {
        Self::Soft(reason.into())
    }

    pub fn hard(reason: impl Into<String>) -> Self {
        Self::Hard(reason.into())
    }

    /// 是否为 Hard（中止剩余计划）
    pub fn is_hard(&self) -> bool {
        matches!(self, Self::Hard(_))
    }

    pub fn reason(&self) -> &str {
        match self {
            Self::Soft(r) | Self::Hard(r) => r,
        }
    }
}

/// 计划构建期错误：缺字段、引用错误等，拒绝生成计划而不是生成半个步骤
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlanError {
    #[error("missing required field '{field}' for action '{action}'")]
    MissingField { action: String, field: String },

    /// 输入引用了尚未产生（或永远不会产生）的输出
    #[error("step '{step}' references unknown output '{reference}'")]
    UnknownReference { step: String, reference: String },

    #[error("duplicate output name '{0}'")]
    DuplicateOutput(String),
}
