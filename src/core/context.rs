//! 运行上下文：传给工具的只读环境
//!
//! 携带运行标识与工单快照；对计划机制不透明，工具按需读取。

use uuid::Uuid;

use crate::core::state::Request;

/// 每次工具调用可见的运行上下文
#[derive(Debug, Clone)]
pub struct RunContext {
    pub run_id: String,
    /// 执行器在每步调用前采集的工单只读快照
    pub worklist: Vec<Request>,
}

impl RunContext {
    pub fn new(run_id: impl Into<String>, worklist: Vec<Request>) -> Self {
        Self {
            run_id: run_id.into(),
            worklist,
        }
    }

    /// 生成带新运行标识的空上下文（测试与单发调用用）
    pub fn fresh() -> Self {
        Self {
            run_id: Uuid::new_v4().to_string(),
            worklist: Vec::new(),
        }
    }

    /// 按姓名查找患者联系邮箱；找不到时退到占位地址（与原行为一致）
    pub fn email_for(&self, patient: &str) -> String {
        self.worklist
            .iter()
            .find(|r| r.patient == patient)
            .map(|r| r.email.clone())
            .unwrap_or_else(|| "unknown@example.com".to_string())
    }
}
