//! 工具注册表
//!
//! 所有工具实现 Tool trait（name / description / parameters_schema / execute），
//! 由 ToolRegistry 按标识注册与查找。注册在启动期完成一次，执行期间只读；
//! 查找缺失由执行器按 Hard 失败上报，不静默忽略。

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::core::{RunContext, RunEffect, ToolError};

/// 工具执行的产出：文本结果 + 可选的状态变更申请
///
/// 工具自己不写 RunState；变更以 RunEffect 形式交给执行器在步骤成功后落账。
#[derive(Debug, Clone)]
pub struct ToolOutput {
    pub text: String,
    pub effect: Option<RunEffect>,
}

impl ToolOutput {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            effect: None,
        }
    }

    pub fn with_effect(text: impl Into<String>, effect: RunEffect) -> Self {
        Self {
            text: text.into(),
            effect: Some(effect),
        }
    }
}

/// 工具 trait：标识、描述、参数 schema、异步执行（args 为 JSON 命名参数）
#[async_trait]
pub trait Tool: Send + Sync {
    /// 工具标识（计划步骤中的 tool_id）
    fn name(&self) -> &str;

    /// 工具描述
    fn description(&self) -> &str;

    /// 参数 JSON Schema，缺省为空对象
    fn parameters_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {},
            "required": []
        })
    }

    /// 执行工具；失败必须带 Soft / Hard 分级
    async fn execute(&self, ctx: &RunContext, args: Value) -> Result<ToolOutput, ToolError>;
}

/// 工具注册表：按标识存储 Arc<dyn Tool>
#[derive(Default)]
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册工具；同一标识重复注册为幂等（首次生效），运行中不可换走能力
    pub fn register(&mut self, tool: impl Tool + 'static) {
        let name = tool.name().to_string();
        self.tools.entry(name).or_insert_with(|| Arc::new(tool));
    }

    /// O(1) 查找；缺失返回 None，由调用方决定如何上报
    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    pub fn tool_names(&self) -> Vec<String> {
        self.tools.keys().cloned().collect()
    }

    /// 返回 (name, description) 列表，用于控制台帮助输出
    pub fn tool_descriptions(&self) -> Vec<(String, String)> {
        self.tools
            .iter()
            .map(|(name, tool)| (name.clone(), tool.description().to_string()))
            .collect()
    }

    /// 生成已注册工具的 schema JSON（含参数 schema）
    pub fn to_schema_json(&self) -> String {
        let tools: Vec<Value> = self
            .tools
            .iter()
            .map(|(name, tool)| {
                serde_json::json!({
                    "name": name,
                    "description": tool.description(),
                    "parameters": tool.parameters_schema()
                })
            })
            .collect();
        serde_json::to_string_pretty(&tools).unwrap_or_else(|_| "[]".to_string())
    }
}
