//! 计划类型定义
//!
//! Step 的每个输入要么是字面值，要么引用更早步骤的输出名；Plan 在构建期校验
//! 引用只向后看（无前向引用、无自引用、输出名不重复），不合法的计划不会进入执行。

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;

use crate::core::PlanError;

/// 步骤输入：字面值或对更早步骤输出的引用
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum StepArg {
    Literal(Value),
    Ref(String),
}

impl StepArg {
    pub fn literal(value: impl Into<Value>) -> Self {
        Self::Literal(value.into())
    }

    pub fn reference(name: impl Into<String>) -> Self {
        Self::Ref(name.into())
    }
}

/// 一个计划步骤：绑定一个工具、一组命名输入、一个声明的输出名
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Step {
    /// 任务标签（人类可读，用于结果行）
    pub task: String,
    /// 绑定的工具标识
    pub tool_id: String,
    /// 命名输入，保持声明顺序
    pub inputs: Vec<(String, StepArg)>,
    /// 输出名（`$` 前缀约定），供后续步骤引用
    pub output: String,
    pub description: String,
}

/// 有序步骤序列；仅能通过 `Plan::build` 获得已校验的实例
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Plan {
    steps: Vec<Step>,
}

impl Plan {
    /// 空计划（空工单的批量模式产物）；执行器对其平凡成功
    pub fn empty() -> Self {
        Self::default()
    }

    /// 校验并构建计划：引用只允许指向严格更早的步骤的输出
    pub fn build(steps: Vec<Step>) -> Result<Self, PlanError> {
        let mut produced: HashSet<&str> = HashSet::new();
        for step in &steps {
            for (_, arg) in &step.inputs {
                if let StepArg::Ref(name) = arg {
                    if !produced.contains(name.as_str()) {
                        return Err(PlanError::UnknownReference {
                            step: step.task.clone(),
                            reference: name.clone(),
                        });
                    }
                }
            }
            if !produced.insert(step.output.as_str()) {
                return Err(PlanError::DuplicateOutput(step.output.clone()));
            }
        }
        Ok(Self { steps })
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }
}

/// 单步执行结局
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StepStatus {
    /// 成功，输出已绑定
    Success,
    /// 步骤级失败，已记录并继续
    SoftFailure,
    /// 计划级失败，中止剩余步骤
    HardFailure,
    /// 因更早的 Hard 失败未执行
    NotRun,
}

/// 一步的结果记录：每个计划步骤恰有一条（含被跳过/未执行的）
#[derive(Debug, Clone, Serialize)]
pub struct StepOutcome {
    pub task: String,
    pub tool_id: String,
    pub status: StepStatus,
    /// 成功文本或失败原因
    pub detail: String,
}

/// 计划执行结果：有序的逐步结局，调用方不得假设全部成功
#[derive(Debug, Clone, Default)]
pub struct ExecutionReport {
    pub outcomes: Vec<StepOutcome>,
}

impl ExecutionReport {
    /// 是否因 Hard 失败提前中止
    pub fn halted(&self) -> bool {
        self.outcomes
            .iter()
            .any(|o| o.status == StepStatus::HardFailure)
    }

    pub fn all_succeeded(&self) -> bool {
        self.outcomes.iter().all(|o| o.status == StepStatus::Success)
    }

    /// 渲染为逐行审计文本（每步一行）
    pub fn render_lines(&self) -> Vec<String> {
        self.outcomes
            .iter()
            .map(|o| match o.status {
                StepStatus::Success => format!("[ok] {}: {}", o.task, o.detail),
                StepStatus::SoftFailure => format!("[soft-fail] {}: {}", o.task, o.detail),
                StepStatus::HardFailure => format!("[hard-fail] {}: {}", o.task, o.detail),
                StepStatus::NotRun => format!("[not-run] {}: {}", o.task, o.detail),
            })
            .collect()
    }
}
