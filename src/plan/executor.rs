//! 计划执行器
//!
//! 按序走每个步骤：解析输入引用 -> 查注册表 -> 调用工具 -> 绑定输出并落账。
//! 失败策略：未解析引用与 Soft 失败记录后继续；注册表缺失与 Hard 失败中止
//! 剩余步骤（标记 NotRun）。每个计划步骤恰好产出一条结局记录；每次工具调用
//! 输出结构化审计日志（JSON）。

use std::collections::HashMap;
use std::time::Instant;

use serde_json::Value;
use uuid::Uuid;

use crate::core::{Notification, RunContext, RunEffect, RunState, ToolError};
use crate::plan::types::{ExecutionReport, Plan, StepArg, StepOutcome, StepStatus};
use crate::tools::{NotifierTool, ToolRegistry};

/// 计划执行器：持有只读注册表与运行标识
pub struct PlanExecutor {
    registry: ToolRegistry,
    run_id: String,
}

impl PlanExecutor {
    pub fn new(registry: ToolRegistry) -> Self {
        Self {
            registry,
            run_id: Uuid::new_v4().to_string(),
        }
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// 执行计划；RunState 只在步骤结束后变更，工具调用期间不持有任何锁
    pub async fn execute(&self, plan: &Plan, state: &mut RunState) -> ExecutionReport {
        let mut bindings: HashMap<String, String> = HashMap::new();
        let mut outcomes: Vec<StepOutcome> = Vec::with_capacity(plan.len());
        let mut halted_from: Option<usize> = None;

        for (idx, step) in plan.steps().iter().enumerate() {
            // 1. 解析输入：字面值原样，引用查绑定表；缺失即本步 Soft 失败
            let mut resolved = serde_json::Map::new();
            let mut unresolved: Option<&str> = None;
            for (name, arg) in &step.inputs {
                match arg {
                    StepArg::Literal(value) => {
                        resolved.insert(name.clone(), value.clone());
                    }
                    StepArg::Ref(reference) => match bindings.get(reference) {
                        Some(text) => {
                            resolved.insert(name.clone(), Value::String(text.clone()));
                        }
                        None => {
                            unresolved = Some(reference);
                            break;
                        }
                    },
                }
            }
            if let Some(reference) = unresolved {
                let reason = format!("unresolved reference '{}'", reference);
                self.audit(&step.tool_id, &step.task, "unresolved", 0, None);
                outcomes.push(outcome(step, StepStatus::SoftFailure, reason));
                continue;
            }

            // 2. 查工具：缺失是依赖级故障，中止整个计划
            let Some(tool) = self.registry.get(&step.tool_id) else {
                let reason = format!("unknown tool: {}", step.tool_id);
                self.audit(&step.tool_id, &step.task, "missing-tool", 0, None);
                outcomes.push(outcome(step, StepStatus::HardFailure, reason));
                halted_from = Some(idx + 1);
                break;
            };

            // 3. 调用工具；上下文带工单只读快照
            let args = Value::Object(resolved);
            let ctx = RunContext::new(self.run_id.clone(), state.worklist().to_vec());
            let started = Instant::now();
            let result = tool.execute(&ctx, args.clone()).await;
            let duration_ms = started.elapsed().as_millis() as u64;

            match result {
                Ok(output) => {
                    self.audit(&step.tool_id, &step.task, "ok", duration_ms, Some(&args));
                    bindings.insert(step.output.clone(), output.text.clone());
                    if let Some(effect) = output.effect {
                        state.apply(effect);
                    }
                    outcomes.push(outcome(step, StepStatus::Success, output.text));
                }
                Err(ToolError::Soft(reason)) => {
                    self.audit(&step.tool_id, &step.task, "soft", duration_ms, Some(&args));
                    // 通知步骤走到了传输层：这次尝试也要留下记录
                    if step.tool_id == NotifierTool::ID {
                        if let Some(to) = args.get("to").and_then(|v| v.as_str()) {
                            state.apply(RunEffect::NotificationSent(Notification {
                                recipient: to.to_string(),
                                outcome: format!("failed: {}", reason),
                            }));
                        }
                    }
                    outcomes.push(outcome(step, StepStatus::SoftFailure, reason));
                }
                Err(ToolError::Hard(reason)) => {
                    self.audit(&step.tool_id, &step.task, "hard", duration_ms, Some(&args));
                    outcomes.push(outcome(step, StepStatus::HardFailure, reason));
                    halted_from = Some(idx + 1);
                    break;
                }
            }
        }

        // 4. Hard 中止后，剩余步骤一律记为 NotRun，保证逐步审计完整
        if let Some(from) = halted_from {
            for step in &plan.steps()[from..] {
                outcomes.push(outcome(
                    step,
                    StepStatus::NotRun,
                    "aborted: earlier hard failure".to_string(),
                ));
            }
        }

        ExecutionReport { outcomes }
    }

    fn audit(&self, tool: &str, task: &str, outcome: &str, duration_ms: u64, args: Option<&Value>) {
        let audit = serde_json::json!({
            "event": "step_audit",
            "run_id": self.run_id,
            "tool": tool,
            "task": task,
            "outcome": outcome,
            "duration_ms": duration_ms,
            "args_preview": args.map(args_preview),
        });
        tracing::info!(audit = %audit.to_string(), "step");
    }
}

fn outcome(step: &crate::plan::types::Step, status: StepStatus, detail: String) -> StepOutcome {
    StepOutcome {
        task: step.task.clone(),
        tool_id: step.tool_id.clone(),
        status,
        detail,
    }
}

fn args_preview(args: &Value) -> String {
    let s = args.to_string();
    if s.len() > 200 {
        format!("{}...", s.chars().take(200).collect::<String>())
    } else {
        s
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{RunContext, ToolError};
    use crate::plan::types::Step;
    use crate::tools::{Tool, ToolOutput};
    use async_trait::async_trait;

    /// 固定行为的测试工具
    struct FixedTool {
        name: &'static str,
        behavior: Behavior,
    }

    enum Behavior {
        /// 回显 "msg" 输入（缺省 "ok"），并申请一条通知记录
        EchoWithEffect,
        Soft(&'static str),
        Hard(&'static str),
    }

    #[async_trait]
    impl Tool for FixedTool {
        fn name(&self) -> &str {
            self.name
        }

        fn description(&self) -> &str {
            "fixed behavior (test)"
        }

        async fn execute(&self, _ctx: &RunContext, args: Value) -> Result<ToolOutput, ToolError> {
            match &self.behavior {
                Behavior::EchoWithEffect => {
                    let msg = args
                        .get("msg")
                        .and_then(|v| v.as_str())
                        .unwrap_or("ok")
                        .to_string();
                    Ok(ToolOutput::with_effect(
                        msg.clone(),
                        RunEffect::NotificationSent(Notification {
                            recipient: self.name.to_string(),
                            outcome: msg,
                        }),
                    ))
                }
                Behavior::Soft(reason) => Err(ToolError::soft(*reason)),
                Behavior::Hard(reason) => Err(ToolError::hard(*reason)),
            }
        }
    }

    fn registry() -> ToolRegistry {
        let mut registry = ToolRegistry::new();
        registry.register(FixedTool { name: "echo", behavior: Behavior::EchoWithEffect });
        registry.register(FixedTool { name: "flaky", behavior: Behavior::Soft("rejected this one") });
        registry.register(FixedTool { name: "broken", behavior: Behavior::Hard("credentials gone") });
        registry
    }

    fn step(task: &str, tool_id: &str, inputs: Vec<(String, StepArg)>, output: &str) -> Step {
        Step {
            task: task.to_string(),
            tool_id: tool_id.to_string(),
            inputs,
            output: output.to_string(),
            description: String::new(),
        }
    }

    #[tokio::test]
    async fn test_empty_plan_trivially_succeeds() {
        let executor = PlanExecutor::new(registry());
        let mut state = RunState::new();
        let report = executor.execute(&Plan::empty(), &mut state).await;
        assert!(report.outcomes.is_empty());
        assert!(state.worklist().is_empty());
        assert!(state.appointments().is_empty());
        assert!(state.notifications().is_empty());
    }

    #[tokio::test]
    async fn test_output_propagates_to_later_step() {
        let plan = Plan::build(vec![
            step(
                "first",
                "echo",
                vec![("msg".into(), StepArg::literal("hello"))],
                "$a",
            ),
            step(
                "second",
                "echo",
                vec![("msg".into(), StepArg::reference("$a"))],
                "$b",
            ),
        ])
        .unwrap();
        let executor = PlanExecutor::new(registry());
        let mut state = RunState::new();
        let report = executor.execute(&plan, &mut state).await;
        assert!(report.all_succeeded());
        assert_eq!(report.outcomes[1].detail, "hello");
    }

    #[tokio::test]
    async fn test_soft_failure_continues_and_skips_dependents() {
        let plan = Plan::build(vec![
            step("fails", "flaky", vec![], "$a"),
            step(
                "depends on fails",
                "echo",
                vec![("msg".into(), StepArg::reference("$a"))],
                "$b",
            ),
            step("independent", "echo", vec![], "$c"),
        ])
        .unwrap();
        let executor = PlanExecutor::new(registry());
        let mut state = RunState::new();
        let report = executor.execute(&plan, &mut state).await;

        assert_eq!(report.outcomes.len(), 3);
        assert_eq!(report.outcomes[0].status, StepStatus::SoftFailure);
        // 依赖失败步骤的输出 -> 本步也是 Soft（未解析引用），不崩溃
        assert_eq!(report.outcomes[1].status, StepStatus::SoftFailure);
        assert!(report.outcomes[1].detail.contains("unresolved reference"));
        // 无依赖的后续步骤照常执行
        assert_eq!(report.outcomes[2].status, StepStatus::Success);
        assert!(!report.halted());
    }

    #[tokio::test]
    async fn test_hard_failure_halts_remaining_steps() {
        let plan = Plan::build(vec![
            step("first", "echo", vec![], "$a"),
            step("breaks", "broken", vec![], "$b"),
            step("never runs", "echo", vec![], "$c"),
        ])
        .unwrap();
        let executor = PlanExecutor::new(registry());
        let mut state = RunState::new();
        let report = executor.execute(&plan, &mut state).await;

        assert!(report.halted());
        assert_eq!(report.outcomes.len(), 3);
        assert_eq!(report.outcomes[1].status, StepStatus::HardFailure);
        assert_eq!(report.outcomes[2].status, StepStatus::NotRun);
        // 未执行步骤不得留下任何状态变更
        assert_eq!(state.notifications().len(), 1);
        assert_eq!(state.notifications()[0].recipient, "echo");
    }

    #[tokio::test]
    async fn test_unknown_tool_is_hard_and_aborts() {
        let plan = Plan::build(vec![
            step("missing", "no_such_tool", vec![], "$a"),
            step("after", "echo", vec![], "$b"),
        ])
        .unwrap();
        let executor = PlanExecutor::new(registry());
        let mut state = RunState::new();
        let report = executor.execute(&plan, &mut state).await;

        assert_eq!(report.outcomes[0].status, StepStatus::HardFailure);
        assert!(report.outcomes[0].detail.contains("unknown tool"));
        assert_eq!(report.outcomes[1].status, StepStatus::NotRun);
    }

    #[tokio::test]
    async fn test_successful_effect_lands_in_state() {
        let plan = Plan::build(vec![step(
            "one",
            "echo",
            vec![("msg".into(), StepArg::literal("delivered"))],
            "$a",
        )])
        .unwrap();
        let executor = PlanExecutor::new(registry());
        let mut state = RunState::new();
        executor.execute(&plan, &mut state).await;
        assert_eq!(state.notifications().len(), 1);
        assert_eq!(state.notifications()[0].outcome, "delivered");
    }
}
