//! 计划构建器
//!
//! 两种生成模式：批量排程（按已排序工单为每人生成日程步骤，可选地在其后
//! 生成引用日程输出的通知步骤）与单动作簿记（add / rank / list 各一个步骤）。
//! add 缺必填字段在构建期即拒绝，不产出半个步骤；另有 notify_appointments
//! 为既有预约记录生成纯字面值的通知步骤（对应控制台的 send email 命令）。

use std::collections::HashSet;

use chrono::{Duration, NaiveDate};
use serde_json::Value;

use crate::core::{urgency_score, Appointment, PlanError, Request};
use crate::intent::BookkeepingAction;
use crate::plan::types::{Plan, Step, StepArg};
use crate::tools::{NotifierTool, RequestBookkeepingTool, SchedulerTool};

/// 计划构建器：持有通知文案配置
pub struct PlanBuilder {
    subject: String,
    signature: String,
}

impl PlanBuilder {
    pub fn new(subject: impl Into<String>, signature: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            signature: signature.into(),
        }
    }

    /// 批量排程模式
    ///
    /// 每条工单一个日程步骤，日期从 today 按紧急度偏移：urgent 当天、
    /// moderate +1 天、其余（含未识别级别）+3 天。with_notifications 时在全部
    /// 日程步骤之后为每条工单追加一个通知步骤，其 event 输入引用对应日程
    /// 步骤的输出。空工单得到空计划。
    pub fn bulk_schedule(
        &self,
        ranked: &[Request],
        today: NaiveDate,
        with_notifications: bool,
    ) -> Result<Plan, PlanError> {
        let mut steps = Vec::new();
        let mut taken: HashSet<String> = HashSet::new();
        let mut schedule_outputs = Vec::with_capacity(ranked.len());

        for req in ranked {
            let date = (today + Duration::days(offset_days(&req.urgency)))
                .format("%Y-%m-%d")
                .to_string();
            let output = unique_name(&mut taken, &format!("$appointment_{}", req.patient));
            steps.push(Step {
                task: format!("Schedule appointment for {}", req.patient),
                tool_id: SchedulerTool::ID.to_string(),
                inputs: vec![
                    ("date".to_string(), StepArg::literal(date.clone())),
                    ("patient".to_string(), StepArg::literal(req.patient.clone())),
                    (
                        "condition".to_string(),
                        StepArg::literal(req.condition.clone()),
                    ),
                ],
                output: output.clone(),
                description: format!("Assign the fixed slot on {} to {}", date, req.patient),
            });
            schedule_outputs.push((output, date));
        }

        if with_notifications {
            for (req, (schedule_output, date)) in ranked.iter().zip(&schedule_outputs) {
                let output = unique_name(&mut taken, &format!("$email_{}", req.email));
                steps.push(Step {
                    task: format!("Send email to {}", req.email),
                    tool_id: NotifierTool::ID.to_string(),
                    inputs: vec![
                        ("to".to_string(), StepArg::literal(req.email.clone())),
                        ("subject".to_string(), StepArg::literal(self.subject.clone())),
                        (
                            "body".to_string(),
                            StepArg::literal(self.body(
                                &req.patient,
                                &req.condition,
                                &format!("{}T10:00:00", date),
                            )),
                        ),
                        ("event".to_string(), StepArg::reference(schedule_output)),
                    ],
                    output,
                    description: format!("Send confirmation email to {}", req.email),
                });
            }
        }

        Plan::build(steps)
    }

    /// 单动作簿记模式：恰好一个 request_manager 步骤
    pub fn single_action(&self, action: &BookkeepingAction) -> Result<Plan, PlanError> {
        let step = match action {
            BookkeepingAction::Add {
                patient,
                condition,
                urgency,
                email,
            } => {
                let patient = required("add", "patient", patient)?;
                let condition = required("add", "condition", condition)?;
                let urgency = required("add", "urgency", urgency)?;
                let email = required("add", "email", email)?;
                Step {
                    task: format!("Add patient request for {}", patient),
                    tool_id: RequestBookkeepingTool::ID.to_string(),
                    inputs: vec![
                        ("action".to_string(), StepArg::literal("add")),
                        ("patient".to_string(), StepArg::literal(patient)),
                        ("condition".to_string(), StepArg::literal(condition)),
                        ("urgency".to_string(), StepArg::literal(urgency)),
                        ("email".to_string(), StepArg::literal(email)),
                    ],
                    output: "$request_added".to_string(),
                    description: "Add a new patient request".to_string(),
                }
            }
            BookkeepingAction::Rank => bookkeeping_step("rank", "$prioritized"),
            BookkeepingAction::List => bookkeeping_step("list", "$requests"),
        };
        Plan::build(vec![step])
    }

    /// 为既有预约记录生成通知步骤（纯字面值输入）
    pub fn notify_appointments(&self, appointments: &[Appointment]) -> Result<Plan, PlanError> {
        let mut taken: HashSet<String> = HashSet::new();
        let steps = appointments
            .iter()
            .map(|appt| Step {
                task: format!("Send email to {}", appt.email),
                tool_id: NotifierTool::ID.to_string(),
                inputs: vec![
                    ("to".to_string(), StepArg::literal(appt.email.clone())),
                    ("subject".to_string(), StepArg::literal(self.subject.clone())),
                    (
                        "body".to_string(),
                        StepArg::literal(self.body(
                            &appt.patient,
                            &appt.condition,
                            &appt.start.format("%Y-%m-%dT%H:%M:%S").to_string(),
                        )),
                    ),
                    ("event".to_string(), StepArg::literal(appt.event_id.clone())),
                ],
                output: unique_name(&mut taken, &format!("$email_{}", appt.email)),
                description: format!("Send confirmation email to {}", appt.email),
            })
            .collect();
        Plan::build(steps)
    }

    /// 固定确认函模板
    fn body(&self, patient: &str, condition: &str, start: &str) -> Value {
        Value::String(format!(
            "Dear {},\nYour appointment is scheduled for {}.\nReason: {}\nBest regards,\n{}",
            patient, start, condition, self.signature
        ))
    }
}

/// 紧急度 -> 日期偏移（天）；未识别级别随 routine 档（与计分的 fail-open 一致）
fn offset_days(urgency: &str) -> i64 {
    match urgency_score(urgency) {
        3 => 0,
        2 => 1,
        _ => 3,
    }
}

fn bookkeeping_step(action: &str, output: &str) -> Step {
    Step {
        task: format!("{} patient requests", capitalize(action)),
        tool_id: RequestBookkeepingTool::ID.to_string(),
        inputs: vec![("action".to_string(), StepArg::literal(action))],
        output: output.to_string(),
        description: format!("{} the request worklist", capitalize(action)),
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

fn required(action: &str, field: &str, value: &Option<String>) -> Result<String, PlanError> {
    value
        .as_deref()
        .filter(|v| !v.trim().is_empty())
        .map(|v| v.to_string())
        .ok_or_else(|| PlanError::MissingField {
            action: action.to_string(),
            field: field.to_string(),
        })
}

/// 输出名冲突时追加序号，保证计划内唯一
fn unique_name(taken: &mut HashSet<String>, base: &str) -> String {
    if taken.insert(base.to_string()) {
        return base.to_string();
    }
    let mut i = 2;
    loop {
        let candidate = format!("{}_{}", base, i);
        if taken.insert(candidate.clone()) {
            return candidate;
        }
        i += 1;
    }
}
