//! 运行状态的只读视图渲染
//!
//! 三个视图（工单 / 预约 / 通知），供控制台在每次计划执行后展示；
//! 不持有状态，不改动状态。

use crate::core::RunState;

/// 工单视图：患者、病情、紧急度、邮箱、时间戳
pub fn render_worklist(state: &RunState) -> String {
    if state.worklist().is_empty() {
        return "(no requests)".to_string();
    }
    let mut lines = vec!["Requests:".to_string()];
    for req in state.worklist() {
        lines.push(format!(
            "  {} | {} | {} | {} | {}",
            req.patient,
            req.condition,
            req.urgency,
            req.email,
            req.timestamp.format("%Y-%m-%dT%H:%M:%S")
        ));
    }
    lines.join("\n")
}

/// 预约视图：患者、病情、起始时间、事件标识
pub fn render_appointments(state: &RunState) -> String {
    if state.appointments().is_empty() {
        return "(no appointments)".to_string();
    }
    let mut lines = vec!["Appointments:".to_string()];
    for appt in state.appointments() {
        lines.push(format!(
            "  {} | {} | {} {} | {}",
            appt.patient,
            appt.condition,
            appt.start.format("%Y-%m-%dT%H:%M:%S"),
            appt.timezone,
            appt.event_id
        ));
    }
    lines.join("\n")
}

/// 通知视图：收件人与结果（含失败的尝试）
pub fn render_notifications(state: &RunState) -> String {
    if state.notifications().is_empty() {
        return "(no notifications)".to_string();
    }
    let mut lines = vec!["Notifications:".to_string()];
    for note in state.notifications() {
        lines.push(format!("  {} | {}", note.recipient, note.outcome));
    }
    lines.join("\n")
}
