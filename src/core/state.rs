//! 运行状态：工单、预约与通知记录
//!
//! RunState 由调用方持有、仅由 PlanExecutor 通过 `apply` 写入（单写者纪律）；
//! 三个列表均为追加式，记录一旦写入不再修改。工具通过 RunEffect 申请变更，
//! 执行器在步骤成功结束后统一落账。

use chrono::{DateTime, NaiveDateTime, Utc};

/// 一条预约请求（工单条目）
///
/// urgency 保留自由文本：未识别的级别按 routine 计分（fail-open，见 ranker）。
/// score 为派生数据，由优先级排序计算后回填。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub patient: String,
    pub condition: String,
    pub urgency: String,
    pub email: String,
    pub timestamp: DateTime<Utc>,
    pub score: u8,
}

impl Request {
    pub fn new(
        patient: impl Into<String>,
        condition: impl Into<String>,
        urgency: impl Into<String>,
        email: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            patient: patient.into(),
            condition: condition.into(),
            urgency: urgency.into(),
            email: email.into(),
            timestamp,
            score: 0,
        }
    }
}

/// 一条已落定的预约（固定 10:00–11:00 时段）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Appointment {
    pub patient: String,
    pub condition: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub timezone: String,
    pub event_id: String,
    pub email: String,
}

/// 一次通知发送的结果（每次尝试一条，含失败）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub recipient: String,
    pub outcome: String,
}

/// 工具申请的状态变更：封闭集合，由执行器穷尽处理
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunEffect {
    AppointmentBooked(Appointment),
    NotificationSent(Notification),
    RequestAdded(Request),
}

/// 进程生命周期内的运行状态累加器
#[derive(Debug, Clone, Default)]
pub struct RunState {
    worklist: Vec<Request>,
    appointments: Vec<Appointment>,
    notifications: Vec<Notification>,
}

impl RunState {
    pub fn new() -> Self {
        Self::default()
    }

    /// 外部接入边界：向工单追加一条请求（种子数据或 API 注入）
    pub fn push_request(&mut self, request: Request) {
        self.worklist.push(request);
    }

    /// 应用一条步骤成功后的变更；唯一的写入口
    pub fn apply(&mut self, effect: RunEffect) {
        match effect {
            RunEffect::AppointmentBooked(appt) => self.appointments.push(appt),
            RunEffect::NotificationSent(note) => self.notifications.push(note),
            RunEffect::RequestAdded(req) => self.worklist.push(req),
        }
    }

    pub fn worklist(&self) -> &[Request] {
        &self.worklist
    }

    pub fn appointments(&self) -> &[Appointment] {
        &self.appointments
    }

    pub fn notifications(&self) -> &[Notification] {
        &self.notifications
    }
}
