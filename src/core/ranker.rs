//! 工单优先级排序
//!
//! 纯函数：不修改调用方数据，返回按（紧急度分值降序、时间戳降序）排列的新序列。
//! 分值映射固定：urgent=3、moderate=2、routine=1，未识别级别按 routine 计（fail-open）。

use crate::core::state::Request;

/// routine 档分值，也是未识别紧急度的缺省分值
pub const ROUTINE_SCORE: u8 = 1;

/// 紧急度 -> 分值；未识别的级别不拒绝，按 routine 计分
pub fn urgency_score(urgency: &str) -> u8 {
    match urgency {
        "urgent" => 3,
        "moderate" => 2,
        "routine" => 1,
        _ => ROUTINE_SCORE,
    }
}

/// 排序工单：分值高者在前，同分值时间戳新者在前
///
/// 输入只读；输出为重新计分后的副本。稳定排序，重复调用结果一致。
pub fn prioritize(requests: &[Request]) -> Vec<Request> {
    let mut ranked: Vec<Request> = requests
        .iter()
        .cloned()
        .map(|mut req| {
            req.score = urgency_score(&req.urgency);
            req
        })
        .collect();
    ranked.sort_by(|a, b| (b.score, b.timestamp).cmp(&(a.score, a.timestamp)));
    ranked
}
