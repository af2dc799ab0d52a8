//! Triage - 诊所预约编排引擎
//!
//! 模块划分：
//! - **config**: 应用配置加载（TOML + 环境变量）
//! - **core**: 错误分级、运行状态、优先级排序、运行上下文
//! - **intent**: 自由文本命令 -> 结构化意图（规则匹配，外部协作者边界）
//! - **plan**: 计划类型、构建器、执行器
//! - **providers**: 日历 / 邮件后端边界与内存实现
//! - **report**: 运行状态三视图的只读渲染
//! - **tools**: 工具箱（日程、通知、工单簿记）与注册表

pub mod config;
pub mod core;
pub mod intent;
pub mod plan;
pub mod providers;
pub mod report;
pub mod tools;
