//! 应用配置：从 config/default.toml 与环境变量加载
//!
//! 加载顺序：先读 TOML 文件，再用环境变量 `TRIAGE__*` 覆盖
//! （双下划线表示嵌套，如 `TRIAGE__SCHEDULER__TIMEZONE=UTC`）。

use std::path::PathBuf;

use serde::Deserialize;

/// 应用配置根（对应 config/default.toml 的顶层）
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    #[serde(default)]
    pub app: AppSection,
    #[serde(default)]
    pub scheduler: SchedulerSection,
    #[serde(default)]
    pub notifier: NotifierSection,
    #[serde(default)]
    pub seed: SeedSection,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            app: AppSection::default(),
            scheduler: SchedulerSection::default(),
            notifier: NotifierSection::default(),
            seed: SeedSection::default(),
        }
    }
}

/// [app] 段：应用名
#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppSection {
    pub name: Option<String>,
}

/// [scheduler] 段：预约时段所在时区
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SchedulerSection {
    #[serde(default = "default_timezone")]
    pub timezone: String,
}

impl Default for SchedulerSection {
    fn default() -> Self {
        Self {
            timezone: default_timezone(),
        }
    }
}

fn default_timezone() -> String {
    "UTC".to_string()
}

/// [notifier] 段：确认邮件的主题与署名
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NotifierSection {
    #[serde(default = "default_subject")]
    pub subject: String,
    #[serde(default = "default_signature")]
    pub signature: String,
}

impl Default for NotifierSection {
    fn default() -> Self {
        Self {
            subject: default_subject(),
            signature: default_signature(),
        }
    }
}

fn default_subject() -> String {
    "Appointment Confirmation".to_string()
}

fn default_signature() -> String {
    "Your Clinic".to_string()
}

/// [seed] 段：是否载入演示工单
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SeedSection {
    #[serde(default = "default_demo_worklist")]
    pub demo_worklist: bool,
}

impl Default for SeedSection {
    fn default() -> Self {
        Self {
            demo_worklist: default_demo_worklist(),
        }
    }
}

fn default_demo_worklist() -> bool {
    true
}

/// 从 config 目录加载配置，环境变量 TRIAGE__* 可覆盖
///
/// 1. 按顺序查找 config/default.toml、../config/default.toml、default.toml，找到则作为第一源
/// 2. 若传入 config_path 且文件存在，则追加该文件（可覆盖前面的键）
/// 3. 最后叠加环境变量 TRIAGE__*（双下划线表示嵌套键）
pub fn load_config(config_path: Option<PathBuf>) -> Result<AppConfig, config::ConfigError> {
    let mut builder = config::Config::builder();

    let default_names = ["config/default", "../config/default", "default"];
    for name in default_names {
        let path = format!("{}.toml", name);
        if std::path::Path::new(&path).exists() {
            builder = builder.add_source(config::File::with_name(name).required(false));
            break;
        }
    }

    if let Some(ref path) = config_path {
        if path.exists() {
            builder = builder.add_source(config::File::from(path.clone()).required(false));
        }
    }

    builder = builder.add_source(
        config::Environment::with_prefix("TRIAGE")
            .separator("__")
            .try_parsing(true),
    );

    let c = builder.build()?;
    c.try_deserialize()
}
