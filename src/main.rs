//! Triage - 诊所预约编排引擎
//!
//! 入口：初始化日志与配置，装配工具注册表与执行器，
//! 在控制台循环里解析命令、构建并执行计划、渲染结果视图。

use std::sync::Arc;

use anyhow::Context;
use chrono::{TimeZone, Utc};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use triage::config::load_config;
use triage::core::{prioritize, Request, RunState};
use triage::intent::{parse, Intent};
use triage::plan::{PlanBuilder, PlanExecutor};
use triage::providers::{InMemoryCalendar, InMemoryMailer};
use triage::report;
use triage::tools::{NotifierTool, RequestBookkeepingTool, SchedulerTool, ToolRegistry};

/// 演示工单（seed.demo_worklist 开启时载入）
fn seed_requests() -> Vec<Request> {
    vec![
        Request::new(
            "John Doe",
            "chest pain",
            "urgent",
            "john@example.com",
            Utc.with_ymd_and_hms(2025, 4, 12, 8, 0, 0).single().unwrap_or_else(Utc::now),
        ),
        Request::new(
            "Jane Smith",
            "annual checkup",
            "routine",
            "jane@example.com",
            Utc.with_ymd_and_hms(2025, 4, 12, 8, 5, 0).single().unwrap_or_else(Utc::now),
        ),
        Request::new(
            "Bob Lee",
            "diabetes follow-up",
            "moderate",
            "bob@example.com",
            Utc.with_ymd_and_hms(2025, 4, 12, 8, 10, 0).single().unwrap_or_else(Utc::now),
        ),
    ]
}

const HELP: &str = "Commands:
  book appointment for [name], [condition], [urgency], email [email]
  prioritize | list | schedule | schedule and notify | send email
  requests | appointments | emails | tools | quit";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 日志：默认 info，可通过 RUST_LOG 覆盖
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive("info".parse()?))
        .with(fmt::layer())
        .init();

    let cfg = load_config(None).context("Failed to load config")?;
    let app_name = cfg.app.name.clone().unwrap_or_else(|| "triage".to_string());

    let mut state = RunState::new();
    if cfg.seed.demo_worklist {
        for req in seed_requests() {
            state.push_request(req);
        }
    }

    let mut registry = ToolRegistry::new();
    registry.register(SchedulerTool::new(
        Arc::new(InMemoryCalendar::new()),
        cfg.scheduler.timezone.clone(),
    ));
    registry.register(NotifierTool::new(Arc::new(InMemoryMailer::new())));
    registry.register(RequestBookkeepingTool);

    let builder = PlanBuilder::new(cfg.notifier.subject.clone(), cfg.notifier.signature.clone());
    let executor = PlanExecutor::new(registry);
    tracing::info!(run_id = %executor.run_id(), "{} started", app_name);

    println!("{} ready. {}", app_name, HELP);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("stdin closed")? {
        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        match input.to_lowercase().as_str() {
            "quit" | "exit" => break,
            "help" => {
                println!("{}", HELP);
                continue;
            }
            "requests" => {
                println!("{}", report::render_worklist(&state));
                continue;
            }
            "appointments" => {
                println!("{}", report::render_appointments(&state));
                continue;
            }
            "emails" => {
                println!("{}", report::render_notifications(&state));
                continue;
            }
            "tools" => {
                println!("{}", executor.registry().to_schema_json());
                continue;
            }
            _ => {}
        }

        let intent = match parse(input) {
            Ok(intent) => intent,
            Err(e) => {
                println!("{}", e);
                continue;
            }
        };

        let plan = match intent {
            Intent::Bookkeeping(action) => builder.single_action(&action),
            Intent::ScheduleAll { notify } => {
                let ranked = prioritize(state.worklist());
                builder.bulk_schedule(&ranked, Utc::now().date_naive(), notify)
            }
            Intent::NotifyAll => builder.notify_appointments(state.appointments()),
            Intent::Unclear => {
                println!("Sorry, I did not understand that. {}", HELP);
                continue;
            }
        };

        match plan {
            Ok(plan) => {
                let report = executor.execute(&plan, &mut state).await;
                if report.outcomes.is_empty() {
                    println!("(nothing to do)");
                }
                for line in report.render_lines() {
                    println!("{}", line);
                }
            }
            Err(e) => println!("Cannot build plan: {}", e),
        }
    }

    Ok(())
}
