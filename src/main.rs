// ==========================================
// 印花工坊排程引擎 - 命令行入口
// ==========================================
// 用法: print-shop-scheduler [--config PATH] [--jobs CSV] [--log-json]
// 输出: 各工艺待排作业 (按交期分组) 的 JSON, 写 stdout
// ==========================================

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use print_shop_scheduler::app::AppState;
use print_shop_scheduler::{logging, DecorationMethod};

#[derive(Debug, Default)]
struct CliArgs {
    config: Option<PathBuf>,
    jobs: Option<PathBuf>,
    log_json: bool,
}

fn parse_args<I: Iterator<Item = String>>(mut args: I) -> Result<CliArgs> {
    let mut parsed = CliArgs::default();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => {
                let value = args.next().context("--config 需要一个路径参数")?;
                parsed.config = Some(PathBuf::from(value));
            }
            "--jobs" => {
                let value = args.next().context("--jobs 需要一个CSV路径参数")?;
                parsed.jobs = Some(PathBuf::from(value));
            }
            "--log-json" => parsed.log_json = true,
            "-h" | "--help" => {
                println!("用法: print-shop-scheduler [--config PATH] [--jobs CSV] [--log-json]");
                std::process::exit(0);
            }
            other => bail!("无法识别的参数: {}", other),
        }
    }
    Ok(parsed)
}

fn main() -> Result<()> {
    let args = parse_args(std::env::args().skip(1))?;
    if args.log_json {
        logging::init_json();
    } else {
        logging::init();
    }

    tracing::info!("==================================================");
    tracing::info!("{} v{}", print_shop_scheduler::APP_NAME, print_shop_scheduler::VERSION);
    tracing::info!("==================================================");

    let state = AppState::load(args.config.as_deref()).map_err(anyhow::Error::msg)?;

    if let Some(path) = &args.jobs {
        let report = state
            .import_api
            .import_jobs_csv(path, "cli")
            .with_context(|| format!("导入作业失败: {}", path.display()))?;
        for rejection in &report.rejected {
            tracing::warn!(row = rejection.row, reason = %rejection.reason, "跳过无效作业行");
        }
    }

    let mut backlog = serde_json::Map::new();
    for method in DecorationMethod::ALL {
        if state.engine.pipeline().stages_for(method).is_empty() {
            continue;
        }
        let buckets = state.query_api.unscheduled_by_due_date(method.as_str())?;
        backlog.insert(method.as_str().to_string(), serde_json::to_value(buckets)?);
    }

    println!("{}", serde_json::to_string_pretty(&backlog)?);
    Ok(())
}
