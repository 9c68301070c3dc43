/// 日志工具模块
///
/// 初始化日志输出，并提供启动与结束时的汇总输出
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::workflow::{RunReport, TargetQueue, Termination};

/// 初始化日志
///
/// 日志级别由 `RUST_LOG` 控制，默认 `info`。重复初始化时静默忽略。
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// 记录程序启动信息
pub fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 自动选课");
    info!("👤 学号: {}", config.credential.id);
    info!(
        "⏱️ 单次请求截止时间: {:?}, 请求间隔: {:?}",
        config.attempt_deadline, config.idle_interval
    );
    info!("{}", "=".repeat(60));
}

/// 记录目标课程
pub fn log_targets(queue: &TargetQueue) {
    info!("✓ 共 {} 门目标课程", queue.len());
    for (i, course) in queue.iter().enumerate() {
        info!("  {}. {} [{}]", i + 1, course.name, course.kind);
    }
}

/// 打印最终统计信息
pub fn print_final_stats(report: &RunReport) {
    info!("\n{}", "=".repeat(60));
    info!("📊 选课结束");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    if let Termination::Aborted(e) = &report.termination {
        error!("❌ 身份认证失败, 已终止: {}", e);
    }
    info!("✅ 选课成功: {} 门", report.accepted.len());
    for name in &report.accepted {
        info!("  - {}", name);
    }
    if !report.remaining.is_empty() {
        info!("⏸️ 未完成: {}", report.remaining.join(", "));
    }
    info!("{}", "=".repeat(60));
}
