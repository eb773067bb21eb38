/// 日志工具模块
///
/// 日志写到 stderr，终端界面独占 stdout
use crate::config::Config;
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// 初始化日志
///
/// 优先使用 `RUST_LOG`；未设置时为 `info`，`verbose` 为真时为 `debug`。
/// 重复调用不会报错（测试中可能多次初始化）
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let stderr_layer = fmt::layer().with_writer(std::io::stderr).with_target(false);

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .try_init();
}

/// 记录程序启动信息
pub fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 职业倾向测试");
    info!("🌐 API 地址: {}", config.api_base_url);
    info!("💾 会话文件: {}", config.session_file);
    info!("{}", "=".repeat(60));
}

/// 记录程序退出信息
pub fn log_shutdown() {
    info!("{}", "=".repeat(60));
    info!(
        "👋 程序结束: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大字符数
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}
