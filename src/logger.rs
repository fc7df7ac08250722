use tracing_subscriber::{EnvFilter, fmt};

/// 初始化日志系统
///
/// 支持通过 RUST_LOG 环境变量控制日志级别，未设置时使用 `default_level`
///
/// 示例:
/// - RUST_LOG=debug rukite run scenario.json
/// - RUST_LOG=rukite::check=trace rukite run scenario.json
pub fn init_logger(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    // 测试或嵌入场景下可能已经安装过 subscriber
    let installed = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .try_init()
        .is_ok();

    if installed {
        tracing::debug!("Logger initialized");
    }
}
