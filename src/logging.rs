//! 日志系统模块
//!
//! 提供结构化日志配置功能

use std::sync::OnceLock;
use tracing_subscriber::{fmt, prelude::*, registry, EnvFilter};

/// 全局日志初始化状态
static LOGGING_INITIALIZED: OnceLock<Result<(), String>> = OnceLock::new();

/// 初始化日志系统
///
/// 安装 `tracing` 订阅器（EnvFilter + 格式化输出）并桥接 `log` 宏。
/// 重复调用是幂等的，返回首次初始化的结果。
///
/// # 参数
/// * `level` - 默认日志级别（被 `RUST_LOG` 环境变量覆盖）
///
/// # 返回
/// * `Result<(), String>` - 初始化结果
pub fn init_logging(level: &str) -> Result<(), String> {
    let level = level.to_string();
    LOGGING_INITIALIZED
        .get_or_init(|| {
            // 桥接log宏到tracing
            tracing_log::LogTracer::init().map_err(|e| format!("log桥接初始化失败: {}", e))?;

            let filter = EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(level));

            let subscriber = registry().with(filter).with(fmt::layer());
            tracing::subscriber::set_global_default(subscriber)
                .map_err(|e| format!("日志订阅器安装失败: {}", e))?;

            Ok(())
        })
        .clone()
}
