//! Dcc Client - 分布式配置中心客户端
//!
//! 这是一个用Rust编写的远程配置获取与解码客户端，支持：
//! - 按 (environment, cluster, appId) 作用域批量获取配置对象
//! - JSON/RAW/Properties/XML/YAML格式归一化为JSON文本
//! - AES加密负载解密
//! - 单次触发的变更回调
//! - 结构化日志记录

pub mod client;
pub mod crypto;
pub mod decode;
pub mod error;
pub mod fetch;
pub mod key;
pub mod logging;
pub mod options;
pub mod release;

// 重新导出主要类型
pub use client::{DccClient, RawChanged};
pub use error::{DccClientError, DecodeError, FetchError, OptionsError};
pub use fetch::{HttpReleaseFetcher, ReleaseFetcher};
pub use options::{DccOptions, OptionsLoader, TomlOptionsLoader};
pub use release::{ConfigFormat, ConfigurationType, PublishRelease, ResolvedConfig};

/// 应用程序版本信息
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// 应用程序名称
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
