//! 客户端配置模块
//!
//! 提供配置文件解析、验证功能

pub mod loader;
pub mod types;

// 重新导出主要类型
pub use loader::{get_default_options_path, OptionsLoader, TomlOptionsLoader};
pub use types::{validate_options, DccOptions};
