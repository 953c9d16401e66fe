//! 客户端配置数据结构定义
//!
//! 定义Dcc客户端的进程级配置结构体和验证逻辑。配置在客户端创建时
//! 构造一次，进程生命周期内只读。

use serde::{Deserialize, Serialize};

/// Dcc客户端配置
///
/// 持有配置中心端点、默认作用域（环境/集群/应用）和解密密钥。
/// 访问方法省略作用域组件时回退到这里的默认值。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DccOptions {
    /// 配置中心端点
    pub endpoint: String,
    /// 默认环境名称
    pub environment: String,
    /// 默认集群名称
    #[serde(default = "default_cluster")]
    pub cluster: String,
    /// 默认应用标识
    pub app_id: String,
    /// 配置对象解密密钥，仅在遇到加密内容时必需
    pub config_object_secret: Option<String>,
    /// 请求超时时间（秒）
    #[serde(default = "default_timeout")]
    pub request_timeout_seconds: u64,
}

// 默认值函数
fn default_cluster() -> String {
    "default".to_string()
}
fn default_timeout() -> u64 {
    10
}

/// 配置验证函数
///
/// # 参数
/// * `options` - 要验证的配置
///
/// # 返回
/// * `Result<(), String>` - 验证结果，错误时返回错误信息
pub fn validate_options(options: &DccOptions) -> Result<(), String> {
    if options.endpoint.is_empty() {
        return Err("配置中心端点不能为空".to_string());
    }

    // 作用域默认值本身必须非空，否则无法替换省略的组件
    if options.environment.is_empty() {
        return Err("默认环境名称不能为空".to_string());
    }

    if options.cluster.is_empty() {
        return Err("默认集群名称不能为空".to_string());
    }

    if options.app_id.is_empty() {
        return Err("默认应用标识不能为空".to_string());
    }

    if options.request_timeout_seconds == 0 {
        return Err("请求超时时间不能为0".to_string());
    }

    Ok(())
}
