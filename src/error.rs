//! 错误处理模块
//!
//! 定义配置客户端的统一错误类型

use thiserror::Error;

/// Dcc 客户端的主要错误类型
#[derive(Error, Debug)]
pub enum DccClientError {
    /// 客户端配置相关错误
    #[error("客户端配置错误: {0}")]
    Options(#[from] OptionsError),

    /// 远程获取相关错误
    #[error("远程获取错误: {0}")]
    Fetch(#[from] FetchError),

    /// 配置对象解码相关错误
    #[error("配置对象解码错误: {0}")]
    Decode(#[from] DecodeError),

    /// IO错误
    #[error("IO错误: {0}")]
    Io(#[from] std::io::Error),

    /// JSON序列化/反序列化错误
    #[error("JSON错误: {0}")]
    Json(#[from] serde_json::Error),

    /// 调用被取消
    #[error("调用已取消")]
    Cancelled,

    /// 其他错误
    #[error("其他错误: {0}")]
    Other(#[from] anyhow::Error),
}

/// 客户端配置错误类型
#[derive(Error, Debug)]
pub enum OptionsError {
    /// 配置文件解析错误
    #[error("配置文件解析失败: {0}")]
    ParseError(String),

    /// 配置验证错误
    #[error("配置验证失败: {0}")]
    ValidationError(String),

    /// 配置文件不存在
    #[error("配置文件不存在: {path}")]
    FileNotFound { path: String },

    /// 环境变量替换错误
    #[error("环境变量替换失败: {var}")]
    EnvVarError { var: String },
}

/// 远程获取错误类型
#[derive(Error, Debug)]
pub enum FetchError {
    /// HTTP请求错误
    #[error("HTTP请求失败: {0}")]
    RequestError(#[from] reqwest::Error),

    /// 远程服务返回非成功状态码
    #[error("远程服务返回状态码: {status}")]
    UnexpectedStatus { status: u16 },

    /// 响应体无法解析
    #[error("响应解析失败: {0}")]
    InvalidResponse(String),
}

/// 配置对象解码错误类型
#[derive(Error, Debug)]
pub enum DecodeError {
    /// configObject 参数为空
    #[error("configObject 不能为空")]
    EmptyConfigObject,

    /// 远程服务中不存在该配置对象
    #[error("configObject invalid, {key} is not null")]
    NullRelease { key: String },

    /// 配置内容格式非法（Properties/XML/YAML解析失败）
    #[error("configObject invalid: {key}")]
    InvalidConfigObject { key: String },

    /// 未识别或未设置的配置格式
    #[error("unsupported configuration type: {key}")]
    UnsupportedFormat { key: String },

    /// 内容被加密但未配置解密密钥
    #[error("缺少解密密钥 ConfigObjectSecret")]
    MissingSecret,

    /// 解密失败
    #[error("解密失败: {0}")]
    Decrypt(String),
}

/// 结果类型别名
pub type Result<T> = std::result::Result<T, DccClientError>;
