//! 配置发布记录数据结构定义
//!
//! 定义远程配置中心返回的发布记录、配置格式和归一化结果类型

use serde::{Deserialize, Serialize};

/// 发布记录声明的配置格式
///
/// 远程服务以整数传输格式标签，0表示未设置。未识别的值映射为
/// `Unset`，以保证批量响应整体可解析，仅对应对象在解码时报错。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "u8", into = "u8")]
pub enum ConfigFormat {
    /// 未设置（非法，不可解码）
    Unset,
    /// JSON文本
    Json,
    /// 原始文本，不做任何转换
    Raw,
    /// Java properties风格的 key=value 行
    Properties,
    /// XML文档
    Xml,
    /// YAML文档
    Yaml,
}

impl From<u8> for ConfigFormat {
    fn from(value: u8) -> Self {
        match value {
            1 => ConfigFormat::Json,
            2 => ConfigFormat::Raw,
            3 => ConfigFormat::Properties,
            4 => ConfigFormat::Xml,
            5 => ConfigFormat::Yaml,
            _ => ConfigFormat::Unset,
        }
    }
}

impl From<ConfigFormat> for u8 {
    fn from(value: ConfigFormat) -> Self {
        match value {
            ConfigFormat::Unset => 0,
            ConfigFormat::Json => 1,
            ConfigFormat::Raw => 2,
            ConfigFormat::Properties => 3,
            ConfigFormat::Xml => 4,
            ConfigFormat::Yaml => 5,
        }
    }
}

/// 归一化后的输出类别
///
/// 与来源格式 [`ConfigFormat`] 区分：Properties/XML/YAML来源统一
/// 归一化为JSON文本输出，Raw原样透传为 `Text`。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigurationType {
    /// JSON文本
    Json,
    /// 原始文本（不保证是JSON）
    Text,
    /// Properties来源，已归一化为JSON
    Properties,
    /// XML来源，已归一化为JSON
    Xml,
    /// YAML来源，已归一化为JSON
    Yaml,
}

/// 远程服务返回的单个配置对象发布记录
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishRelease {
    /// 原始负载内容
    #[serde(default, alias = "Content")]
    pub content: Option<String>,
    /// 声明的配置格式
    #[serde(default = "default_config_format", alias = "ConfigFormat")]
    pub config_format: ConfigFormat,
    /// 内容是否加密
    #[serde(default, alias = "Encryption")]
    pub encryption: bool,
}

fn default_config_format() -> ConfigFormat {
    ConfigFormat::Unset
}

/// 单个配置对象的解析结果
///
/// 每次获取时构造，本客户端不做持久化缓存
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    /// 配置对象名称
    pub config_object: String,
    /// 归一化后的原始文本
    pub raw: String,
    /// 输出类别
    pub config_type: ConfigurationType,
}

impl ResolvedConfig {
    /// 创建新的解析结果
    pub fn new(
        config_object: impl Into<String>,
        raw: impl Into<String>,
        config_type: ConfigurationType,
    ) -> Self {
        Self {
            config_object: config_object.into(),
            raw: raw.into(),
            config_type,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_format_from_wire_value() {
        assert_eq!(ConfigFormat::from(1), ConfigFormat::Json);
        assert_eq!(ConfigFormat::from(2), ConfigFormat::Raw);
        assert_eq!(ConfigFormat::from(3), ConfigFormat::Properties);
        assert_eq!(ConfigFormat::from(4), ConfigFormat::Xml);
        assert_eq!(ConfigFormat::from(5), ConfigFormat::Yaml);
        assert_eq!(ConfigFormat::from(0), ConfigFormat::Unset);
        // 未识别的值不会导致反序列化失败
        assert_eq!(ConfigFormat::from(42), ConfigFormat::Unset);
    }

    #[test]
    fn test_publish_release_deserialization() {
        let json = r#"{"content":"{\"a\":1}","configFormat":1,"encryption":false}"#;
        let release: PublishRelease = serde_json::from_str(json).unwrap();
        assert_eq!(release.content.as_deref(), Some("{\"a\":1}"));
        assert_eq!(release.config_format, ConfigFormat::Json);
        assert!(!release.encryption);
    }

    #[test]
    fn test_publish_release_pascal_case_alias() {
        let json = r#"{"Content":"k=v","ConfigFormat":3,"Encryption":true}"#;
        let release: PublishRelease = serde_json::from_str(json).unwrap();
        assert_eq!(release.content.as_deref(), Some("k=v"));
        assert_eq!(release.config_format, ConfigFormat::Properties);
        assert!(release.encryption);
    }

    #[test]
    fn test_publish_release_missing_fields_default() {
        let release: PublishRelease = serde_json::from_str("{}").unwrap();
        assert!(release.content.is_none());
        assert_eq!(release.config_format, ConfigFormat::Unset);
        assert!(!release.encryption);
    }
}
