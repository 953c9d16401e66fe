//! 配置格式解码模块
//!
//! 将发布记录的原始负载按声明格式归一化为JSON文本。Properties/XML/YAML
//! 来源统一转换为JSON输出，Raw与JSON原样透传。格式集合是封闭枚举，
//! 分发通过穷尽匹配完成。

use crate::crypto;
use crate::error::DecodeError;
use crate::release::{ConfigFormat, ConfigurationType, PublishRelease, ResolvedConfig};
use serde_json::{Map, Value};
use tracing::warn;

/// 解码单个配置对象的发布记录
///
/// 完整的单对象处理管线：空记录检查、加密检查与解密、格式分发。
/// 解密严格发生在格式分发之前，作用于仍处于编码状态的内容；
/// 内容被标记加密但未配置密钥时，在任何解码尝试之前即失败。
///
/// # 参数
/// * `config_object` - 配置对象名称
/// * `key` - 规范化查询键（用于错误与日志上下文）
/// * `release` - 远程返回的发布记录，缺失表示远端不存在该对象
/// * `secret` - 配置的解密密钥
///
/// # 返回
/// * `Result<ResolvedConfig, DecodeError>` - 归一化结果
pub fn decode(
    config_object: &str,
    key: &str,
    release: Option<&PublishRelease>,
    secret: Option<&str>,
) -> Result<ResolvedConfig, DecodeError> {
    let release = release.ok_or_else(|| DecodeError::NullRelease {
        key: key.to_string(),
    })?;

    let mut content = release.content.clone().unwrap_or_default();

    if release.encryption {
        let secret = secret.ok_or(DecodeError::MissingSecret)?;
        content = crypto::decrypt(secret, &content)?;
    }

    match release.config_format {
        ConfigFormat::Json => Ok(ResolvedConfig::new(
            config_object,
            content,
            ConfigurationType::Json,
        )),
        ConfigFormat::Raw => Ok(ResolvedConfig::new(
            config_object,
            content,
            ConfigurationType::Text,
        )),
        ConfigFormat::Properties => {
            let value = properties_to_json(&content).map_err(|e| invalid(key, "Properties", e))?;
            Ok(ResolvedConfig::new(
                config_object,
                serialize(key, value)?,
                ConfigurationType::Properties,
            ))
        }
        ConfigFormat::Xml => {
            let value = xml_to_json(&content).map_err(|e| invalid(key, "XML", e))?;
            Ok(ResolvedConfig::new(
                config_object,
                serialize(key, value)?,
                ConfigurationType::Xml,
            ))
        }
        ConfigFormat::Yaml => {
            let value = yaml_to_json(&content).map_err(|e| invalid(key, "YAML", e))?;
            Ok(ResolvedConfig::new(
                config_object,
                serialize(key, value)?,
                ConfigurationType::Yaml,
            ))
        }
        ConfigFormat::Unset => Err(DecodeError::UnsupportedFormat {
            key: key.to_string(),
        }),
    }
}

/// 记录解析失败详情并折叠为统一的"配置对象无效"错误
///
/// 调用方只能通过日志区分具体格式错误，错误类型本身不区分
fn invalid(key: &str, format: &str, detail: String) -> DecodeError {
    warn!("配置对象解析失败: key={}, 格式={}, 原因: {}", key, format, detail);
    DecodeError::InvalidConfigObject {
        key: key.to_string(),
    }
}

/// 将JSON值树序列化为文本
fn serialize(key: &str, value: Value) -> Result<String, DecodeError> {
    serde_json::to_string(&value).map_err(|e| invalid(key, "JSON", e.to_string()))
}

/// 解析Java properties风格的 key=value 行为平坦JSON对象
///
/// 空行与 `#`/`!` 注释行跳过，首个 `=` 分隔键值，两侧去除空白，
/// 值统一保留为字符串
fn properties_to_json(content: &str) -> Result<Value, String> {
    let mut map = Map::new();
    for (index, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with('!') {
            continue;
        }
        let (name, value) = line
            .split_once('=')
            .ok_or_else(|| format!("第{}行缺少'='分隔符: {}", index + 1, line))?;
        map.insert(
            name.trim().to_string(),
            Value::String(value.trim().to_string()),
        );
    }
    Ok(Value::Object(map))
}

/// 解析YAML并转换为JSON值树
fn yaml_to_json(content: &str) -> Result<Value, String> {
    serde_yaml::from_str::<Value>(content).map_err(|e| e.to_string())
}

/// 构造中的XML元素
struct XmlElement {
    name: String,
    attributes: Map<String, Value>,
    children: Vec<(String, Value)>,
    text: String,
}

impl XmlElement {
    fn new(name: String, attributes: Map<String, Value>) -> Self {
        Self {
            name,
            attributes,
            children: Vec::new(),
            text: String::new(),
        }
    }

    /// 收敛为JSON值：纯文本元素折叠为字符串，其余构造对象，
    /// 属性以 `@` 前缀、混合文本以 `#text` 字段表示，同名子元素聚合为数组
    fn finish(self) -> Value {
        if self.attributes.is_empty() && self.children.is_empty() {
            return Value::String(self.text);
        }

        let mut object = self.attributes;
        for (name, value) in self.children {
            match object.get_mut(&name) {
                Some(Value::Array(items)) => items.push(value),
                Some(existing) => {
                    let first = existing.take();
                    *existing = Value::Array(vec![first, value]);
                }
                None => {
                    object.insert(name, value);
                }
            }
        }
        if !self.text.is_empty() {
            object.insert("#text".to_string(), Value::String(self.text));
        }
        Value::Object(object)
    }
}

/// 将XML文档转换为等价的JSON结构
///
/// 根元素名作为顶层字段保留
fn xml_to_json(content: &str) -> Result<Value, String> {
    use quick_xml::events::Event;
    use quick_xml::Reader;

    let mut reader = Reader::from_str(content);
    let config = reader.config_mut();
    config.trim_text_start = true;
    config.trim_text_end = true;

    let mut stack: Vec<XmlElement> = Vec::new();
    let mut root: Option<(String, Value)> = None;

    loop {
        match reader.read_event().map_err(|e| e.to_string())? {
            Event::Start(start) => {
                let element = element_from_start(&start)?;
                stack.push(element);
            }
            Event::Empty(start) => {
                let element = element_from_start(&start)?;
                close_element(element, &mut stack, &mut root)?;
            }
            Event::Text(text) => {
                let text = text.unescape().map_err(|e| e.to_string())?;
                if let Some(current) = stack.last_mut() {
                    current.text.push_str(&text);
                }
            }
            Event::CData(data) => {
                let text = String::from_utf8(data.into_inner().into_owned())
                    .map_err(|e| e.to_string())?;
                if let Some(current) = stack.last_mut() {
                    current.text.push_str(&text);
                }
            }
            Event::End(_) => {
                let element = stack.pop().ok_or("意外的结束标签")?;
                close_element(element, &mut stack, &mut root)?;
            }
            Event::Eof => break,
            // 声明、注释、处理指令对归一化结果无贡献
            _ => {}
        }
    }

    if !stack.is_empty() {
        return Err("文档在元素闭合前结束".to_string());
    }

    let (name, value) = root.ok_or("文档不包含根元素")?;
    let mut document = Map::new();
    document.insert(name, value);
    Ok(Value::Object(document))
}

/// 从开始标签构造元素（含属性）
fn element_from_start(
    start: &quick_xml::events::BytesStart<'_>,
) -> Result<XmlElement, String> {
    let name = String::from_utf8(start.name().as_ref().to_vec()).map_err(|e| e.to_string())?;
    let mut attributes = Map::new();
    for attribute in start.attributes() {
        let attribute = attribute.map_err(|e| e.to_string())?;
        let attr_name =
            String::from_utf8(attribute.key.as_ref().to_vec()).map_err(|e| e.to_string())?;
        let attr_value = attribute.unescape_value().map_err(|e| e.to_string())?;
        attributes.insert(
            format!("@{}", attr_name),
            Value::String(attr_value.into_owned()),
        );
    }
    Ok(XmlElement::new(name, attributes))
}

/// 闭合元素并挂接到父元素或根
fn close_element(
    element: XmlElement,
    stack: &mut Vec<XmlElement>,
    root: &mut Option<(String, Value)>,
) -> Result<(), String> {
    let name = element.name.clone();
    let value = element.finish();
    match stack.last_mut() {
        Some(parent) => {
            parent.children.push((name, value));
            Ok(())
        }
        None => {
            if root.is_some() {
                return Err("文档包含多个根元素".to_string());
            }
            *root = Some((name, value));
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn release(format: ConfigFormat, content: &str) -> PublishRelease {
        PublishRelease {
            content: Some(content.to_string()),
            config_format: format,
            encryption: false,
        }
    }

    #[test]
    fn test_json_passthrough() {
        let release = release(ConfigFormat::Json, r#"{"enabled":true}"#);
        let resolved = decode("feature-flags", "dev-c1-app-feature-flags", Some(&release), None)
            .unwrap();
        assert_eq!(resolved.raw, r#"{"enabled":true}"#);
        assert_eq!(resolved.config_type, ConfigurationType::Json);
        assert_eq!(resolved.config_object, "feature-flags");
    }

    #[test]
    fn test_raw_passthrough() {
        let release = release(ConfigFormat::Raw, "plain text, not json");
        let resolved = decode("banner", "dev-c1-app-banner", Some(&release), None).unwrap();
        assert_eq!(resolved.raw, "plain text, not json");
        assert_eq!(resolved.config_type, ConfigurationType::Text);
    }

    #[test]
    fn test_properties_normalization() {
        let release = release(ConfigFormat::Properties, "a=1\nb=2");
        let resolved = decode("props", "dev-c1-app-props", Some(&release), None).unwrap();
        assert_eq!(resolved.raw, r#"{"a":"1","b":"2"}"#);
        assert_eq!(resolved.config_type, ConfigurationType::Properties);
    }

    #[test]
    fn test_properties_skips_comments_and_blank_lines() {
        let content = "# 注释\n\n! 也是注释\nkey = value\n";
        let release = release(ConfigFormat::Properties, content);
        let resolved = decode("props", "dev-c1-app-props", Some(&release), None).unwrap();
        assert_eq!(resolved.raw, r#"{"key":"value"}"#);
    }

    #[test]
    fn test_properties_malformed_line_is_invalid() {
        let release = release(ConfigFormat::Properties, "no-equals-sign-here");
        let result = decode("props", "dev-c1-app-props", Some(&release), None);
        assert!(matches!(
            result,
            Err(DecodeError::InvalidConfigObject { key }) if key == "dev-c1-app-props"
        ));
    }

    #[test]
    fn test_yaml_normalization() {
        let release = release(ConfigFormat::Yaml, "key: value");
        let resolved = decode("yml", "dev-c1-app-yml", Some(&release), None).unwrap();
        assert_eq!(resolved.raw, r#"{"key":"value"}"#);
        assert_eq!(resolved.config_type, ConfigurationType::Yaml);
    }

    #[test]
    fn test_yaml_nested_structure() {
        let release = release(ConfigFormat::Yaml, "db:\n  host: localhost\n  port: 5432");
        let resolved = decode("yml", "dev-c1-app-yml", Some(&release), None).unwrap();
        let value: Value = serde_json::from_str(&resolved.raw).unwrap();
        assert_eq!(value["db"]["host"], "localhost");
        assert_eq!(value["db"]["port"], 5432);
    }

    #[test]
    fn test_yaml_malformed_is_invalid() {
        let release = release(ConfigFormat::Yaml, "key: [unclosed");
        let result = decode("yml", "dev-c1-app-yml", Some(&release), None);
        assert!(matches!(result, Err(DecodeError::InvalidConfigObject { .. })));
    }

    #[test]
    fn test_xml_normalization() {
        let release = release(
            ConfigFormat::Xml,
            r#"<settings><timeout>30</timeout><mode>fast</mode></settings>"#,
        );
        let resolved = decode("xml", "dev-c1-app-xml", Some(&release), None).unwrap();
        let value: Value = serde_json::from_str(&resolved.raw).unwrap();
        assert_eq!(value["settings"]["timeout"], "30");
        assert_eq!(value["settings"]["mode"], "fast");
        assert_eq!(resolved.config_type, ConfigurationType::Xml);
    }

    #[test]
    fn test_xml_attributes_and_repeated_elements() {
        let release = release(
            ConfigFormat::Xml,
            r#"<servers><server name="a"/><server name="b"/></servers>"#,
        );
        let resolved = decode("xml", "dev-c1-app-xml", Some(&release), None).unwrap();
        let value: Value = serde_json::from_str(&resolved.raw).unwrap();
        assert_eq!(value["servers"]["server"][0]["@name"], "a");
        assert_eq!(value["servers"]["server"][1]["@name"], "b");
    }

    #[test]
    fn test_xml_malformed_is_invalid() {
        let release = release(ConfigFormat::Xml, "<open><never-closed></open>");
        let result = decode("xml", "dev-c1-app-xml", Some(&release), None);
        assert!(matches!(result, Err(DecodeError::InvalidConfigObject { .. })));
    }

    #[test]
    fn test_unset_format_is_unsupported() {
        let release = release(ConfigFormat::Unset, "whatever");
        let result = decode("obj", "dev-c1-app-obj", Some(&release), None);
        assert!(matches!(
            result,
            Err(DecodeError::UnsupportedFormat { key }) if key == "dev-c1-app-obj"
        ));
    }

    #[test]
    fn test_missing_release_is_null_error() {
        let result = decode("obj", "dev-c1-app-obj", None, None);
        assert!(matches!(
            result,
            Err(DecodeError::NullRelease { key }) if key == "dev-c1-app-obj"
        ));
    }

    #[test]
    fn test_encrypted_without_secret_fails_before_decode() {
        // 格式是Unset，但缺少密钥的错误必须先于任何解码检查出现
        let release = PublishRelease {
            content: Some("Y2lwaGVydGV4dA==".to_string()),
            config_format: ConfigFormat::Unset,
            encryption: true,
        };
        let result = decode("obj", "dev-c1-app-obj", Some(&release), None);
        assert!(matches!(result, Err(DecodeError::MissingSecret)));
    }

    #[test]
    fn test_encrypted_sentinel_decodes_without_real_ciphertext() {
        // 空对象哨兵即使标记加密也原样透传
        let release = PublishRelease {
            content: Some("{}".to_string()),
            config_format: ConfigFormat::Json,
            encryption: true,
        };
        let resolved = decode("obj", "dev-c1-app-obj", Some(&release), Some("secret")).unwrap();
        assert_eq!(resolved.raw, "{}");
    }

    #[test]
    fn test_null_content_decodes_as_empty() {
        let release = PublishRelease {
            content: None,
            config_format: ConfigFormat::Raw,
            encryption: false,
        };
        let resolved = decode("obj", "dev-c1-app-obj", Some(&release), None).unwrap();
        assert_eq!(resolved.raw, "");
        assert_eq!(resolved.config_type, ConfigurationType::Text);
    }
}
