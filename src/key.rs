//! 配置键格式化模块
//!
//! 将 (environment, cluster, appId, configObject) 组合为规范的查询键

/// 格式化配置查询键
///
/// 四个组成部分以 `-` 连接并统一转为小写。空的 environment/cluster/appId
/// 应在调用前由客户端默认值替换；configObject 没有默认值，为空属于
/// 调用方错误，由访问方法检查。
///
/// # 参数
/// * `environment` - 环境名称
/// * `cluster` - 集群名称
/// * `app_id` - 应用标识
/// * `config_object` - 配置对象名称
///
/// # 返回
/// * `String` - 规范化的查询键
pub fn format_key(environment: &str, cluster: &str, app_id: &str, config_object: &str) -> String {
    format!("{}-{}-{}-{}", environment, cluster, app_id, config_object).to_lowercase()
}

/// 返回非空值，否则回退到默认值
///
/// 用于将省略的作用域组件替换为客户端配置的默认值
pub fn or_default<'a>(value: &'a str, default: &'a str) -> &'a str {
    if value.is_empty() {
        default
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_key_joins_and_lowercases() {
        let key = format_key("Production", "Default", "MyApp", "Feature-Flags");
        assert_eq!(key, "production-default-myapp-feature-flags");
    }

    #[test]
    fn test_format_key_deterministic() {
        let a = format_key("dev", "c1", "app", "obj");
        let b = format_key("dev", "c1", "app", "obj");
        assert_eq!(a, b);
    }

    #[test]
    fn test_format_key_case_insensitive() {
        let key = format_key("DEV", "C1", "APP", "OBJ");
        assert_eq!(key, key.to_lowercase());
        assert_eq!(key, format_key("dev", "c1", "app", "obj"));
    }

    #[test]
    fn test_or_default_substitution() {
        assert_eq!(or_default("", "dev"), "dev");
        assert_eq!(or_default("prod", "dev"), "prod");
    }
}
