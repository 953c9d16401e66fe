//! 客户端配置加载器实现
//!
//! 提供TOML配置文件解析、环境变量替换和错误处理功能

use crate::error::{OptionsError, Result};
use crate::options::types::{validate_options, DccOptions};
use async_trait::async_trait;
use regex::Regex;
use std::path::Path;

/// 配置加载器trait，定义配置加载接口
#[async_trait]
pub trait OptionsLoader: Send + Sync {
    /// 从文件加载配置
    ///
    /// # 参数
    /// * `path` - 配置文件路径
    ///
    /// # 返回
    /// * `Result<DccOptions>` - 加载的配置或错误
    async fn load_from_file<P: AsRef<Path> + Send>(&self, path: P) -> Result<DccOptions>;

    /// 从字符串加载配置
    ///
    /// # 参数
    /// * `content` - 配置文件内容
    ///
    /// # 返回
    /// * `Result<DccOptions>` - 加载的配置或错误
    async fn load_from_string(&self, content: &str) -> Result<DccOptions>;

    /// 验证配置
    ///
    /// # 参数
    /// * `options` - 要验证的配置
    ///
    /// # 返回
    /// * `Result<()>` - 验证结果
    fn validate(&self, options: &DccOptions) -> Result<()>;
}

/// TOML配置加载器实现
#[derive(Debug, Clone)]
pub struct TomlOptionsLoader {
    /// 是否启用环境变量替换
    enable_env_substitution: bool,
}

impl TomlOptionsLoader {
    /// 创建新的TOML配置加载器
    ///
    /// # 参数
    /// * `enable_env_substitution` - 是否启用环境变量替换
    ///
    /// # 返回
    /// * `Self` - 配置加载器实例
    pub fn new(enable_env_substitution: bool) -> Self {
        Self {
            enable_env_substitution,
        }
    }

    /// 替换字符串中的环境变量
    ///
    /// # 参数
    /// * `content` - 要处理的字符串
    ///
    /// # 返回
    /// * `Result<String>` - 替换后的字符串或错误
    fn substitute_env_vars(&self, content: &str) -> Result<String> {
        if !self.enable_env_substitution {
            return Ok(content.to_string());
        }

        // 匹配 ${VAR_NAME} 格式的环境变量
        let env_var_regex = Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}")
            .map_err(|e| OptionsError::ParseError(format!("正则表达式错误: {}", e)))?;

        let mut result = content.to_string();

        for captures in env_var_regex.captures_iter(content) {
            let full_match = &captures[0];
            let var_name = &captures[1];

            match std::env::var(var_name) {
                Ok(value) => {
                    result = result.replace(full_match, &value);
                }
                Err(_) => {
                    return Err(OptionsError::EnvVarError {
                        var: var_name.to_string(),
                    }
                    .into());
                }
            }
        }

        Ok(result)
    }

    /// 解析TOML内容
    ///
    /// # 参数
    /// * `content` - TOML内容
    ///
    /// # 返回
    /// * `Result<DccOptions>` - 解析的配置或错误
    fn parse_toml(&self, content: &str) -> Result<DccOptions> {
        // 替换环境变量
        let processed_content = self.substitute_env_vars(content)?;

        // 解析TOML
        let options: DccOptions = toml::from_str(&processed_content)
            .map_err(|e| OptionsError::ParseError(format!("TOML解析失败: {}", e)))?;

        Ok(options)
    }
}

#[async_trait]
impl OptionsLoader for TomlOptionsLoader {
    async fn load_from_file<P: AsRef<Path> + Send>(&self, path: P) -> Result<DccOptions> {
        let path = path.as_ref();

        // 检查文件是否存在
        if !path.exists() {
            return Err(OptionsError::FileNotFound {
                path: path.to_string_lossy().to_string(),
            }
            .into());
        }

        // 读取文件内容
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| OptionsError::ParseError(format!("读取文件失败: {}", e)))?;

        // 解析配置
        let options = self.parse_toml(&content)?;

        // 验证配置
        self.validate(&options)?;

        log::info!("成功加载客户端配置文件: {}", path.display());

        Ok(options)
    }

    async fn load_from_string(&self, content: &str) -> Result<DccOptions> {
        // 解析配置
        let options = self.parse_toml(content)?;

        // 验证配置
        self.validate(&options)?;

        log::debug!("成功解析客户端配置字符串");

        Ok(options)
    }

    fn validate(&self, options: &DccOptions) -> Result<()> {
        validate_options(options).map_err(|e| OptionsError::ValidationError(e).into())
    }
}

/// 获取默认配置文件路径
pub fn get_default_options_path() -> std::path::PathBuf {
    // 先检测当前目录是否存在dcc.toml，不存在则检测用户配置目录
    if std::path::Path::new("dcc.toml").exists() {
        std::path::PathBuf::from("dcc.toml")
    } else {
        dirs::config_dir()
            .map(|config_dir| config_dir.join("dcc-client").join("dcc.toml"))
            .unwrap_or_else(|| std::path::PathBuf::from("dcc.toml"))
    }
}
