//! 配置客户端实现
//!
//! 编排完整的配置对象解析管线：键构造、远程获取、解密、格式归一化、
//! 变更回调分发。客户端每次调用无状态，不持有已解析值的缓存；
//! 配置与密钥在进程生命周期内只读，可跨并发调用共享。

use crate::decode::decode;
use crate::error::{DccClientError, DecodeError, OptionsError, Result};
use crate::fetch::{HttpReleaseFetcher, ReleaseFetcher};
use crate::key::{format_key, or_default};
use crate::options::{validate_options, DccOptions};
use crate::release::{ConfigurationType, ResolvedConfig};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// 原始值变更回调类型
///
/// 单次触发、同步调用，回调参数与调用方收到的归一化原始文本一致。
/// 持久化的轮询/监听循环属于上层组件，本客户端只定义解析即通知的契约。
/// 生命周期参数允许回调按引用捕获调用方的局部状态。
pub type RawChanged<'a> = dyn Fn(&str) + Send + Sync + 'a;

/// Dcc配置客户端
///
/// 通过泛型注入获取器以便测试，默认使用HTTP获取器
pub struct DccClient<F: ReleaseFetcher = HttpReleaseFetcher> {
    /// 客户端配置，创建后只读
    options: DccOptions,
    /// 发布记录获取器
    fetcher: F,
}

impl DccClient<HttpReleaseFetcher> {
    /// 创建使用HTTP获取器的客户端
    ///
    /// # 参数
    /// * `options` - 客户端配置
    ///
    /// # 返回
    /// * `Result<Self>` - 客户端实例
    pub fn new(options: DccOptions) -> Result<Self> {
        validate_options(&options).map_err(OptionsError::ValidationError)?;
        let fetcher = HttpReleaseFetcher::new(
            &options.endpoint,
            Duration::from_secs(options.request_timeout_seconds),
        )?;
        Ok(Self { options, fetcher })
    }
}

impl<F: ReleaseFetcher> DccClient<F> {
    /// 创建注入自定义获取器的客户端
    ///
    /// # 参数
    /// * `options` - 客户端配置
    /// * `fetcher` - 发布记录获取器
    ///
    /// # 返回
    /// * `Result<Self>` - 客户端实例
    pub fn with_fetcher(options: DccOptions, fetcher: F) -> Result<Self> {
        validate_options(&options).map_err(OptionsError::ValidationError)?;
        Ok(Self { options, fetcher })
    }

    /// 当前客户端配置
    pub fn options(&self) -> &DccOptions {
        &self.options
    }

    /// 解析单个配置对象，返回归一化原始文本与输出类别
    ///
    /// # 参数
    /// * `config_object` - 配置对象名称
    /// * `on_changed` - 可选的变更回调，解析成功后以原始文本同步触发一次
    ///
    /// # 返回
    /// * `Result<(String, ConfigurationType)>` - 原始文本与类别
    pub async fn get_raw(
        &self,
        config_object: &str,
        on_changed: Option<&RawChanged<'_>>,
    ) -> Result<(String, ConfigurationType)> {
        self.get_raw_with_cancel(config_object, on_changed, CancellationToken::new())
            .await
    }

    /// 带取消信号的单对象解析
    ///
    /// # 参数
    /// * `config_object` - 配置对象名称
    /// * `on_changed` - 可选的变更回调
    /// * `token` - 外部取消信号，传播到底层网络调用
    ///
    /// # 返回
    /// * `Result<(String, ConfigurationType)>` - 原始文本与类别
    pub async fn get_raw_with_cancel(
        &self,
        config_object: &str,
        on_changed: Option<&RawChanged<'_>>,
        token: CancellationToken,
    ) -> Result<(String, ConfigurationType)> {
        let resolved = self.resolve_one(config_object, token).await?;
        if let Some(callback) = on_changed {
            callback(&resolved.raw);
        }
        Ok((resolved.raw, resolved.config_type))
    }

    /// 解析单个配置对象并反序列化为指定类型
    ///
    /// 回调内应用与返回值相同的反序列化，订阅方与调用方观察到
    /// 类型一致的值；原始文本无法反序列化为 `T` 时返回解码错误。
    ///
    /// # 参数
    /// * `config_object` - 配置对象名称
    /// * `on_changed` - 可选的类型化变更回调
    ///
    /// # 返回
    /// * `Result<T>` - 反序列化后的配置值
    pub async fn get<T: DeserializeOwned>(
        &self,
        config_object: &str,
        on_changed: Option<&(dyn Fn(T) + Send + Sync)>,
    ) -> Result<T> {
        self.get_with_cancel(config_object, on_changed, CancellationToken::new())
            .await
    }

    /// 带取消信号的类型化解析
    pub async fn get_with_cancel<T: DeserializeOwned>(
        &self,
        config_object: &str,
        on_changed: Option<&(dyn Fn(T) + Send + Sync)>,
        token: CancellationToken,
    ) -> Result<T> {
        let resolved = self.resolve_one(config_object, token).await?;
        if let Some(callback) = on_changed {
            let value: T = serde_json::from_str(&resolved.raw)?;
            callback(value);
        }
        Ok(serde_json::from_str(&resolved.raw)?)
    }

    /// 解析单个配置对象为开放的JSON值树
    ///
    /// 用于调用方事先不知道模式的场景
    ///
    /// # 参数
    /// * `config_object` - 配置对象名称
    /// * `on_changed` - 可选的变更回调
    ///
    /// # 返回
    /// * `Result<Value>` - JSON值树
    pub async fn get_dynamic(
        &self,
        config_object: &str,
        on_changed: Option<&RawChanged<'_>>,
    ) -> Result<Value> {
        self.get_dynamic_with_cancel(config_object, on_changed, CancellationToken::new())
            .await
    }

    /// 带取消信号的动态解析
    pub async fn get_dynamic_with_cancel(
        &self,
        config_object: &str,
        on_changed: Option<&RawChanged<'_>>,
        token: CancellationToken,
    ) -> Result<Value> {
        let resolved = self.resolve_one(config_object, token).await?;
        if let Some(callback) = on_changed {
            callback(&resolved.raw);
        }
        Ok(serde_json::from_str(&resolved.raw)?)
    }

    /// 批量解析多个配置对象
    ///
    /// 所有对象共享一次远程调用，之后逐对象独立解码：单个对象解码
    /// 失败只产生该对象的 `Err` 条目，不影响其余对象（逐对象隔离）。
    /// 结果顺序与请求的对象名顺序一致。
    ///
    /// # 参数
    /// * `environment` - 环境名称，为空时使用客户端默认值
    /// * `cluster` - 集群名称，为空时使用客户端默认值
    /// * `app_id` - 应用标识，为空时使用客户端默认值
    /// * `on_changed` - 可选的变更回调，每个解码成功的对象触发一次
    /// * `config_objects` - 请求的配置对象名列表
    ///
    /// # 返回
    /// * `Result<Vec<Result<ResolvedConfig>>>` - 外层覆盖参数与传输错误，
    ///   内层为每个对象的解码结果
    pub async fn get_raws(
        &self,
        environment: &str,
        cluster: &str,
        app_id: &str,
        on_changed: Option<&RawChanged<'_>>,
        config_objects: &[String],
    ) -> Result<Vec<Result<ResolvedConfig>>> {
        self.get_raws_with_cancel(
            environment,
            cluster,
            app_id,
            on_changed,
            config_objects,
            CancellationToken::new(),
        )
        .await
    }

    /// 带取消信号的批量解析
    pub async fn get_raws_with_cancel(
        &self,
        environment: &str,
        cluster: &str,
        app_id: &str,
        on_changed: Option<&RawChanged<'_>>,
        config_objects: &[String],
        token: CancellationToken,
    ) -> Result<Vec<Result<ResolvedConfig>>> {
        if config_objects.iter().any(|name| name.is_empty()) {
            return Err(DecodeError::EmptyConfigObject.into());
        }

        let environment = or_default(environment, &self.options.environment);
        let cluster = or_default(cluster, &self.options.cluster);
        let app_id = or_default(app_id, &self.options.app_id);
        let secret = self.options.config_object_secret.as_deref();

        debug!(
            "批量解析配置对象: env={} cluster={} app={} 对象数={}",
            environment,
            cluster,
            app_id,
            config_objects.len()
        );

        // 整个批次只挂起一次：单次网络往返覆盖全部对象名
        let releases = tokio::select! {
            biased;
            _ = token.cancelled() => return Err(DccClientError::Cancelled),
            result = self
                .fetcher
                .fetch_releases(environment, cluster, app_id, config_objects) => result?,
        };

        let mut results = Vec::with_capacity(config_objects.len());
        for config_object in config_objects {
            // 取消后不再解码，也不触发任何未触发的回调
            if token.is_cancelled() {
                return Err(DccClientError::Cancelled);
            }

            let key = format_key(environment, cluster, app_id, config_object);
            let outcome = decode(config_object, &key, releases.get(config_object), secret)
                .map_err(DccClientError::from);

            if let (Ok(resolved), Some(callback)) = (&outcome, on_changed) {
                callback(&resolved.raw);
            }
            results.push(outcome);
        }

        Ok(results)
    }

    /// 使用客户端默认作用域解析单个对象
    async fn resolve_one(
        &self,
        config_object: &str,
        token: CancellationToken,
    ) -> Result<ResolvedConfig> {
        if config_object.is_empty() {
            return Err(DecodeError::EmptyConfigObject.into());
        }

        let mut results = self
            .get_raws_with_cancel("", "", "", None, &[config_object.to_string()], token)
            .await?;

        match results.pop() {
            Some(outcome) => outcome,
            None => Err(DecodeError::NullRelease {
                key: self.key_for(config_object),
            }
            .into()),
        }
    }

    /// 构造对象在客户端默认作用域下的规范键
    fn key_for(&self, config_object: &str) -> String {
        format_key(
            &self.options.environment,
            &self.options.cluster,
            &self.options.app_id,
            config_object,
        )
    }
}
