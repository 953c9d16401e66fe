//! 远程发布记录获取模块
//!
//! 向配置中心发起批量解析调用：一次调用覆盖全部请求的配置对象名，
//! N个对象查询只消耗一次网络往返

use crate::error::{FetchError, Result};
use crate::release::PublishRelease;
use async_trait::async_trait;
use reqwest::Client;
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;

/// 发布记录获取器trait，定义远程解析接口
#[async_trait]
pub trait ReleaseFetcher: Send + Sync {
    /// 批量获取指定作用域下的发布记录
    ///
    /// 服务端未返回的对象名在结果映射中缺失，不视为本层错误；
    /// 传输失败原样向上传播，本层不做重试。
    ///
    /// # 参数
    /// * `environment` - 环境名称
    /// * `cluster` - 集群名称
    /// * `app_id` - 应用标识
    /// * `config_objects` - 请求的配置对象名列表
    ///
    /// # 返回
    /// * `Result<HashMap<String, PublishRelease>>` - 对象名到发布记录的映射
    async fn fetch_releases(
        &self,
        environment: &str,
        cluster: &str,
        app_id: &str,
        config_objects: &[String],
    ) -> Result<HashMap<String, PublishRelease>>;
}

/// 基于HTTP的发布记录获取器实现
pub struct HttpReleaseFetcher {
    /// HTTP客户端
    client: Client,
    /// 配置中心端点（不含路径）
    endpoint: String,
}

impl HttpReleaseFetcher {
    /// 创建新的HTTP获取器
    ///
    /// # 参数
    /// * `endpoint` - 配置中心端点
    /// * `timeout` - 请求超时时间
    ///
    /// # 返回
    /// * `Result<Self>` - 获取器实例
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(format!("{}/{}", crate::APP_NAME, crate::VERSION))
            .build()
            .map_err(FetchError::RequestError)?;

        Ok(Self {
            client,
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
        })
    }

    /// 构建批量解析接口的URL
    fn build_url(&self, environment: &str, cluster: &str, app_id: &str) -> String {
        format!(
            "{}/open-api/releasing/get/{}/{}/{}",
            self.endpoint, environment, cluster, app_id
        )
    }
}

#[async_trait]
impl ReleaseFetcher for HttpReleaseFetcher {
    async fn fetch_releases(
        &self,
        environment: &str,
        cluster: &str,
        app_id: &str,
        config_objects: &[String],
    ) -> Result<HashMap<String, PublishRelease>> {
        let url = self.build_url(environment, cluster, app_id);
        debug!("请求配置发布记录: {} 对象数={}", url, config_objects.len());

        let response = self
            .client
            .post(&url)
            .json(config_objects)
            .send()
            .await
            .map_err(FetchError::RequestError)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::UnexpectedStatus {
                status: status.as_u16(),
            }
            .into());
        }

        let releases = response
            .json::<HashMap<String, PublishRelease>>()
            .await
            .map_err(|e| FetchError::InvalidResponse(e.to_string()))?;

        debug!("收到发布记录 {} 条", releases.len());
        Ok(releases)
    }
}
