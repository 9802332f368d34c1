//! # 检查点存储客户端
//!
//! 通过 Supabase PostgREST 接口访问检查点存储（`checkpoints` 表）。
//! 存储只需支持两种操作：整表拉取和按 `thread_id` 过滤删除。
//!
//! ## 容错策略
//! 存储访问失败不会向上层抛出：
//! - 拉取失败 → 记录错误日志并返回空结果集
//! - 删除失败 → 记录错误日志并返回 false
//!
//! 单次存储故障只影响当前操作，不会使整个会话不可用。

use std::time::Duration;

use crate::models::message::CheckpointRecord;
use crate::models::settings::StoreSettings;

/// 存储请求的超时时间（秒），与聊天服务端的上游调用保持一致
const STORE_REQUEST_TIMEOUT_SECS: u64 = 30;

/// 检查点存储客户端
///
/// 持有复用的 HTTP 连接池；按会话构造一次，整个会话期间共享。
pub struct CheckpointStore {
    /// 复用的 HTTP 客户端（带统一超时配置）
    client: reqwest::Client,
    /// 检查点表的 PostgREST 端点（`{url}/rest/v1/{table}`）
    endpoint: String,
    /// API 密钥：同时用于 `apikey` 请求头和 Bearer 授权
    api_key: String,
}

impl CheckpointStore {
    /// 根据存储连接配置构造客户端
    ///
    /// # 参数
    /// - `settings` - 存储连接配置（URL、密钥、表名）
    ///
    /// # 错误
    /// HTTP 客户端构建失败时返回错误
    pub fn new(settings: &StoreSettings) -> Result<Self, String> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(STORE_REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| format!("创建 HTTP 客户端失败: {}", e))?;

        let endpoint = format!(
            "{}/rest/v1/{}",
            settings.url.trim_end_matches('/'),
            settings.table
        );

        Ok(Self {
            client,
            endpoint,
            api_key: settings.api_key.clone(),
        })
    }

    /// 拉取存储中的全部检查点记录
    ///
    /// 对应 PostgREST 的 `GET {endpoint}?select=*`。
    ///
    /// # 返回值
    /// 记录数组；任何传输或解析失败都记录错误日志并返回空数组
    pub async fn fetch_all_records(&self) -> Vec<CheckpointRecord> {
        match self.try_fetch_all().await {
            Ok(records) => {
                log::info!("已获取 {} 条检查点记录", records.len());
                records
            }
            Err(e) => {
                log::error!("获取检查点记录失败: {}", e);
                vec![]
            }
        }
    }

    /// 拉取全部记录的可失败内部实现
    async fn try_fetch_all(&self) -> Result<Vec<CheckpointRecord>, String> {
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("select", "*")])
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(|e| format!("请求检查点存储失败: {}", e))?
            .error_for_status()
            .map_err(|e| format!("检查点存储返回错误状态: {}", e))?;

        response
            .json::<Vec<CheckpointRecord>>()
            .await
            .map_err(|e| format!("解析检查点存储响应失败: {}", e))
    }

    /// 删除指定线程的全部记录
    ///
    /// 对应 PostgREST 的 `DELETE {endpoint}?thread_id=eq.{id}`，
    /// 一次过滤删除覆盖该线程的所有行，不做部分删除的对账。
    ///
    /// # 参数
    /// - `thread_id` - 要删除的线程标识符
    ///
    /// # 返回值
    /// 删除成功返回 true；任何失败记录错误日志并返回 false
    pub async fn delete_thread(&self, thread_id: &str) -> bool {
        let result = self
            .client
            .delete(&self.endpoint)
            .query(&[("thread_id", format!("eq.{}", thread_id))])
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .send()
            .await
            .and_then(|response| response.error_for_status());

        match result {
            Ok(_) => {
                log::info!("已删除线程 {} 的全部记录", thread_id);
                true
            }
            Err(e) => {
                log::error!("删除线程 {} 失败: {}", thread_id, e);
                false
            }
        }
    }
}
