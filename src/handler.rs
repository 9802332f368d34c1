//! # 聊天历史编排层
//!
//! `ChatHistoryHandler` 是整个应用的对外接口层，聚合存储客户端、
//! 历史组装器和会话缓存，提供历史获取、线程选取、搜索、导出和删除操作。
//!
//! 缓存对象由本层显式持有并在删除成功后显式失效，
//! 不依赖任何环境可变全局状态。

use crate::models::message::DialogueMessage;
use crate::models::settings::StoreSettings;
use crate::models::thread::{self, ThreadMap};
use crate::services::assembler;
use crate::services::cache::HistoryCache;
use crate::services::export::{self, ExportFormat};
use crate::services::store::CheckpointStore;

/// 聊天历史处理器
///
/// 每个会话构造一个实例，持有存储客户端和线程历史缓存。
pub struct ChatHistoryHandler {
    /// 检查点存储客户端
    store: CheckpointStore,
    /// 会话级线程历史缓存
    cache: HistoryCache,
}

impl ChatHistoryHandler {
    /// 根据存储连接配置构造处理器
    ///
    /// # 参数
    /// - `settings` - 存储连接配置
    ///
    /// # 错误
    /// 存储客户端构建失败时返回错误
    pub fn new(settings: &StoreSettings) -> Result<Self, String> {
        Ok(Self {
            store: CheckpointStore::new(settings)?,
            cache: HistoryCache::new(),
        })
    }

    /// 获取全部线程的聊天历史
    ///
    /// 优先从缓存获取；缓存无效时从存储拉取记录批次并重新组装。
    /// 存储故障降级为空历史（由存储客户端内部处理），不会向上抛出。
    ///
    /// # 返回值
    /// 线程标识符 → 对话消息列表的映射
    pub async fn get_chat_history(&self) -> ThreadMap {
        // 优先尝试从缓存获取
        if let Some(cached) = self.cache.get_threads() {
            return cached;
        }

        // 缓存未命中：拉取存储并组装
        let records = self.store.fetch_all_records().await;
        let threads = assembler::assemble_history(&records);

        self.cache.set_threads(threads.clone());
        threads
    }

    /// 获取单个线程的展示视图
    ///
    /// 在选取阶段按「角色 + 内容」精确匹配去重（组装阶段不去重）。
    ///
    /// # 参数
    /// - `thread_id` - 线程标识符
    ///
    /// # 返回值
    /// - `Some(messages)` - 去重后的对话消息列表
    /// - `None` - 线程不存在
    pub async fn thread_messages(&self, thread_id: &str) -> Option<Vec<DialogueMessage>> {
        let threads = self.get_chat_history().await;
        threads
            .get(thread_id)
            .map(|messages| thread::dedup_messages(messages))
    }

    /// 在全部线程的历史文本中搜索关键词
    ///
    /// 大小写不敏感；缓存未填充时先拉取历史再搜索。
    ///
    /// # 参数
    /// - `query` - 搜索查询词
    ///
    /// # 返回值
    /// 匹配的线程标识符列表
    pub async fn search_threads(&self, query: &str) -> Vec<String> {
        if let Some(hits) = self.cache.search(query) {
            return hits;
        }

        // 缓存为空：填充后重试一次
        self.get_chat_history().await;
        self.cache.search(query).unwrap_or_default()
    }

    /// 导出单个线程
    ///
    /// # 参数
    /// - `thread_id` - 线程标识符
    /// - `format` - 导出格式（Markdown / JSON）
    ///
    /// # 返回值
    /// - `Some(document)` - 导出的文档字符串
    /// - `None` - 线程不存在
    pub async fn export_thread(&self, thread_id: &str, format: ExportFormat) -> Option<String> {
        let messages = self.thread_messages(thread_id).await?;
        let document = match format {
            ExportFormat::Markdown => {
                export::to_markdown(&thread::thread_preview(&messages), &messages)
            }
            ExportFormat::Json => export::to_json(&messages),
        };
        Some(document)
    }

    /// 删除指定线程
    ///
    /// 删除存储中该线程的全部记录；成功后显式使缓存失效，
    /// 确保下次查询重新拉取。
    ///
    /// # 参数
    /// - `thread_id` - 要删除的线程标识符
    ///
    /// # 返回值
    /// 删除成功返回 true，失败返回 false
    pub async fn delete_thread(&self, thread_id: &str) -> bool {
        let deleted = self.store.delete_thread(thread_id).await;

        if deleted {
            // 清除相关缓存
            self.cache.invalidate();
        }

        deleted
    }
}
