//! # 内存缓存管理服务
//!
//! 提供会话级的线程历史缓存，减少对检查点存储的重复网络拉取：
//! - **线程历史缓存**：存储上次组装结果，带时间戳用于判断有效性
//! - **搜索文本缓存**：每个线程的小写化全文在写入缓存时预计算
//!
//! ## 缓存失效策略
//! - 基于 TTL（生存时间）：超过阈值后下次访问触发重新拉取
//! - 显式失效：删除线程成功后由编排层调用 `invalidate`，
//!   而非依赖环境可变全局状态自行过期
//!
//! ## 线程安全
//! 使用 `std::sync::RwLock` 保证多线程安全访问，允许多个读操作并发进行。
//!
//! ## 搜索架构
//! 搜索文本（小写化）在 `set_threads` 阶段预计算并缓存。
//! 搜索时使用 `memchr::memmem` SIMD 加速在缓存文本上执行子串匹配，
//! 并用 rayon 并行扫描所有线程，仅返回匹配的线程标识符列表。

use std::sync::RwLock;
use std::time::Instant;

use rayon::prelude::*;

use crate::models::thread::ThreadMap;

/// 线程历史缓存的默认有效期（秒）
///
/// 在此时间内重复调用 `get_chat_history` 将直接返回缓存数据，
/// 不再访问检查点存储。删除操作会显式使缓存失效。
const THREAD_CACHE_TTL_SECS: u64 = 30;

/// 会话级线程历史缓存
///
/// 由编排层（`ChatHistoryHandler`）构造并持有，每个会话一个实例。
pub struct HistoryCache {
    /// 线程历史缓存：存储最近一次组装的结果和组装时间
    threads: RwLock<Option<ThreadCacheEntry>>,
}

/// 线程历史缓存条目
struct ThreadCacheEntry {
    /// 缓存的线程历史数据
    data: ThreadMap,
    /// 每个线程的小写化全文：(thread_id, 搜索文本)
    search_texts: Vec<(String, String)>,
    /// 缓存创建的时间点（用于 TTL 判断）
    cached_at: Instant,
}

impl HistoryCache {
    /// 创建新的空缓存实例
    pub fn new() -> Self {
        Self {
            threads: RwLock::new(None),
        }
    }

    /// 获取缓存的线程历史（如果缓存仍然有效）
    ///
    /// # 返回值
    /// - `Some(threads)` - 缓存在 TTL 内时返回缓存数据的克隆
    /// - `None` - 缓存不存在或已过期
    pub fn get_threads(&self) -> Option<ThreadMap> {
        let cache = self.threads.read().ok()?;
        let entry = cache.as_ref()?;

        // 检查缓存是否在 TTL 内
        if entry.cached_at.elapsed().as_secs() <= THREAD_CACHE_TTL_SECS {
            Some(entry.data.clone())
        } else {
            None
        }
    }

    /// 更新线程历史缓存
    ///
    /// 写入时为每个线程预计算小写化全文，供后续搜索使用。
    ///
    /// # 参数
    /// - `threads` - 新组装的线程历史
    pub fn set_threads(&self, threads: ThreadMap) {
        // 预计算搜索文本：线程内所有消息内容拼接后小写化
        let search_texts: Vec<(String, String)> = threads
            .iter()
            .map(|(thread_id, messages)| {
                let joined: Vec<&str> = messages.iter().map(|m| m.content.as_str()).collect();
                (thread_id.clone(), joined.join("\n").to_lowercase())
            })
            .collect();

        if let Ok(mut cache) = self.threads.write() {
            *cache = Some(ThreadCacheEntry {
                data: threads,
                search_texts,
                cached_at: Instant::now(),
            });
        }
    }

    /// 使线程历史缓存失效
    ///
    /// 在删除线程成功后由编排层调用，确保下次查询重新拉取存储
    pub fn invalidate(&self) {
        if let Ok(mut cache) = self.threads.write() {
            *cache = None;
        }
    }

    /// 在缓存的搜索文本上执行 SIMD 加速子串搜索
    ///
    /// 使用 `memchr::memmem::Finder` 在预计算的小写化全文上执行搜索，
    /// rayon 并行扫描所有线程。
    ///
    /// # 参数
    /// - `query` - 搜索查询词（将被小写化）
    ///
    /// # 返回值
    /// - `Some(thread_ids)` - 匹配的线程标识符列表
    /// - `None` - 缓存中没有数据（调用方应先填充缓存）
    pub fn search(&self, query: &str) -> Option<Vec<String>> {
        let cache = self.threads.read().ok()?;
        let entry = cache.as_ref()?;

        // 将查询词小写化（搜索文本已预计算为小写）
        let needle = query.to_lowercase();
        let finder = memchr::memmem::Finder::new(needle.as_bytes());

        let results: Vec<String> = entry
            .search_texts
            .par_iter()
            .filter(|(_, text)| finder.find(text.as_bytes()).is_some())
            .map(|(thread_id, _)| thread_id.clone())
            .collect();

        Some(results)
    }
}

impl Default for HistoryCache {
    fn default() -> Self {
        Self::new()
    }
}
