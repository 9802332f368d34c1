//! # 业务逻辑服务模块
//!
//! 包含核心业务逻辑的实现，与对外接口层解耦：
//! - `decoder` - 检查点载荷解码：将表示方式未知的字段归一化为嵌套结构
//! - `extractor` - 对话提取器：从载荷中过滤噪声并提取最后一组用户/助手交换
//! - `assembler` - 历史组装器：将记录批次折叠为按线程分组的对话历史
//! - `store` - 检查点存储客户端：Supabase PostgREST 的拉取和删除
//! - `cache` - 内存缓存管理（线程历史 TTL 缓存和搜索文本）
//! - `export` - 线程导出服务：Markdown/JSON 格式导出

pub mod assembler;
pub mod cache;
pub mod decoder;
pub mod export;
pub mod extractor;
pub mod store;
