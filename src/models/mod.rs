//! # 数据模型模块
//!
//! 定义整个应用的核心数据结构。
//! - `message` - 检查点记录和对话消息的数据结构
//! - `thread` - 线程映射类型与选取辅助函数（去重、预览）
//! - `settings` - 检查点存储连接配置的数据结构与加载

pub mod message;
pub mod settings;
pub mod thread;
