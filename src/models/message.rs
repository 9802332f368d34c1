//! # 消息与检查点记录数据模型
//!
//! 定义了检查点记录（CheckpointRecord）和对话消息（DialogueMessage）等 Rust 结构体，
//! 对应 Supabase `checkpoints` 表的行结构和聊天前端渲染的 `{role, content}` 消息对。
//!
//! 检查点载荷采用 `serde_json::Value` 处理 LangGraph 框架输出的动态结构，
//! 避免因框架版本升级调整内部字段而导致反序列化失败。

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// 检查点记录数据结构
///
/// 对应检查点存储（Supabase `checkpoints` 表）中的一行记录。
/// 每次会话获取时拉取只读快照，核心处理过程中从不回写。
///
/// 设计决策：
/// - `checkpoint` 和 `metadata` 两个载荷字段的线上表示不确定
///   （可能是原生 JSON 对象、`\x` 前缀的十六进制字符串、或字节缓冲区），
///   因此统一以 `serde_json::Value` 接收，由 `services::decoder` 负责归一化。
/// - 所有字段均带 `#[serde(default)]`：存储端返回的行缺少某列时不会导致
///   整个批次反序列化失败，缺失载荷以 `Null` 表示。
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CheckpointRecord {
    /// 线程标识符：不透明字符串，同一对话的多条记录共享同一个值
    #[serde(default)]
    pub thread_id: Option<String>,

    /// 检查点载荷：编码后的代理状态快照，表示方式未知
    #[serde(default)]
    pub checkpoint: Value,

    /// 元数据载荷：编码后的附属数据，表示方式未知
    #[serde(default)]
    pub metadata: Value,
}

/// 解码后的检查点载荷
///
/// `services::decoder` 的输出类型：由映射、序列和标量组成的嵌套结构，
/// 其中可能包含 `channel_values.messages` 消息信封序列。
pub type DecodedPayload = Value;

/// 对话角色枚举
///
/// 序列化为前端约定的小写字符串 `"user"` / `"assistant"`。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// 用户消息：由人类输入的对话轮次
    User,
    /// 助手消息：由代理生成的对话轮次
    Assistant,
}

impl Role {
    /// 返回角色的中文显示标签
    pub fn label(&self) -> &'static str {
        match self {
            Role::User => "用户",
            Role::Assistant => "助手",
        }
    }
}

/// 对话消息数据结构
///
/// 提取流程的规范输出单元，对应前端渲染的一条聊天气泡。
///
/// 不变式：`content` 去除首尾空白后非空
/// （`services::extractor` 在提取阶段保证该约束）。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DialogueMessage {
    /// 消息角色：user 或 assistant
    pub role: Role,

    /// 消息文本内容
    pub content: String,
}

impl DialogueMessage {
    /// 构造一条用户消息
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    /// 构造一条助手消息
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}
