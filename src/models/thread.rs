//! # 线程数据模型与选取辅助函数
//!
//! 一个线程（Thread）代表一段完整的对话，由不透明的 `thread_id` 标识，
//! 可能横跨存储中的多条检查点记录。本模块定义线程映射类型，
//! 以及前端选中线程时使用的去重和预览辅助函数。

use std::collections::{HashMap, HashSet};

use crate::models::message::{DialogueMessage, Role};

/// 线程映射：线程标识符 → 按记录处理顺序排列的对话消息列表
///
/// 注意：列表顺序反映存储返回记录的处理顺序，而非保证的时间戳顺序。
pub type ThreadMap = HashMap<String, Vec<DialogueMessage>>;

/// 无用户消息线程的默认标题
pub const DEFAULT_THREAD_TITLE: &str = "新对话";

/// 线程预览文本的最大字符数
const PREVIEW_MAX_CHARS: usize = 50;

/// 获取线程中的第一条用户消息文本
///
/// 用于侧边栏线程列表的标题展示。
///
/// # 参数
/// - `messages` - 线程的对话消息列表
///
/// # 返回值
/// 第一条用户消息的内容；线程中没有用户消息时返回 `None`
pub fn first_user_message(messages: &[DialogueMessage]) -> Option<&str> {
    messages
        .iter()
        .find(|msg| msg.role == Role::User)
        .map(|msg| msg.content.as_str())
}

/// 生成线程的预览标题
///
/// 取第一条用户消息，超过 50 个字符时截断并追加省略号。
/// 按字符而非字节截断，保证多字节文本不会被截成非法 UTF-8。
///
/// # 参数
/// - `messages` - 线程的对话消息列表
///
/// # 返回值
/// 预览标题字符串；没有用户消息时返回默认标题
pub fn thread_preview(messages: &[DialogueMessage]) -> String {
    let first = first_user_message(messages).unwrap_or(DEFAULT_THREAD_TITLE);

    if first.chars().count() > PREVIEW_MAX_CHARS {
        let truncated: String = first.chars().take(PREVIEW_MAX_CHARS).collect();
        format!("{}...", truncated)
    } else {
        first.to_string()
    }
}

/// 选取线程时的消息去重
///
/// 同一线程的多条检查点记录会重复携带相同的存活对话对，
/// 历史组装阶段按原样拼接，仅在选取展示时按「角色 + 内容」精确匹配去重。
/// 去重保持首次出现的顺序。
///
/// # 参数
/// - `messages` - 线程的原始对话消息列表
///
/// # 返回值
/// 去重后的对话消息列表
pub fn dedup_messages(messages: &[DialogueMessage]) -> Vec<DialogueMessage> {
    let mut seen: HashSet<(Role, &str)> = HashSet::new();
    let mut cleaned = Vec::with_capacity(messages.len());

    for message in messages {
        // 首次出现的 (角色, 内容) 组合保留，其余丢弃
        if seen.insert((message.role, message.content.as_str())) {
            cleaned.push(message.clone());
        }
    }

    cleaned
}
