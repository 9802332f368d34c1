//! # 线程导出服务
//!
//! 将一个线程的对话消息导出为 Markdown 或 JSON 格式的字符串。
//!
//! ## 导出策略
//! - **Markdown**：每条消息一个角色小节，适合阅读和归档
//! - **JSON**：保留 `{role, content}` 结构，美化输出，适合二次处理

use crate::models::message::DialogueMessage;

/// 导出格式枚举
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// Markdown 文档
    Markdown,
    /// 美化 JSON
    Json,
}

impl ExportFormat {
    /// 从命令行参数解析导出格式
    ///
    /// # 返回值
    /// - `Some(format)` - 识别的格式名（"markdown" / "md" / "json"）
    /// - `None` - 无法识别
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "markdown" | "md" => Some(ExportFormat::Markdown),
            "json" => Some(ExportFormat::Json),
            _ => None,
        }
    }
}

/// 将线程消息导出为 Markdown 格式字符串
///
/// 生成结构化的 Markdown 文档，包含线程标题和每条消息的角色小节。
///
/// # 参数
/// - `title` - 线程标题（通常取第一条用户消息的预览）
/// - `messages` - 去重后的对话消息列表
///
/// # 返回值
/// Markdown 格式的字符串
pub fn to_markdown(title: &str, messages: &[DialogueMessage]) -> String {
    let mut lines: Vec<String> = Vec::new();

    // 文档标题
    lines.push(format!("# {}", title));
    lines.push(String::new());

    // 导出时间：使用 SystemTime 计算 UTC 时间，避免依赖 chrono
    let now = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();
    lines.push(format!("导出时间: (UTC epoch: {})", now));
    lines.push(String::new());
    lines.push("---".into());
    lines.push(String::new());

    for message in messages {
        lines.push(format!("## {}", message.role.label()));
        lines.push(String::new());
        lines.push(message.content.clone());
        lines.push(String::new());
        lines.push("---".into());
        lines.push(String::new());
    }

    lines.join("\n")
}

/// 将线程消息导出为 JSON 格式字符串
///
/// 直接将消息数组序列化为美化的 JSON 字符串（2 空格缩进）。
///
/// # 参数
/// - `messages` - 去重后的对话消息列表
///
/// # 返回值
/// 美化后的 JSON 字符串
pub fn to_json(messages: &[DialogueMessage]) -> String {
    serde_json::to_string_pretty(messages).unwrap_or_else(|_| "[]".to_string())
}
