//! # 对话提取器
//!
//! 从解码后的检查点载荷中提取语义上有意义的最后一组用户/助手交换，
//! 与聊天前端的渲染预期完全等价，但利用 Rust 原生性能。
//!
//! LangGraph 框架写入的 `channel_values.messages` 序列混杂了真实对话轮次
//! 和内部簿记消息（reducer 状态转储、检索步骤注入的文献片段、简短确认语）。
//! 提取过程按以下优先级过滤：
//! 1. 缺少 `kwargs.content` 或去除空白后为空 → 跳过
//! 2. 通用噪声规则（与角色无关）→ 跳过
//! 3. 角色判定：类型标记含 HumanMessage → 用户，否则 → 助手
//! 4. 助手专属噪声规则（确认语 / 处理中提示 / 过短回复）→ 跳过
//! 5. 存活候选覆盖对应的滚动槽位（last-write-wins，而非列表累积）
//!
//! 每条过滤规则都是独立命名的谓词函数，可单独测试——
//! 规则集合是整个核心里最脆弱也最有价值的部分，禁止内联。

use serde_json::Value;

use crate::models::message::{DecodedPayload, DialogueMessage};

/// 检索增强注入的文献片段标记
///
/// 内容（小写化后）包含任一子串的消息是学术引用噪声而非真实对话。
const BIBLIOGRAPHIC_MARKERS: &[&str] = &["journal", "research", "disabilities", "doi", "isbn"];

/// reducer 内部状态转储的前缀标记
const REDUCER_STATE_PREFIX: &str = "reduce";

/// 助手内部确认语的前缀标记
const ACKNOWLEDGMENT_PREFIX: &str = "Understood";

/// 助手处理中提示的子串标记（小写化后匹配）
const PROCESSING_MARKER: &str = "processing";

/// 助手回复的最小词数：低于该阈值的回复是内部短确认，不面向用户
const MIN_REPLY_TOKENS: usize = 4;

/// 人类消息的类型标记：框架序列化构造器路径的类名
const HUMAN_MESSAGE_MARKER: &str = "HumanMessage";

/// 通用噪声判定（对任何角色的候选内容都生效）
///
/// 命中条件：
/// - 以 `reduce` 字面前缀开头（reducer 状态转储）
/// - 小写化后包含任一文献片段标记（检索步骤注入的书目内容）
///
/// # 参数
/// - `content` - 候选消息的文本内容
///
/// # 返回值
/// 属于噪声返回 true
pub fn is_noise_content(content: &str) -> bool {
    if content.starts_with(REDUCER_STATE_PREFIX) {
        return true;
    }

    let lowered = content.to_lowercase();
    BIBLIOGRAPHIC_MARKERS
        .iter()
        .any(|marker| lowered.contains(marker))
}

/// 助手专属噪声判定（仅对助手候选生效）
///
/// 命中条件：
/// - 以 `Understood` 字面前缀开头
/// - 小写化后包含 `processing`
/// - 按空白切分后不足 4 个词
///
/// 这些都是代理流程中的内部短确认，不是面向用户的回复。
///
/// # 参数
/// - `content` - 助手候选消息的文本内容
///
/// # 返回值
/// 属于内部确认语返回 true
pub fn is_acknowledgment_reply(content: &str) -> bool {
    if content.starts_with(ACKNOWLEDGMENT_PREFIX) {
        return true;
    }

    if content.to_lowercase().contains(PROCESSING_MARKER) {
        return true;
    }

    content.split_whitespace().count() < MIN_REPLY_TOKENS
}

/// 判定信封是否为人类撰写的对话轮次
///
/// 框架把消息序列化为构造器形式，`id` 字段是类路径数组
/// （如 `["langchain", "schema", "messages", "HumanMessage"]`）。
/// 优先检查类路径；历史版本曾把类名写在其他位置，
/// 因此保留对序列化全文的子串回退检查。
///
/// # 参数
/// - `envelope` - 消息信封的原始 Value
///
/// # 返回值
/// 人类消息返回 true；其余（AI、系统、工具等）按助手处理
pub fn is_human_envelope(envelope: &Value) -> bool {
    if let Some(parts) = envelope.get("id").and_then(Value::as_array) {
        if parts
            .iter()
            .filter_map(Value::as_str)
            .any(|part| part.contains(HUMAN_MESSAGE_MARKER))
        {
            return true;
        }
    }

    // 回退：在序列化全文上做子串检查
    envelope.to_string().contains(HUMAN_MESSAGE_MARKER)
}

/// 提取信封中的文本内容
///
/// 读取 `kwargs.content` 标量；字段缺失或不是字符串时返回 `None`。
fn envelope_content(envelope: &Value) -> Option<&str> {
    envelope
        .get("kwargs")
        .and_then(|kwargs| kwargs.get("content"))
        .and_then(Value::as_str)
}

/// 最后交换的滚动槽位累加器
///
/// 两个可选槽位分别保存最近一条存活的用户消息和助手消息。
/// 这是一次 last-write-wins 归约：遍历结束时只有每个角色
/// 最后一条合格消息存活。
#[derive(Default)]
struct ExchangeSlots {
    /// 最近一条存活的用户消息
    last_user: Option<DialogueMessage>,
    /// 最近一条存活的助手消息
    last_assistant: Option<DialogueMessage>,
}

impl ExchangeSlots {
    /// 观察一个信封，按过滤优先级决定是否覆盖槽位
    fn observe(&mut self, envelope: &Value) {
        // P1：内容缺失或为空白 → 跳过
        let Some(content) = envelope_content(envelope) else {
            return;
        };
        if content.trim().is_empty() {
            return;
        }

        // P2：通用噪声规则（与角色无关）
        if is_noise_content(content) {
            return;
        }

        // P3：角色判定 + P4：助手专属噪声规则
        if is_human_envelope(envelope) {
            self.last_user = Some(DialogueMessage::user(content));
        } else if !is_acknowledgment_reply(content) {
            self.last_assistant = Some(DialogueMessage::assistant(content));
        }
    }

    /// 按固定顺序输出槽位内容：用户在前，助手在后
    ///
    /// 输出顺序与两者在原序列中的相对位置无关。
    fn into_messages(self) -> Vec<DialogueMessage> {
        let mut messages = Vec::with_capacity(2);
        if let Some(user) = self.last_user {
            messages.push(user);
        }
        if let Some(assistant) = self.last_assistant {
            messages.push(assistant);
        }
        messages
    }
}

/// 提取载荷中最后一组有意义的用户/助手交换
///
/// 纯函数：无副作用，相同输入必然产生相同输出。
///
/// # 参数
/// - `payload` - 解码后的检查点载荷
///
/// # 返回值
/// 0、1 或 2 条对话消息；载荷缺少 `channel_values.messages`
/// 序列时返回空 Vec
pub fn extract_last_exchange(payload: &DecodedPayload) -> Vec<DialogueMessage> {
    let envelopes = payload
        .get("channel_values")
        .and_then(|channels| channels.get("messages"))
        .and_then(Value::as_array);

    let Some(envelopes) = envelopes else {
        return vec![];
    };

    let mut slots = ExchangeSlots::default();
    for envelope in envelopes {
        slots.observe(envelope);
    }

    slots.into_messages()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::message::Role;
    use serde_json::json;

    /// 构造一个人类消息信封
    fn human(content: &str) -> Value {
        json!({
            "lc": 1,
            "type": "constructor",
            "id": ["langchain", "schema", "messages", "HumanMessage"],
            "kwargs": { "content": content }
        })
    }

    /// 构造一个 AI 消息信封
    fn ai(content: &str) -> Value {
        json!({
            "lc": 1,
            "type": "constructor",
            "id": ["langchain", "schema", "messages", "AIMessage"],
            "kwargs": { "content": content }
        })
    }

    /// 把信封序列包装成检查点载荷结构
    fn payload(envelopes: Vec<Value>) -> Value {
        json!({ "channel_values": { "messages": envelopes } })
    }

    #[test]
    fn test_payload_without_messages_yields_empty() {
        assert!(extract_last_exchange(&json!({})).is_empty());
        assert!(extract_last_exchange(&json!({ "channel_values": {} })).is_empty());
        assert!(extract_last_exchange(&json!({ "channel_values": { "messages": 7 } })).is_empty());
    }

    #[test]
    fn test_reducer_dump_is_dropped_not_emitted() {
        let result = extract_last_exchange(&payload(vec![
            human("reduce: internal state"),
            human("Hello, how are you?"),
            ai("I'm doing well, thank you for asking!"),
        ]));

        assert_eq!(result.len(), 2);
        assert_eq!(result[0].role, Role::User);
        assert_eq!(result[0].content, "Hello, how are you?");
        assert_eq!(result[1].role, Role::Assistant);
        assert_eq!(result[1].content, "I'm doing well, thank you for asking!");
    }

    #[test]
    fn test_acknowledgment_reply_superseded_by_real_reply() {
        let result = extract_last_exchange(&payload(vec![
            ai("Understood, processing your request"),
            ai("Here is a detailed answer to your question"),
        ]));

        assert_eq!(result.len(), 1);
        assert_eq!(result[0].role, Role::Assistant);
        assert_eq!(result[0].content, "Here is a detailed answer to your question");
    }

    #[test]
    fn test_short_assistant_reply_is_dropped() {
        // 3 个词不足最小词数阈值
        let result = extract_last_exchange(&payload(vec![ai("Okay will do")]));

        assert!(result.is_empty());
    }

    #[test]
    fn test_two_user_messages_yield_only_last_user() {
        let result = extract_last_exchange(&payload(vec![
            human("第一条消息"),
            human("第二条消息"),
        ]));

        assert_eq!(result.len(), 1);
        assert_eq!(result[0].role, Role::User);
        assert_eq!(result[0].content, "第二条消息");
    }

    #[test]
    fn test_bibliographic_fragment_dropped_for_any_role() {
        let result = extract_last_exchange(&payload(vec![
            human("See DOI: 10.1234/x for details"),
            ai("Reference entry from the Journal of Medicine archive"),
        ]));

        assert!(result.is_empty());
    }

    #[test]
    fn test_user_emitted_before_assistant_regardless_of_position() {
        // 助手消息在序列中先于用户消息出现，输出顺序仍固定为用户在前
        let result = extract_last_exchange(&payload(vec![
            ai("Here is a detailed answer to your question"),
            human("What was that again?"),
        ]));

        assert_eq!(result.len(), 2);
        assert_eq!(result[0].role, Role::User);
        assert_eq!(result[1].role, Role::Assistant);
    }

    #[test]
    fn test_blank_and_missing_content_skipped() {
        let mut no_kwargs = json!({ "id": ["langchain", "schema", "messages", "HumanMessage"] });
        no_kwargs["kwargs"] = json!({});

        let result = extract_last_exchange(&payload(vec![
            no_kwargs,
            human("   "),
            human("有效的用户输入"),
        ]));

        assert_eq!(result.len(), 1);
        assert_eq!(result[0].content, "有效的用户输入");
    }

    #[test]
    fn test_extraction_is_deterministic() {
        let input = payload(vec![
            human("Hello, how are you?"),
            ai("I'm doing well, thank you for asking!"),
        ]);

        assert_eq!(extract_last_exchange(&input), extract_last_exchange(&input));
    }

    #[test]
    fn test_noise_predicates_individually() {
        assert!(is_noise_content("reduce: {\"count\": 3}"));
        assert!(is_noise_content("Published in the International Journal of X"));
        assert!(is_noise_content("ISBN 978-0-00-000000-0"));
        assert!(!is_noise_content("Hello, how are you?"));

        assert!(is_acknowledgment_reply("Understood, working on it now"));
        assert!(is_acknowledgment_reply("Your request is PROCESSING right now"));
        assert!(is_acknowledgment_reply("ok"));
        assert!(!is_acknowledgment_reply("Here is a detailed answer to your question"));
    }

    #[test]
    fn test_human_marker_fallback_on_serialized_form() {
        // 历史版本把类名写在 type 字段里，回退检查应仍判定为用户
        let legacy = json!({
            "type": "HumanMessage",
            "kwargs": { "content": "旧格式的用户消息" }
        });

        assert!(is_human_envelope(&legacy));
    }
}
