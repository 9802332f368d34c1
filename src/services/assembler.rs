//! # 历史组装器
//!
//! 将整批检查点记录折叠为按线程分组的对话历史。
//!
//! ## 组装流程
//! 1. **并行 map**：使用 rayon 对每条记录独立执行解码 + 提取
//!    （`checkpoint` 和 `metadata` 两个字段各解码一次，逐个送入提取器）
//! 2. **顺序 reduce**：按存储返回的记录顺序合并结果，
//!    同一 `thread_id` 的消息按记录处理顺序拼接
//!
//! 组装阶段不做去重：同一线程的多条记录合法地重复携带相同的存活交换，
//! 去重推迟到选取展示时（见 `models::thread::dedup_messages`）。
//!
//! ## 容错策略
//! 单条记录的任何问题（缺少 `thread_id`、载荷无法解码、提取结果为空）
//! 只影响该记录自身：记一条诊断日志后跳过，绝不中断其余记录的处理。

use rayon::prelude::*;

use crate::models::message::{CheckpointRecord, DialogueMessage};
use crate::models::thread::ThreadMap;
use crate::services::{decoder, extractor};

/// 将检查点记录批次组装为线程历史
///
/// # 参数
/// - `records` - 本次会话从存储拉取的全部记录（只读快照）
///
/// # 返回值
/// 线程标识符 → 对话消息列表的映射；
/// 每个线程的消息顺序反映记录在批次中的顺序
pub fn assemble_history(records: &[CheckpointRecord]) -> ThreadMap {
    // ---- 阶段 1：并行 map，每条记录独立解码 + 提取（纯函数，无共享状态）----
    let per_record: Vec<Option<(String, Vec<DialogueMessage>)>> = records
        .par_iter()
        .map(extract_record_messages)
        .collect();

    // ---- 阶段 2：顺序 reduce，保持存储返回的记录顺序 ----
    let mut threads = ThreadMap::new();
    for extracted in per_record {
        let Some((thread_id, messages)) = extracted else {
            continue;
        };
        if messages.is_empty() {
            continue;
        }
        threads.entry(thread_id).or_default().extend(messages);
    }

    threads
}

/// 处理单条记录：解码两个载荷字段并提取对话消息
///
/// `checkpoint` 派生的消息排在 `metadata` 派生的消息之前。
///
/// # 参数
/// - `record` - 一条检查点记录
///
/// # 返回值
/// - `Some((thread_id, messages))` - 记录可归属到线程（messages 可能为空）
/// - `None` - 记录缺少可用的 `thread_id`，已跳过
fn extract_record_messages(record: &CheckpointRecord) -> Option<(String, Vec<DialogueMessage>)> {
    let thread_id = match record.thread_id.as_deref().map(str::trim) {
        Some(id) if !id.is_empty() => id.to_string(),
        _ => {
            log::debug!("跳过缺少 thread_id 的检查点记录");
            return None;
        }
    };

    let mut messages = Vec::new();

    // 两个载荷字段独立解码，固定顺序：checkpoint 在前，metadata 在后
    for (field_name, field) in [
        ("checkpoint", &record.checkpoint),
        ("metadata", &record.metadata),
    ] {
        if field.is_null() {
            continue;
        }
        match decoder::decode_record_field(field) {
            Some(payload) => messages.extend(extractor::extract_last_exchange(&payload)),
            // 非空字段解码失败：按「无可用数据」处理，仅记诊断日志
            None => log::warn!("记录 {} 的 {} 字段无法解码，已跳过该字段", thread_id, field_name),
        }
    }

    Some((thread_id, messages))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    /// 构造携带一组用户/助手交换的检查点载荷
    fn exchange_payload(user: &str, assistant: &str) -> Value {
        json!({
            "channel_values": {
                "messages": [
                    {
                        "id": ["langchain", "schema", "messages", "HumanMessage"],
                        "kwargs": { "content": user }
                    },
                    {
                        "id": ["langchain", "schema", "messages", "AIMessage"],
                        "kwargs": { "content": assistant }
                    }
                ]
            }
        })
    }

    fn record(thread_id: Option<&str>, checkpoint: Value, metadata: Value) -> CheckpointRecord {
        CheckpointRecord {
            thread_id: thread_id.map(String::from),
            checkpoint,
            metadata,
        }
    }

    #[test]
    fn test_records_of_one_thread_concatenate_in_batch_order() {
        let records = vec![
            record(
                Some("t-1"),
                exchange_payload("第一轮提问", "Here is the full answer for round one"),
                Value::Null,
            ),
            record(
                Some("t-1"),
                exchange_payload("第二轮提问", "Here is the full answer for round two"),
                Value::Null,
            ),
        ];

        let threads = assemble_history(&records);

        let messages = &threads["t-1"];
        assert_eq!(messages.len(), 4);
        assert_eq!(messages[0].content, "第一轮提问");
        assert_eq!(messages[2].content, "第二轮提问");
    }

    #[test]
    fn test_checkpoint_messages_precede_metadata_messages() {
        let records = vec![record(
            Some("t-1"),
            exchange_payload("checkpoint 里的提问", "A full answer from the checkpoint field"),
            exchange_payload("metadata 里的提问", "A full answer from the metadata field"),
        )];

        let threads = assemble_history(&records);

        let messages = &threads["t-1"];
        assert_eq!(messages.len(), 4);
        assert_eq!(messages[0].content, "checkpoint 里的提问");
        assert_eq!(messages[2].content, "metadata 里的提问");
    }

    #[test]
    fn test_record_without_thread_id_is_skipped() {
        let records = vec![
            record(None, exchange_payload("无主提问", "An answer with no owning thread"), Value::Null),
            record(Some("  "), exchange_payload("空白线程", "An answer on a blank thread id"), Value::Null),
            record(Some("t-2"), exchange_payload("正常提问", "An answer on a usable thread id"), Value::Null),
        ];

        let threads = assemble_history(&records);

        assert_eq!(threads.len(), 1);
        assert!(threads.contains_key("t-2"));
    }

    #[test]
    fn test_undecodable_record_never_aborts_the_batch() {
        let records = vec![
            // 非法十六进制载荷：解码失败，字段被跳过
            record(Some("t-bad"), json!("\\xzzzz"), Value::Null),
            record(Some("t-ok"), exchange_payload("有效提问", "A full answer on the valid record"), Value::Null),
        ];

        let threads = assemble_history(&records);

        assert!(!threads.contains_key("t-bad"));
        assert_eq!(threads["t-ok"].len(), 2);
    }

    #[test]
    fn test_hex_encoded_checkpoint_flows_through() {
        // 模拟 bytea 文本输出：\x 前缀的十六进制 JSON
        let plaintext =
            exchange_payload("十六进制提问", "A full answer from the hex payload").to_string();
        let encoded = Value::String(format!("\\x{}", hex::encode(&plaintext)));

        let threads = assemble_history(&[record(Some("t-hex"), encoded, Value::Null)]);

        assert_eq!(threads["t-hex"].len(), 2);
        assert_eq!(threads["t-hex"][0].content, "十六进制提问");
    }
}
