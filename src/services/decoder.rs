//! # 检查点载荷解码服务
//!
//! 将表示方式未知的检查点记录字段归一化为 `serde_json::Value` 嵌套结构。
//! 存储端的历史写入方式不统一，同一列可能出现四种线上表示：
//! - 原生 JSON 对象（直接返回，不再二次解析）
//! - `\x` 前缀的十六进制字符串（PostgreSQL bytea 的文本输出格式）
//! - 字节缓冲区（线上表示为 0..=255 的整数数组）
//! - 其他标量（字符串化后按 JSON 解析）
//!
//! ## 容错策略
//! 解码是全函数：任何失败（十六进制格式错误、非法 UTF-8、JSON 解析失败）
//! 均被就地吸收并返回 `None`，从不向调用方抛出。调用方必须把 `None`
//! 理解为「无可用数据」而非可重试的错误。解析失败的记录静默丢弃，
//! 与前端容错策略一致。

use serde_json::Value;

use crate::models::message::DecodedPayload;

/// 解码一个表示方式未知的记录字段
///
/// # 参数
/// - `field` - 记录的 `checkpoint` 或 `metadata` 字段原始值
///
/// # 返回值
/// - `Some(payload)` - 归一化后的嵌套结构
/// - `None` - 字段为空或无法解码
pub fn decode_record_field(field: &Value) -> Option<DecodedPayload> {
    match field {
        // 空字段：无数据
        Value::Null => None,

        // 已经是映射：原样返回，不做二次解析
        Value::Object(_) => Some(field.clone()),

        // 字符串：可能是 \x 前缀的十六进制，也可能直接是 JSON 文本
        Value::String(text) => decode_string_field(text),

        // 整数数组：按字节缓冲区处理（UTF-8 JSON 文本的逐字节形式）
        Value::Array(items) => {
            let text = byte_array_to_text(items)?;
            serde_json::from_str(&text).ok()
        }

        // 其他标量：字符串化后按 JSON 解析
        other => serde_json::from_str(&other.to_string()).ok(),
    }
}

/// 解码字符串形式的记录字段
///
/// `\x` 前缀（字面反斜杠 + x 两个字符）标记 bytea 的十六进制文本输出：
/// 去掉前缀后按十六进制数字对解码为字节，再按 UTF-8 → JSON 还原。
/// 无前缀的字符串直接按 JSON 文本解析。
///
/// # 参数
/// - `text` - 字段的字符串值
///
/// # 返回值
/// 解析成功时返回 `Some(payload)`；前缀后为空串、十六进制长度为奇数、
/// 含非法字符、字节不是合法 UTF-8 或文本不是合法 JSON 时返回 `None`
fn decode_string_field(text: &str) -> Option<DecodedPayload> {
    if let Some(hex_digits) = text.strip_prefix("\\x") {
        let bytes = hex::decode(hex_digits).ok()?;
        let decoded = String::from_utf8(bytes).ok()?;
        return serde_json::from_str(&decoded).ok();
    }

    serde_json::from_str(text).ok()
}

/// 将整数数组还原为 UTF-8 文本
///
/// 仅当所有元素都是 0..=255 的整数时才按字节缓冲区处理；
/// 混入其他类型或超范围数值的数组不是字节缓冲区，返回 `None`。
///
/// # 参数
/// - `items` - 字段的数组元素
///
/// # 返回值
/// 还原后的 UTF-8 文本；数组不是字节缓冲区或字节非法时返回 `None`
fn byte_array_to_text(items: &[Value]) -> Option<String> {
    let mut bytes = Vec::with_capacity(items.len());

    for item in items {
        let byte = item.as_u64().and_then(|n| u8::try_from(n).ok())?;
        bytes.push(byte);
    }

    String::from_utf8(bytes).ok()
}
