//! # Checkpoint Chat Reader - 核心库
//!
//! 从外部检查点存储（Supabase `checkpoints` 表）中重建可读的聊天历史。
//! 存储由 LangGraph 风格的代理框架写入，同一载荷列在历史上出现过多种
//! 编码方式（原生 JSON、`\x` 前缀十六进制、字节缓冲区），且消息序列
//! 混杂了真实对话轮次和内部簿记消息。
//!
//! ## 核心流程
//! 1. `services::store` 拉取全部检查点记录（只读快照）
//! 2. `services::decoder` 把每条记录的 `checkpoint` / `metadata` 字段
//!    归一化为嵌套结构（解码失败 → 无数据，从不抛出）
//! 3. `services::extractor` 从载荷中过滤噪声并提取最后一组用户/助手交换
//! 4. `services::assembler` 把逐条结果折叠为按线程分组的历史
//! 5. `handler::ChatHistoryHandler` 聚合以上各层并持有会话缓存
//!
//! ## 模块结构
//! - `handler` - 对外接口层（历史获取、搜索、导出、删除）
//! - `models` - 数据模型（记录、消息、线程、配置）
//! - `services` - 核心业务逻辑（解码、提取、组装、存储、缓存、导出）
//! - `utils` - 通用工具函数

pub mod handler;
pub mod models;
pub mod services;
pub mod utils;
