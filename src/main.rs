//! # Checkpoint Chat Reader - 命令行入口
//!
//! 本文件是应用的原生入口点，仅负责日志初始化、配置加载和子命令分发，
//! 核心逻辑位于库中，以便聊天前端和命令行共享同一套实现。

use checkpoint_chat_reader::handler::ChatHistoryHandler;
use checkpoint_chat_reader::models::settings::StoreSettings;
use checkpoint_chat_reader::models::thread;
use checkpoint_chat_reader::services::export::ExportFormat;

/// 子命令用法说明
const USAGE: &str = "用法:
  checkpoint-chat-reader [list]            列出全部线程
  checkpoint-chat-reader show <thread_id>  显示指定线程的对话
  checkpoint-chat-reader search <关键词>    搜索包含关键词的线程
  checkpoint-chat-reader export <thread_id> [markdown|json]
                                           导出指定线程（默认 markdown）
  checkpoint-chat-reader delete <thread_id> 删除指定线程的全部记录";

/// 应用程序主入口函数
///
/// 核心是同步纯变换，只有存储 I/O 需要挂起，使用单线程运行时即可。
#[tokio::main(flavor = "current_thread")]
async fn main() {
    // 日志初始化：输出到 stderr，默认 info 级别（RUST_LOG 可覆盖）
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .init();

    if let Err(message) = run().await {
        eprintln!("{}", message);
        std::process::exit(1);
    }
}

/// 加载配置、构造处理器并分发子命令
async fn run() -> Result<(), String> {
    let args: Vec<String> = std::env::args().skip(1).collect();

    let settings = StoreSettings::load().await?;
    let handler = ChatHistoryHandler::new(&settings)?;

    match args.first().map(String::as_str) {
        None | Some("list") => list_threads(&handler).await,
        Some("show") => {
            let thread_id = require_arg(&args, 1)?;
            show_thread(&handler, thread_id).await
        }
        Some("search") => {
            let query = require_arg(&args, 1)?;
            search_threads(&handler, query).await
        }
        Some("export") => {
            let thread_id = require_arg(&args, 1)?;
            let format = match args.get(2) {
                Some(name) => {
                    ExportFormat::parse(name).ok_or_else(|| format!("未知导出格式: {}", name))?
                }
                None => ExportFormat::Markdown,
            };
            export_thread(&handler, thread_id, format).await
        }
        Some("delete") => {
            let thread_id = require_arg(&args, 1)?;
            delete_thread(&handler, thread_id).await
        }
        Some(other) => Err(format!("未知子命令: {}\n\n{}", other, USAGE)),
    }
}

/// 取出必需的位置参数，缺失时返回用法说明
fn require_arg(args: &[String], index: usize) -> Result<&str, String> {
    args.get(index)
        .map(String::as_str)
        .ok_or_else(|| format!("缺少参数\n\n{}", USAGE))
}

/// 列出全部线程及其预览标题
async fn list_threads(handler: &ChatHistoryHandler) -> Result<(), String> {
    let threads = handler.get_chat_history().await;

    if threads.is_empty() {
        println!("没有聊天记录");
        return Ok(());
    }

    // 按线程标识符排序，保证输出稳定
    let mut entries: Vec<_> = threads.iter().collect();
    entries.sort_by_key(|(thread_id, _)| thread_id.as_str());

    for (thread_id, messages) in entries {
        println!("{}  {}", thread_id, thread::thread_preview(messages));
    }

    Ok(())
}

/// 打印指定线程的对话内容
async fn show_thread(handler: &ChatHistoryHandler, thread_id: &str) -> Result<(), String> {
    let messages = handler
        .thread_messages(thread_id)
        .await
        .ok_or_else(|| format!("线程不存在: {}", thread_id))?;

    for message in messages {
        println!("[{}] {}", message.role.label(), message.content);
    }

    Ok(())
}

/// 搜索包含关键词的线程
async fn search_threads(handler: &ChatHistoryHandler, query: &str) -> Result<(), String> {
    let hits = handler.search_threads(query).await;

    if hits.is_empty() {
        println!("没有匹配的线程");
        return Ok(());
    }

    for thread_id in hits {
        println!("{}", thread_id);
    }

    Ok(())
}

/// 导出指定线程到标准输出
async fn export_thread(
    handler: &ChatHistoryHandler,
    thread_id: &str,
    format: ExportFormat,
) -> Result<(), String> {
    let document = handler
        .export_thread(thread_id, format)
        .await
        .ok_or_else(|| format!("线程不存在: {}", thread_id))?;

    println!("{}", document);
    Ok(())
}

/// 删除指定线程的全部记录
async fn delete_thread(handler: &ChatHistoryHandler, thread_id: &str) -> Result<(), String> {
    if handler.delete_thread(thread_id).await {
        println!("已删除线程: {}", thread_id);
        Ok(())
    } else {
        Err(format!("删除线程失败: {}", thread_id))
    }
}
