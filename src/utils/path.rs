//! # 路径工具函数
//!
//! 提供配置目录定位功能。CKR 的配置数据独立存储在 `~/.mo/CKR/` 目录下，
//! 与聊天服务端的部署数据分离。

use std::path::PathBuf;

/// 获取 CKR 自身配置目录的绝对路径
///
/// 使用 `dirs` crate 获取跨平台的主目录路径。
///
/// # 返回值
/// 返回 `~/.mo/CKR/` 目录的绝对路径。
///
/// # 错误
/// 如果无法确定用户主目录（极端情况，如无 HOME 环境变量），返回错误信息。
pub fn get_ckr_config_path() -> Result<PathBuf, String> {
    let home = dirs::home_dir().ok_or_else(|| "无法获取用户主目录".to_string())?;
    Ok(home.join(".mo").join("CKR"))
}
