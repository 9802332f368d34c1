//! # 通用工具模块
//!
//! - `path` - 配置目录路径定位

pub mod path;
