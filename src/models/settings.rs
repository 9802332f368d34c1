//! # 存储连接配置数据模型
//!
//! 定义检查点存储（Supabase）的连接配置结构体及其加载逻辑。
//! 配置存储在 CKR 自身的配置目录中（`~/.mo/CKR/store-config.json`），
//! 与聊天服务端的部署配置分离；环境变量可以覆盖文件配置，便于临时切换实例。

use serde::{Deserialize, Serialize};

use crate::utils::path;

/// 配置文件名：位于 `~/.mo/CKR/` 目录下
pub const SETTINGS_FILE_NAME: &str = "store-config.json";

/// 检查点表的默认表名
fn default_table() -> String {
    "checkpoints".to_string()
}

/// 检查点存储连接配置
///
/// 对应 `~/.mo/CKR/store-config.json` 文件内容：
/// ```json
/// {
///   "url": "https://xxxx.supabase.co",
///   "apiKey": "service-role-key",
///   "table": "checkpoints"
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreSettings {
    /// Supabase 项目地址（不含 `/rest/v1` 路径部分）
    pub url: String,

    /// API 密钥：同时用于 `apikey` 请求头和 Bearer 授权
    pub api_key: String,

    /// 检查点表名：缺省为 `checkpoints`
    #[serde(default = "default_table")]
    pub table: String,
}

impl StoreSettings {
    /// 加载存储连接配置
    ///
    /// 加载顺序：
    /// 1. 环境变量 `SUPABASE_URL` + `SUPABASE_KEY`（`SUPABASE_TABLE` 可选）
    /// 2. 配置文件 `~/.mo/CKR/store-config.json`
    ///
    /// # 返回值
    /// 解析后的 StoreSettings
    ///
    /// # 错误
    /// 环境变量未设置且配置文件不存在、不可读或 JSON 解析失败时返回错误
    pub async fn load() -> Result<Self, String> {
        // 环境变量优先，便于在部署环境中免配置文件运行
        if let (Ok(url), Ok(api_key)) =
            (std::env::var("SUPABASE_URL"), std::env::var("SUPABASE_KEY"))
        {
            let table = std::env::var("SUPABASE_TABLE").unwrap_or_else(|_| default_table());
            return Ok(Self { url, api_key, table });
        }

        let config_path = path::get_ckr_config_path()?.join(SETTINGS_FILE_NAME);

        if !config_path.exists() {
            return Err(format!(
                "未找到存储配置文件: {}，请创建该文件或设置 SUPABASE_URL / SUPABASE_KEY 环境变量",
                config_path.display()
            ));
        }

        let content = tokio::fs::read_to_string(&config_path)
            .await
            .map_err(|e| format!("读取存储配置文件失败: {}", e))?;

        serde_json::from_str(&content).map_err(|e| format!("解析存储配置文件失败: {}", e))
    }
}
