use crate::error::{CatalogExportError, Result};
use catalog_export_common::CurrencyMode;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 画像1枚あたりの取得タイムアウト（秒）
    pub fetch_timeout_seconds: u64,
    /// 画像の最大バイト数
    pub max_image_bytes: u64,
    /// 同時取得数
    pub fetch_concurrency: usize,
    /// 埋め込み前に縮小する最大辺（px）
    pub thumbnail_edge_px: u32,
    /// 既定の通貨モード (usd/eur/both)
    pub default_currency: String,
    pub title: String,
    pub subtitle: String,
    /// フッター左
    pub source_label: String,
    /// フッター中央
    pub reference_label: String,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_config()
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default_config())
        }
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| CatalogExportError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("catalog-export").join("config.json"))
    }

    fn default_config() -> Self {
        Self {
            fetch_timeout_seconds: 10,
            max_image_bytes: 5 * 1024 * 1024,
            fetch_concurrency: 4,
            thumbnail_edge_px: 240,
            default_currency: "usd".into(),
            title: "OLIVOS 2025 PRODUCT LIST".into(),
            subtitle: "Soap & Skincare - Worldwide Export".into(),
            source_label: "olivos catalog".into(),
            reference_label: "export@olivos.com".into(),
        }
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_seconds.max(1))
    }

    pub fn currency_mode(&self) -> Result<CurrencyMode> {
        self.default_currency
            .parse()
            .map_err(CatalogExportError::InvalidCurrency)
    }
}
