//! 商品画像の取得
//!
//! URL → ImagePayload。失敗はすべて `Absent` に落とし、呼び出し元へ伝播しない。
//! 1件の不良画像でPDF出力全体を止めないため。

mod payload;

pub use payload::{flatten_on_white, parse_data_url, to_data_url, EmbeddedImage, ImagePayload, PayloadError};

use crate::config::Config;
use crate::error::{CatalogExportError, Result};
use catalog_export_common::ImageFormatTag;
use reqwest::header::CONTENT_TYPE;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

/// 画像取得の抽象（テストではスタブに差し替える）
pub trait ImageFetcher: Send + Sync {
    fn fetch(&self, url: &str) -> impl Future<Output = ImagePayload> + Send;
}

/// 取得設定
#[derive(Debug, Clone)]
pub struct FetchSettings {
    pub timeout: Duration,
    pub max_bytes: u64,
    pub thumbnail_edge_px: u32,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            max_bytes: 5 * 1024 * 1024,
            thumbnail_edge_px: 240,
        }
    }
}

impl FetchSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            timeout: config.fetch_timeout(),
            max_bytes: config.max_image_bytes,
            thumbnail_edge_px: config.thumbnail_edge_px,
        }
    }
}

/// 取得失敗の内訳（ログ用）
#[derive(Error, Debug)]
pub enum FetchFailure {
    #[error("URLが不正: {0:?}")]
    InvalidUrl(String),

    #[error("タイムアウト")]
    Timeout,

    #[error("HTTPステータス {0}")]
    Status(u16),

    #[error("画像ではないContent-Type: {0:?}")]
    ContentType(String),

    #[error("サイズ超過: {size} bytes (上限 {limit} bytes)")]
    TooLarge { size: u64, limit: u64 },

    #[error("通信エラー: {0}")]
    Network(String),

    #[error("画像変換エラー: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for FetchFailure {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchFailure::Timeout
        } else {
            FetchFailure::Network(err.to_string())
        }
    }
}

/// HTTPで画像を取得する実装
pub struct HttpImageFetcher {
    client: reqwest::Client,
    settings: FetchSettings,
}

impl HttpImageFetcher {
    pub fn new(settings: FetchSettings) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(settings.timeout)
            .build()
            .map_err(|e| CatalogExportError::HttpClient(e.to_string()))?;
        Ok(Self { client, settings })
    }

    async fn try_fetch(&self, url: &str) -> std::result::Result<EmbeddedImage, FetchFailure> {
        let url = url.trim();
        if url.is_empty() {
            return Err(FetchFailure::InvalidUrl(url.to_string()));
        }
        let parsed = reqwest::Url::parse(url).map_err(|_| FetchFailure::InvalidUrl(url.to_string()))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(FetchFailure::InvalidUrl(url.to_string()));
        }

        let mut response = self.client.get(parsed).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchFailure::Status(status.as_u16()));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        if !content_type.trim().to_ascii_lowercase().starts_with("image/") {
            return Err(FetchFailure::ContentType(content_type));
        }

        let limit = self.settings.max_bytes;
        if let Some(length) = response.content_length() {
            if length > limit {
                return Err(FetchFailure::TooLarge { size: length, limit });
            }
        }

        // Content-Length がなくても上限を守るためチャンク単位で読む
        let mut body: Vec<u8> = Vec::new();
        while let Some(chunk) = response.chunk().await? {
            let size = (body.len() + chunk.len()) as u64;
            if size > limit {
                return Err(FetchFailure::TooLarge { size, limit });
            }
            body.extend_from_slice(&chunk);
        }

        let format = ImageFormatTag::from_content_type(&content_type);
        let edge = self.settings.thumbnail_edge_px;
        tokio::task::spawn_blocking(move || EmbeddedImage::from_bytes(&body, format, edge))
            .await
            .map_err(|e| FetchFailure::Decode(e.to_string()))?
            .map_err(|e| FetchFailure::Decode(e.to_string()))
    }
}

impl ImageFetcher for HttpImageFetcher {
    async fn fetch(&self, url: &str) -> ImagePayload {
        // クライアント側のタイムアウトに加えて全体も同じ上限で打ち切る
        let outcome = match tokio::time::timeout(self.settings.timeout, self.try_fetch(url)).await {
            Ok(result) => result,
            Err(_) => Err(FetchFailure::Timeout),
        };

        match outcome {
            Ok(image) => {
                debug!(url, width = image.width, height = image.height, "画像取得完了");
                ImagePayload::Decoded(image)
            }
            Err(FetchFailure::Timeout) => {
                warn!(url, timeout_secs = self.settings.timeout.as_secs(), "画像取得タイムアウト");
                ImagePayload::Absent
            }
            Err(failure) => {
                warn!(url, error = %failure, "画像取得失敗");
                ImagePayload::Absent
            }
        }
    }
}
