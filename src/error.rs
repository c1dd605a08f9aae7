use thiserror::Error;

#[derive(Error, Debug)]
pub enum CatalogExportError {
    #[error("設定エラー: {0}")]
    Config(String),

    #[error("ファイルが見つかりません: {0}")]
    FileNotFound(String),

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error("PDF生成エラー: {0}")]
    PdfGeneration(String),

    #[error("HTTPクライアント初期化エラー: {0}")]
    HttpClient(String),

    #[error("エクスポートは既に実行中です")]
    ExportInProgress,

    #[error("通貨モードが不正: {0}")]
    InvalidCurrency(String),
}

impl From<catalog_export_common::Error> for CatalogExportError {
    fn from(err: catalog_export_common::Error) -> Self {
        match err {
            catalog_export_common::Error::Io(e) => CatalogExportError::Io(e),
            catalog_export_common::Error::Json(e) => CatalogExportError::JsonParse(e),
            catalog_export_common::Error::Config(msg) => CatalogExportError::Config(msg),
        }
    }
}

pub type Result<T> = std::result::Result<T, CatalogExportError>;
