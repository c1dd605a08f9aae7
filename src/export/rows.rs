//! 行の構築
//!
//! 商品ごとに行テキストを作り、先頭画像を取得する。
//! 取得は上限付きで並行するが、出力順は入力順のまま。

use crate::fetcher::{ImageFetcher, ImagePayload};
use catalog_export_common::{build_row_text, CatalogProduct, CurrencyMode, RowText};
use futures::stream::{self, StreamExt};
use indicatif::ProgressBar;
use tracing::debug;

/// 同時取得数の上限
pub const MAX_FETCH_CONCURRENCY: usize = 8;

/// 描画用の1行
#[derive(Debug, Clone, PartialEq)]
pub struct ExportRow {
    pub text: RowText,
    pub image: ImagePayload,
}

/// 商品列 → 行列（件数・順序は入力と同じ）
pub async fn build_rows<F: ImageFetcher>(
    products: &[CatalogProduct],
    mode: CurrencyMode,
    fetcher: &F,
    concurrency: usize,
    progress: &ProgressBar,
) -> Vec<ExportRow> {
    let concurrency = concurrency.clamp(1, MAX_FETCH_CONCURRENCY);

    stream::iter(products.iter().enumerate())
        .map(|(index, product)| async move {
            let text = build_row_text(product, mode);
            // 先頭画像のみ
            let image = match product.primary_image() {
                Some(primary) => fetcher.fetch(&primary.url).await,
                None => ImagePayload::Absent,
            };
            debug!(row = index + 1, name = %product.name, has_image = image.is_decoded(), "行を構築");
            progress.inc(1);
            ExportRow { text, image }
        })
        .buffered(concurrency)
        .collect()
        .await
}
