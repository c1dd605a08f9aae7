pub mod draw;
pub mod pdf;
pub mod rows;
pub mod table;

pub use pdf::{render_document, ExportOptions, RenderedDocument};
pub use rows::{build_rows, ExportRow};

use crate::error::{CatalogExportError, Result};
use crate::fetcher::ImageFetcher;
use catalog_export_common::export::pdf_core::export_file_name;
use catalog_export_common::{CatalogProduct, CurrencyMode, TableGeometry, CATALOG_TABLE};
use indicatif::ProgressBar;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{info, warn};

/// 出力結果
#[derive(Debug, Clone)]
pub struct ExportOutcome {
    pub path: PathBuf,
    pub page_count: usize,
    pub row_count: usize,
    pub images_embedded: usize,
}

/// 実行中フラグを握る。drop で解放
struct ExportGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> ExportGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Result<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| CatalogExportError::ExportInProgress)?;
        Ok(Self { flag })
    }
}

impl Drop for ExportGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

/// 取得 → 描画 → 保存 をまとめる
pub struct CatalogExporter<F: ImageFetcher> {
    fetcher: F,
    geometry: TableGeometry,
    concurrency: usize,
    progress: ProgressBar,
    in_flight: AtomicBool,
}

impl<F: ImageFetcher> CatalogExporter<F> {
    pub fn new(fetcher: F, concurrency: usize) -> Self {
        Self {
            fetcher,
            geometry: CATALOG_TABLE,
            concurrency,
            progress: ProgressBar::hidden(),
            in_flight: AtomicBool::new(false),
        }
    }

    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = progress;
        self
    }

    /// `output_dir/catalog-export-YYYY-MM-DD.pdf` に書き出す
    ///
    /// 同じインスタンスで実行中なら `ExportInProgress`。
    pub async fn export(
        &self,
        products: &[CatalogProduct],
        mode: CurrencyMode,
        options: &ExportOptions,
        output_dir: &Path,
    ) -> Result<ExportOutcome> {
        let _guard = ExportGuard::acquire(&self.in_flight)?;

        info!(products = products.len(), mode = %mode, "エクスポート開始");
        self.progress.set_length(products.len() as u64);
        let rows = build_rows(products, mode, &self.fetcher, self.concurrency, &self.progress).await;
        self.progress.finish_and_clear();

        let document = render_document(&rows, mode, &self.geometry, options)?;
        let path = output_dir.join(export_file_name(&options.iso_date()));
        save_artifact(&path, &document.bytes)?;

        info!(path = %path.display(), pages = document.page_count(), "エクスポート完了");
        Ok(ExportOutcome {
            path,
            page_count: document.page_count(),
            row_count: rows.len(),
            images_embedded: document.images_embedded,
        })
    }
}

/// 一時ファイルに書いてから rename する（途中の状態を見せない）
pub fn save_artifact(path: &Path, bytes: &[u8]) -> Result<()> {
    let parent = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        _ => PathBuf::from("."),
    };
    std::fs::create_dir_all(&parent)?;

    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| CatalogExportError::Config(format!("出力パスが不正: {}", path.display())))?;
    let temp_path = parent.join(format!(".{}.{}.tmp", file_name, std::process::id()));

    let written = std::fs::write(&temp_path, bytes).and_then(|_| std::fs::rename(&temp_path, path));
    if let Err(err) = written {
        if let Err(cleanup) = std::fs::remove_file(&temp_path) {
            if cleanup.kind() != std::io::ErrorKind::NotFound {
                warn!(path = %temp_path.display(), error = %cleanup, "一時ファイルを削除できません");
            }
        }
        return Err(err.into());
    }
    Ok(())
}
