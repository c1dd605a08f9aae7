//! PDFドキュメントの仕上げ
//!
//! 1ページ目のタイトル欄 → テーブル → 全ページのフッター → バイト列化。

use super::draw::{Color, FontSet, PageSurface, Rect, TextStyle};
use super::rows::ExportRow;
use super::table::{ImageStamper, TableLayoutEngine};
use crate::error::{CatalogExportError, Result};
use catalog_export_common::export::pdf_core::{metadata_line, page_label};
use catalog_export_common::layout::{Align, TableGeometry};
use catalog_export_common::CurrencyMode;
use chrono::NaiveDate;
use printpdf::{Mm, Op, PdfDocument, PdfPage, PdfSaveOptions};
use std::ops::Range;
use tracing::{debug, info, warn};

const TITLE_SIZE_PT: f32 = 18.0;
const SUBTITLE_SIZE_PT: f32 = 10.0;
const META_SIZE_PT: f32 = 8.0;
const FOOTER_SIZE_PT: f32 = 7.5;

/// 出力オプション
#[derive(Debug, Clone)]
pub struct ExportOptions {
    pub title: String,
    pub subtitle: String,
    /// フッター左
    pub source_label: String,
    /// フッター中央
    pub reference_label: String,
    pub generated_on: NaiveDate,
}

impl ExportOptions {
    pub fn iso_date(&self) -> String {
        self.generated_on.format("%Y-%m-%d").to_string()
    }
}

/// フッター（左・中央・右）
#[derive(Debug, Clone, PartialEq)]
pub struct FooterLine {
    pub left: String,
    pub center: String,
    pub right: String,
}

/// `page_number` は1始まり
pub fn footer_line(page_number: usize, total_pages: usize, options: &ExportOptions) -> FooterLine {
    FooterLine {
        left: options.source_label.clone(),
        center: options.reference_label.clone(),
        right: page_label(page_number, total_pages),
    }
}

#[derive(Debug, Clone)]
pub struct PageSummary {
    pub rows: Range<usize>,
    pub footer: FooterLine,
}

/// メモリ上で完成したPDF
#[derive(Debug, Clone)]
pub struct RenderedDocument {
    pub bytes: Vec<u8>,
    pub pages: Vec<PageSummary>,
    /// 描画できた画像の数
    pub images_embedded: usize,
}

impl RenderedDocument {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }
}

/// 行列からPDFを組み立てる
pub fn render_document(
    rows: &[ExportRow],
    mode: CurrencyMode,
    geometry: &TableGeometry,
    options: &ExportOptions,
) -> Result<RenderedDocument> {
    let mut doc = PdfDocument::new(&options.title);
    let fonts = FontSet::load()?;

    let mut engine = TableLayoutEngine::new(geometry, &fonts, mode, ImageStamper::new(geometry));
    let table = engine.render(&mut doc, rows);
    let images_embedded = engine.renderer().stamped();
    let total = table.page_count();

    let mut summaries = Vec::with_capacity(total);
    for (index, page) in table.pages.into_iter().enumerate() {
        let mut surface = PageSurface::new(&mut doc, &fonts, geometry.page_height_mm);
        if index == 0 {
            draw_title_block(&mut surface, geometry, options, rows.len(), mode);
        }
        let footer = footer_line(index + 1, total, options);
        draw_footer(&mut surface, geometry, &footer);

        // タイトル・フッターの後にテーブルを重ねる
        let mut ops: Vec<Op> = surface.into_ops();
        ops.extend(page.ops);
        doc.pages.push(PdfPage::new(Mm(geometry.page_width_mm), Mm(geometry.page_height_mm), ops));

        debug!(page = index + 1, rows = ?page.rows, "ページ確定");
        summaries.push(PageSummary { rows: page.rows, footer });
    }

    let mut warnings = Vec::new();
    let bytes = doc.save(&PdfSaveOptions::default(), &mut warnings);
    if !warnings.is_empty() {
        warn!(count = warnings.len(), "PDF保存時の警告");
    }
    if bytes.is_empty() {
        return Err(CatalogExportError::PdfGeneration("出力が空です".into()));
    }

    info!(pages = total, rows = rows.len(), images = images_embedded, bytes = bytes.len(), "PDF生成完了");
    Ok(RenderedDocument { bytes, pages: summaries, images_embedded })
}

fn draw_title_block(
    surface: &mut PageSurface<'_>,
    geometry: &TableGeometry,
    options: &ExportOptions,
    product_count: usize,
    mode: CurrencyMode,
) {
    let left = geometry.table_left_mm();
    let width = geometry.table_width_mm();
    let top = geometry.margin_top_mm;

    surface.text_aligned(&options.title, left, width, top + 8.0, Align::Center, TextStyle::bold(TITLE_SIZE_PT));
    surface.text_aligned(
        &options.subtitle,
        left,
        width,
        top + 14.0,
        Align::Center,
        TextStyle::regular(SUBTITLE_SIZE_PT).with_color(Color::MUTED),
    );

    let meta = metadata_line(&options.iso_date(), product_count, mode);
    let style = TextStyle::regular(META_SIZE_PT).with_color(Color::MUTED);
    let baseline = top + 22.0;
    surface.text_aligned(&meta.left, left, width, baseline, Align::Left, style);
    surface.text_aligned(&meta.center, left, width, baseline, Align::Center, style);
    surface.text_aligned(&meta.right, left, width, baseline, Align::Right, style);

    surface.hline(left, left + width, top + 25.0, Color::HEADER, 0.8);
}

fn draw_footer(surface: &mut PageSurface<'_>, geometry: &TableGeometry, footer: &FooterLine) {
    let left = geometry.table_left_mm();
    let width = geometry.table_width_mm();
    let line_y = geometry.page_height_mm - geometry.margin_bottom_mm + 5.0;
    let area = Rect::new(left, line_y, width, geometry.margin_bottom_mm - 5.0);

    surface.hline(left, left + width, line_y, Color::BORDER, 0.5);

    let style = TextStyle::regular(FOOTER_SIZE_PT).with_color(Color::MUTED);
    let baseline = area.y_mm + 5.0;
    surface.text_aligned(&footer.left, area.x_mm, area.width_mm, baseline, Align::Left, style);
    surface.text_aligned(&footer.center, area.x_mm, area.width_mm, baseline, Align::Center, style);
    surface.text_aligned(&footer.right, area.x_mm, area.width_mm, baseline, Align::Right, style);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetcher::ImagePayload;
    use catalog_export_common::{build_row_text, CatalogProduct};

    fn options() -> ExportOptions {
        ExportOptions {
            title: "OLIVOS 2025 PRODUCT LIST".into(),
            subtitle: "Soap & Skincare".into(),
            source_label: "olivos catalog".into(),
            reference_label: "export@olivos.com".into(),
            generated_on: NaiveDate::from_ymd_opt(2025, 3, 14).unwrap(),
        }
    }

    fn rows(count: usize) -> Vec<ExportRow> {
        (0..count)
            .map(|i| ExportRow {
                text: build_row_text(
                    &CatalogProduct {
                        name: format!("Olive Soap {}", i + 1),
                        unit_price: Some(4.0),
                        ..Default::default()
                    },
                    CurrencyMode::Both,
                ),
                image: ImagePayload::Absent,
            })
            .collect()
    }

    #[test]
    fn test_footer_line() {
        let footer = footer_line(2, 5, &options());
        assert_eq!(footer.left, "olivos catalog");
        assert_eq!(footer.center, "export@olivos.com");
        assert_eq!(footer.right, "Page 2 of 5");
    }

    #[test]
    fn test_iso_date() {
        assert_eq!(options().iso_date(), "2025-03-14");
    }

    #[test]
    fn test_render_document_footers_count_pages() {
        let rows = rows(40);
        let document = render_document(&rows, CurrencyMode::Both, &TableGeometry::a4_portrait(), &options()).unwrap();

        assert!(document.bytes.starts_with(b"%PDF"));
        let n = document.page_count();
        assert!(n >= 2);
        for (i, page) in document.pages.iter().enumerate() {
            assert_eq!(page.footer.right, format!("Page {} of {}", i + 1, n));
        }
        assert_eq!(document.pages.last().unwrap().rows.end, 40);
        assert_eq!(document.images_embedded, 0);
    }

    #[test]
    fn test_render_empty_document() {
        let document = render_document(&[], CurrencyMode::BaseOnly, &TableGeometry::a4_portrait(), &options()).unwrap();
        assert_eq!(document.page_count(), 1);
        assert_eq!(document.pages[0].footer.right, "Page 1 of 1");
    }
}
