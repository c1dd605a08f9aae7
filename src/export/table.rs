//! テーブルレイアウト
//!
//! ページごとに 見出し → 行（入るだけ） → 次ページ を繰り返す。
//! 行は途中で分割せず、入らなければ丸ごと次ページへ送る。
//! 画像列のセルは背景・罫線の後に `CellRenderer` へ委譲する。

use super::draw::{Color, FontSet, PageSurface, Rect, TextStyle};
use super::rows::ExportRow;
use crate::fetcher::{flatten_on_white, PayloadError};
use catalog_export_common::export::pdf_core::paginate;
use catalog_export_common::layout::{mm_to_pt, pt_to_mm, Align, Column, TableGeometry};
use catalog_export_common::text::fit_to_width;
use catalog_export_common::CurrencyMode;
use printpdf::{Op, PdfDocument, RawImage, RawImageData, RawImageFormat};
use std::ops::Range;
use thiserror::Error;
use tracing::warn;

/// 罫線の太さ（pt）
const BORDER_PT: f32 = 0.3;

#[derive(Error, Debug)]
pub enum CellRenderError {
    #[error("画像デコード失敗: {0}")]
    Decode(#[from] PayloadError),
}

/// セル描画の拡張点
pub trait CellRenderer {
    fn render_cell(
        &mut self,
        surface: &mut PageSurface<'_>,
        row: &ExportRow,
        cell: &Rect,
    ) -> Result<(), CellRenderError>;
}

/// 画像列に商品画像を押す
pub struct ImageStamper {
    geometry: TableGeometry,
    stamped: usize,
}

impl ImageStamper {
    pub fn new(geometry: &TableGeometry) -> Self {
        Self { geometry: geometry.clone(), stamped: 0 }
    }

    /// 描画できた画像の数
    pub fn stamped(&self) -> usize {
        self.stamped
    }
}

impl CellRenderer for ImageStamper {
    fn render_cell(
        &mut self,
        surface: &mut PageSurface<'_>,
        row: &ExportRow,
        cell: &Rect,
    ) -> Result<(), CellRenderError> {
        let Some(embedded) = row.image.as_embedded() else {
            return Ok(());
        };

        let edge_mm = self.geometry.image_edge_mm(cell.height_mm);
        let pixels = flatten_on_white(&embedded.decode()?);
        let (width, height) = pixels.dimensions();
        if width == 0 || height == 0 || edge_mm <= 0.0 {
            return Ok(());
        }

        // 辺 edge_mm の正方形に収める（縦横比は保持）
        let scale = edge_mm / width.max(height) as f32;
        let target = cell.centered(width as f32 * scale, height as f32 * scale);

        let raw = RawImage {
            pixels: RawImageData::U8(pixels.into_raw()),
            width: width as usize,
            height: height as usize,
            data_format: RawImageFormat::RGB8,
            tag: Vec::new(),
        };
        let id = surface.add_image(&raw);
        surface.place_image(id, (width, height), &target);
        self.stamped += 1;
        Ok(())
    }
}

/// 1ページ分の描画結果
#[derive(Debug)]
pub struct TablePage {
    pub ops: Vec<Op>,
    /// このページに載った行
    pub rows: Range<usize>,
}

#[derive(Debug)]
pub struct TableRender {
    pub pages: Vec<TablePage>,
}

impl TableRender {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }
}

/// テーブルレイアウトエンジン
pub struct TableLayoutEngine<'g, R: CellRenderer> {
    geometry: &'g TableGeometry,
    fonts: &'g FontSet,
    price_label: String,
    renderer: R,
}

impl<'g, R: CellRenderer> TableLayoutEngine<'g, R> {
    pub fn new(geometry: &'g TableGeometry, fonts: &'g FontSet, mode: CurrencyMode, renderer: R) -> Self {
        Self { geometry, fonts, price_label: mode.column_label(), renderer }
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn render(&mut self, doc: &mut PdfDocument, rows: &[ExportRow]) -> TableRender {
        let geometry = self.geometry;
        let measure = self.fonts.regular();
        let heights: Vec<f32> = rows.iter().map(|row| row.text.row_height_mm(geometry, measure)).collect();
        let plan = paginate(&heights, geometry.row_budget_mm(0), geometry.row_budget_mm(1));

        let mut pages = Vec::with_capacity(plan.len());
        for (page_index, range) in plan.into_iter().enumerate() {
            let mut surface = PageSurface::new(doc, self.fonts, geometry.page_height_mm);
            let mut y = geometry.table_top_mm(page_index);

            self.draw_header(&mut surface, y);
            y += geometry.header_row_height_mm;

            for index in range.clone() {
                self.draw_row(&mut surface, index, &rows[index], y, heights[index]);
                y += heights[index];
            }

            pages.push(TablePage { ops: surface.into_ops(), rows: range });
        }

        TableRender { pages }
    }

    fn cell_rect(&self, column: Column, y_mm: f32, height_mm: f32) -> Rect {
        Rect::new(
            self.geometry.column_x_mm(column),
            y_mm,
            self.geometry.column_width_mm(column),
            height_mm,
        )
    }

    /// n行のテキストを縦中央に置いたときの i 行目のベースライン
    fn baseline_mm(&self, cell: &Rect, line: usize, line_count: usize, style: &TextStyle) -> f32 {
        let line_height = self.geometry.line_height_mm;
        let cap_height = pt_to_mm(self.fonts.for_style(style).cap_height_pt(style.size_pt));
        let block = line_count as f32 * line_height;
        cell.y_mm + (cell.height_mm - block) / 2.0 + line as f32 * line_height + (line_height + cap_height) / 2.0
    }

    fn draw_header(&self, surface: &mut PageSurface<'_>, y_mm: f32) {
        let geometry = self.geometry;
        let style = TextStyle::bold(geometry.header_font_size_pt).with_color(Color::WHITE);
        let padding = geometry.cell_padding_mm;

        for column in Column::ALL {
            let cell = self.cell_rect(column, y_mm, geometry.header_row_height_mm);
            surface.fill_rect(&cell, Color::HEADER);
            surface.stroke_rect(&cell, Color::BORDER, BORDER_PT);

            let label = match column {
                Column::Price => self.price_label.as_str(),
                _ => column.header_label(),
            };
            let baseline = self.baseline_mm(&cell, 0, 1, &style);
            surface.text_aligned(
                label,
                cell.x_mm + padding,
                cell.width_mm - padding * 2.0,
                baseline,
                column.align(),
                style,
            );
        }
    }

    fn draw_row(&mut self, surface: &mut PageSurface<'_>, index: usize, row: &ExportRow, y_mm: f32, height_mm: f32) {
        let geometry = self.geometry;
        let style = TextStyle::regular(geometry.font_size_pt);
        let padding = geometry.cell_padding_mm;
        // 1行おきに薄い背景
        let tinted = index % 2 == 1;

        for column in Column::ALL {
            let cell = self.cell_rect(column, y_mm, height_mm);
            if tinted {
                surface.fill_rect(&cell, Color::ROW_TINT);
            }
            surface.stroke_rect(&cell, Color::BORDER, BORDER_PT);

            let inner_x = cell.x_mm + padding;
            let inner_width = cell.width_mm - padding * 2.0;

            match column {
                Column::Image => {
                    if let Err(err) = self.renderer.render_cell(surface, row, &cell) {
                        warn!(row = index + 1, name = %row.text.name, error = %err, "画像を描画できないため空欄にします");
                    }
                }
                Column::Name | Column::Price => {
                    let measure = self.fonts.regular();
                    let lines = match column {
                        Column::Name => row.text.name_lines(geometry, measure),
                        _ => row.text.price_lines(geometry, measure),
                    };
                    for (i, line) in lines.iter().enumerate() {
                        let baseline = self.baseline_mm(&cell, i, lines.len(), &style);
                        surface.text_aligned(line, inner_x, inner_width, baseline, column.align(), style);
                    }
                }
                _ => {
                    let text = fit_to_width(
                        row.text.cell(column),
                        mm_to_pt(inner_width),
                        style.size_pt,
                        self.fonts.regular(),
                    );
                    let baseline = self.baseline_mm(&cell, 0, 1, &style);
                    surface.text_aligned(&text, inner_x, inner_width, baseline, column.align(), style);
                }
            }
        }
    }
}
