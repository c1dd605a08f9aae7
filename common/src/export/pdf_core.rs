//! PDF export core utilities.
//!
//! 商品 → 行テキスト変換、価格表記、ページ割り、フッター文字列。
//! I/Oなし。同じ入力からは常に同じ結果を返す。

use std::ops::Range;

use crate::layout::{Column, TableGeometry};
use crate::text::{to_win_ansi, wrap_lines, TextMeasure};
use crate::types::{CatalogProduct, CurrencyMode, BASE_CURRENCY, CONVERTED_CURRENCY, EUR_PER_USD};

/// 値がないときの表示
pub const PLACEHOLDER: &str = "N/A";

/// 商品名の最大行数
pub const NAME_MAX_LINES: usize = 2;

/// 2通貨表示の区切り
pub const PRICE_SEPARATOR: &str = " / ";

/// 1行分の表示テキスト
#[derive(Debug, Clone, PartialEq)]
pub struct RowText {
    pub name: String,
    pub barcode: String,
    pub units_per_case: String,
    pub weight: String,
    pub price: String,
}

impl RowText {
    /// 列のテキスト（画像列は空）
    pub fn cell(&self, column: Column) -> &str {
        match column {
            Column::Image => "",
            Column::Name => &self.name,
            Column::Barcode => &self.barcode,
            Column::UnitsPerCase => &self.units_per_case,
            Column::Weight => &self.weight,
            Column::Price => &self.price,
        }
    }

    /// 商品名の折り返し（組み込みフォント向けに置換済み）
    pub fn name_lines<M: TextMeasure + ?Sized>(&self, geometry: &TableGeometry, measure: &M) -> Vec<String> {
        wrap_lines(
            &to_win_ansi(&self.name),
            geometry.cell_text_width_pt(Column::Name),
            geometry.font_size_pt,
            NAME_MAX_LINES,
            measure,
        )
    }

    /// 価格の行分け
    ///
    /// 価格は切り詰めない。列に収まらない2通貨表示は区切りで2行に分ける。
    pub fn price_lines<M: TextMeasure + ?Sized>(&self, geometry: &TableGeometry, measure: &M) -> Vec<String> {
        let price = to_win_ansi(&self.price);
        let fits = measure.width_pt(&price, geometry.font_size_pt) <= geometry.cell_text_width_pt(Column::Price);
        match price.split_once(PRICE_SEPARATOR) {
            Some((base, converted)) if !fits => {
                vec![format!("{}{}", base, PRICE_SEPARATOR.trim_end()), converted.to_string()]
            }
            _ => vec![price],
        }
    }

    /// 行高さ（mm）: 商品名と価格の多い方の行数で決める
    pub fn row_height_mm<M: TextMeasure + ?Sized>(&self, geometry: &TableGeometry, measure: &M) -> f32 {
        let lines = self
            .name_lines(geometry, measure)
            .len()
            .max(self.price_lines(geometry, measure).len());
        geometry.row_height_mm(lines)
    }
}

/// "$10.00" 形式
pub fn format_amount(symbol: &str, amount: f64) -> String {
    format!("{}{:.2}", symbol, amount)
}

/// 価格表記
///
/// - BaseOnly: `$10.00`
/// - ConvertedOnly: `€8.50`
/// - Both: `$10.00 / €8.50`
pub fn price_text(base_price: f64, mode: CurrencyMode) -> String {
    let base = format_amount(BASE_CURRENCY.symbol, base_price);
    let converted = format_amount(CONVERTED_CURRENCY.symbol, base_price * EUR_PER_USD);
    match mode {
        CurrencyMode::BaseOnly => base,
        CurrencyMode::ConvertedOnly => converted,
        CurrencyMode::Both => format!("{}{}{}", base, PRICE_SEPARATOR, converted),
    }
}

/// 重量表記: "0.125 kg"、未設定は "N/A"
pub fn format_weight(weight_kg: Option<f64>) -> String {
    match weight_kg {
        Some(w) if w.is_finite() && w > 0.0 => format!("{} kg", w),
        _ => PLACEHOLDER.to_string(),
    }
}

/// 商品1件を行テキストに変換
pub fn build_row_text(product: &CatalogProduct, mode: CurrencyMode) -> RowText {
    let barcode = product
        .barcode
        .as_deref()
        .map(str::trim)
        .filter(|b| !b.is_empty())
        .unwrap_or(PLACEHOLDER)
        .to_string();

    RowText {
        name: product.name.trim().to_string(),
        barcode,
        units_per_case: product.units_per_case_or_default().to_string(),
        weight: format_weight(product.weight_per_piece_kg),
        price: price_text(product.base_price(), mode),
    }
}

/// ページ割り
///
/// 各行の高さと、ページごとの行用高さ（1ページ目 / 2ページ目以降）から
/// ページ単位の行範囲を返す。行は途中で分割しない。
/// 空ページ1枚分より高い行は単独で1ページに置く。
/// 行が0件でも見出しだけのページを1枚返す。
pub fn paginate(row_heights: &[f32], first_page_budget: f32, next_page_budget: f32) -> Vec<Range<usize>> {
    let mut pages = Vec::new();
    let mut start = 0;
    let mut used = 0.0_f32;
    let mut budget = first_page_budget;

    for (i, &height) in row_heights.iter().enumerate() {
        // 浮動小数の誤差で「ちょうど収まる」行を落とさない
        let fits = used + height <= budget + 1e-3;
        if !fits && i > start {
            pages.push(start..i);
            start = i;
            used = 0.0;
            budget = next_page_budget;
        }
        used += height;
    }

    pages.push(start..row_heights.len());
    pages
}

/// フッター右側: "Page {i} of {n}"
pub fn page_label(page_number: usize, total_pages: usize) -> String {
    format!("Page {} of {}", page_number, total_pages)
}

/// タイトル下のメタデータ行
#[derive(Debug, Clone, PartialEq)]
pub struct MetadataLine {
    pub left: String,
    pub center: String,
    pub right: String,
}

pub fn metadata_line(generated_on: &str, product_count: usize, mode: CurrencyMode) -> MetadataLine {
    MetadataLine {
        left: format!("Generated: {}", generated_on),
        center: format!("Total products: {}", product_count),
        right: mode.description(),
    }
}

/// 出力ファイル名: catalog-export-YYYY-MM-DD.pdf
pub fn export_file_name(iso_date: &str) -> String {
    format!("catalog-export-{}.pdf", iso_date)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::tests::Monospace;
    use crate::types::ProductImage;

    fn sample_product() -> CatalogProduct {
        CatalogProduct {
            id: "p-1".into(),
            name: "Olive Oil Soap 125g".into(),
            barcode: Some("8690000000017".into()),
            unit_price: Some(10.0),
            units_per_case: Some(48),
            weight_per_piece_kg: Some(0.125),
            images: vec![ProductImage { url: "https://cdn.example.com/soap.jpg".into(), order: 0 }],
        }
    }

    #[test]
    fn test_price_text_modes() {
        assert_eq!(price_text(10.0, CurrencyMode::BaseOnly), "$10.00");
        assert_eq!(price_text(10.0, CurrencyMode::ConvertedOnly), "€8.50");
        assert_eq!(price_text(10.0, CurrencyMode::Both), "$10.00 / €8.50");
    }

    #[test]
    fn test_price_text_missing_price_is_zero() {
        let product = CatalogProduct { name: "Loofah".into(), ..Default::default() };
        let row = build_row_text(&product, CurrencyMode::BaseOnly);
        assert_eq!(row.price, "$0.00");
    }

    #[test]
    fn test_build_row_text_full() {
        let row = build_row_text(&sample_product(), CurrencyMode::Both);
        assert_eq!(row.name, "Olive Oil Soap 125g");
        assert_eq!(row.barcode, "8690000000017");
        assert_eq!(row.units_per_case, "48");
        assert_eq!(row.weight, "0.125 kg");
        assert_eq!(row.price, "$10.00 / €8.50");
    }

    #[test]
    fn test_build_row_text_placeholders() {
        let product = CatalogProduct {
            name: "Bath Sponge".into(),
            barcode: Some("  ".into()),
            ..Default::default()
        };
        let row = build_row_text(&product, CurrencyMode::BaseOnly);
        assert_eq!(row.barcode, PLACEHOLDER);
        assert_eq!(row.weight, PLACEHOLDER);
        assert_eq!(row.units_per_case, "1");
    }

    #[test]
    fn test_build_row_text_is_deterministic() {
        let product = sample_product();
        assert_eq!(
            build_row_text(&product, CurrencyMode::Both),
            build_row_text(&product, CurrencyMode::Both)
        );
    }

    #[test]
    fn test_row_cells() {
        let row = build_row_text(&sample_product(), CurrencyMode::BaseOnly);
        assert_eq!(row.cell(Column::Image), "");
        assert_eq!(row.cell(Column::Price), "$10.00");
        assert_eq!(row.cell(Column::Barcode), "8690000000017");
    }

    #[test]
    fn test_paginate_k_plus_one_rows() {
        let k = 5;
        let heights = vec![20.0; k + 1];
        let pages = paginate(&heights, 20.0 * k as f32, 20.0 * k as f32);
        assert_eq!(pages, vec![0..k, k..k + 1]);
    }

    #[test]
    fn test_paginate_exact_fit_single_page() {
        let heights = vec![24.0; 10];
        let pages = paginate(&heights, 240.0, 240.0);
        assert_eq!(pages, vec![0..10]);
    }

    #[test]
    fn test_paginate_first_page_smaller() {
        let heights = vec![10.0; 7];
        let pages = paginate(&heights, 20.0, 30.0);
        assert_eq!(pages, vec![0..2, 2..5, 5..7]);
    }

    #[test]
    fn test_paginate_oversized_row_gets_own_page() {
        let heights = vec![10.0, 100.0, 10.0];
        let pages = paginate(&heights, 50.0, 50.0);
        assert_eq!(pages, vec![0..1, 1..2, 2..3]);
    }

    #[test]
    fn test_paginate_empty() {
        assert_eq!(paginate(&[], 100.0, 100.0), vec![0..0]);
    }

    #[test]
    fn test_page_label() {
        assert_eq!(page_label(1, 3), "Page 1 of 3");
        assert_eq!(page_label(3, 3), "Page 3 of 3");
    }

    #[test]
    fn test_metadata_line() {
        let line = metadata_line("2026-10-18", 12, CurrencyMode::Both);
        assert_eq!(line.left, "Generated: 2026-10-18");
        assert_eq!(line.center, "Total products: 12");
        assert_eq!(line.right, "Prices in USD / EUR");
    }

    #[test]
    fn test_export_file_name() {
        assert_eq!(export_file_name("2026-10-18"), "catalog-export-2026-10-18.pdf");
    }

    #[test]
    fn test_row_height_for_long_name() {
        let geometry = TableGeometry::a4_portrait();
        let mut row = build_row_text(&sample_product(), CurrencyMode::BaseOnly);
        assert_eq!(row.row_height_mm(&geometry, &Monospace), geometry.min_row_height_mm);
        row.name = "Extra Long Natural Olive Oil Soap ".repeat(10);
        assert_eq!(row.name_lines(&geometry, &Monospace).len(), NAME_MAX_LINES);
    }

    #[test]
    fn test_price_lines_keep_short_price_on_one_line() {
        let geometry = TableGeometry::a4_portrait();
        let row = build_row_text(&sample_product(), CurrencyMode::BaseOnly);
        assert_eq!(row.price_lines(&geometry, &Monospace), vec!["$10.00".to_string()]);
    }

    #[test]
    fn test_price_lines_split_wide_price_without_truncation() {
        let geometry = TableGeometry::a4_portrait();
        let product = CatalogProduct { unit_price: Some(12345.67), ..sample_product() };
        let row = build_row_text(&product, CurrencyMode::Both);
        assert_eq!(row.price, "$12345.67 / €10493.82");

        let lines = row.price_lines(&geometry, &Monospace);
        assert_eq!(lines, vec!["$12345.67 /".to_string(), "€10493.82".to_string()]);
        assert_eq!(lines.join(" "), row.price);
    }
}
