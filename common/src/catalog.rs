//! カタログ（ストアフロント側の入力）
//!
//! バックエンドのスナップショット行 → CatalogProduct 変換と、
//! 検索・カテゴリによる絞り込み。

use crate::error::{Error, Result};
use crate::types::{CatalogProduct, ProductImage};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// 全カテゴリを表す値
pub const ALL_CATEGORIES: &str = "All";

/// シリーズ（カテゴリ・梱包情報）
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SeriesRecord {
    pub name: String,
    pub pieces_per_case: Option<u32>,
    pub net_weight_kg_per_piece: Option<f64>,
}

/// 商品画像行
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductImageRecord {
    pub image_url: String,
    #[serde(default)]
    pub image_order: i32,
}

/// 商品行（products + series + product_images）
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductRecord {
    pub id: String,
    pub name: String,
    pub barcode: Option<String>,
    pub catalog_description: Option<String>,
    pub catalog_sort_order: Option<i64>,
    pub price_per_piece: Option<f64>,
    pub price_per_piece_usd: Option<f64>,
    pub series: Option<SeriesRecord>,
    pub product_images: Vec<ProductImageRecord>,
}

impl ProductRecord {
    pub fn category(&self) -> Option<&str> {
        self.series.as_ref().map(|s| s.name.as_str()).filter(|n| !n.is_empty())
    }

    /// 出力コア用のビューに変換
    pub fn into_catalog_product(self) -> CatalogProduct {
        // USD価格を優先し、未設定か0なら通常価格
        let unit_price = self.price_per_piece_usd.filter(|p| *p != 0.0).or(self.price_per_piece);
        let (units_per_case, weight_per_piece_kg) = match &self.series {
            Some(series) => (series.pieces_per_case, series.net_weight_kg_per_piece),
            None => (None, None),
        };

        let mut images: Vec<ProductImage> = self
            .product_images
            .into_iter()
            .map(|img| ProductImage { url: img.image_url, order: img.image_order })
            .collect();
        images.sort_by_key(|img| img.order);

        CatalogProduct {
            id: self.id,
            name: self.name,
            barcode: self.barcode,
            unit_price,
            units_per_case,
            weight_per_piece_kg,
            images,
        }
    }
}

/// JSONファイルから商品行を読み込み
pub fn load_products(path: &Path) -> Result<Vec<ProductRecord>> {
    let content = std::fs::read_to_string(path)?;
    let value: serde_json::Value = serde_json::from_str(&content)?;
    if !value.is_array() {
        return Err(Error::Config(format!("商品JSONは配列である必要があります: {}", path.display())));
    }
    let records: Vec<ProductRecord> = serde_json::from_value(value)?;
    Ok(records)
}

/// 重複なしのカテゴリ一覧（先頭は "All"、出現順）
pub fn categories(records: &[ProductRecord]) -> Vec<String> {
    let mut result = vec![ALL_CATEGORIES.to_string()];
    for category in records.iter().filter_map(|r| r.category()) {
        if !result.iter().any(|c| c == category) {
            result.push(category.to_string());
        }
    }
    result
}

/// 検索・絞り込み条件（UI状態を明示的に渡す）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogQuery {
    pub search: Option<String>,
    pub category: Option<String>,
}

impl CatalogQuery {
    pub fn matches(&self, record: &ProductRecord) -> bool {
        self.matches_search(record) && self.matches_category(record)
    }

    /// 名前・説明は大文字小文字を無視、バーコードは部分一致
    fn matches_search(&self, record: &ProductRecord) -> bool {
        let term = match self.search.as_deref().map(str::trim) {
            Some(t) if !t.is_empty() => t,
            _ => return true,
        };
        let lowered = term.to_lowercase();

        record.name.to_lowercase().contains(&lowered)
            || record
                .catalog_description
                .as_deref()
                .is_some_and(|d| d.to_lowercase().contains(&lowered))
            || record.barcode.as_deref().is_some_and(|b| b.contains(term))
    }

    fn matches_category(&self, record: &ProductRecord) -> bool {
        match self.category.as_deref() {
            None | Some(ALL_CATEGORIES) | Some("") => true,
            Some(category) => record.category() == Some(category),
        }
    }

    /// 絞り込み + catalog_sort_order 昇順（未設定は末尾、同順位は元の順）
    pub fn apply(&self, records: Vec<ProductRecord>) -> Vec<CatalogProduct> {
        let mut matched: Vec<ProductRecord> = records.into_iter().filter(|r| self.matches(r)).collect();
        matched.sort_by_key(|r| (r.catalog_sort_order.is_none(), r.catalog_sort_order));
        matched.into_iter().map(ProductRecord::into_catalog_product).collect()
    }
}
