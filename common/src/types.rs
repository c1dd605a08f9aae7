//! カタログ出力の型定義
//!
//! - CatalogProduct: 出力コアが受け取る商品ビュー（読み取り専用）
//! - CurrencyMode: 価格表示モード（USD / EUR / 両方）
//! - ImageFormatTag: 埋め込み画像の形式タグ

use serde::{Deserialize, Serialize};

/// USD → EUR 固定換算レート（ライブ取得はしない）
pub const EUR_PER_USD: f64 = 0.85;

/// 通貨
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Currency {
    pub code: &'static str,
    pub symbol: &'static str,
}

/// 基準通貨（DBの価格はUSD）
pub const BASE_CURRENCY: Currency = Currency { code: "USD", symbol: "$" };

/// 換算通貨
pub const CONVERTED_CURRENCY: Currency = Currency { code: "EUR", symbol: "€" };

/// 商品画像の参照
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductImage {
    pub url: String,
    pub order: i32,
}

/// 出力対象の商品
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogProduct {
    pub id: String,
    pub name: String,
    pub barcode: Option<String>,
    /// 基準通貨での単価
    pub unit_price: Option<f64>,
    pub units_per_case: Option<u32>,
    pub weight_per_piece_kg: Option<f64>,
    pub images: Vec<ProductImage>,
}

impl CatalogProduct {
    /// 単価（未設定・負値・NaNは0扱い）
    pub fn base_price(&self) -> f64 {
        match self.unit_price {
            Some(price) if price.is_finite() && price > 0.0 => price,
            _ => 0.0,
        }
    }

    /// 換算通貨での単価
    pub fn converted_price(&self) -> f64 {
        self.base_price() * EUR_PER_USD
    }

    pub fn units_per_case_or_default(&self) -> u32 {
        self.units_per_case.filter(|&n| n > 0).unwrap_or(1)
    }

    /// 表示順が最小の画像（先頭画像）
    pub fn primary_image(&self) -> Option<&ProductImage> {
        // 同順位なら元の並びを優先
        self.images.iter().min_by_key(|image| image.order)
    }
}

/// 価格表示モード
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CurrencyMode {
    #[default]
    #[serde(rename = "usd", alias = "base")]
    BaseOnly,
    #[serde(rename = "eur", alias = "converted")]
    ConvertedOnly,
    #[serde(rename = "both")]
    Both,
}

impl CurrencyMode {
    /// メタデータ行に表示する説明
    pub fn description(&self) -> String {
        match self {
            CurrencyMode::BaseOnly => format!("Prices in {}", BASE_CURRENCY.code),
            CurrencyMode::ConvertedOnly => format!(
                "Prices in {} (1 {} = {:.2} {})",
                CONVERTED_CURRENCY.code, BASE_CURRENCY.code, EUR_PER_USD, CONVERTED_CURRENCY.code
            ),
            CurrencyMode::Both => format!(
                "Prices in {} / {}",
                BASE_CURRENCY.code, CONVERTED_CURRENCY.code
            ),
        }
    }

    /// 価格列の見出し
    pub fn column_label(&self) -> String {
        match self {
            CurrencyMode::BaseOnly => format!("Price ({})", BASE_CURRENCY.code),
            CurrencyMode::ConvertedOnly => format!("Price ({})", CONVERTED_CURRENCY.code),
            CurrencyMode::Both => format!("Price ({}/{})", BASE_CURRENCY.code, CONVERTED_CURRENCY.code),
        }
    }
}

impl std::str::FromStr for CurrencyMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "usd" | "base" => Ok(CurrencyMode::BaseOnly),
            "eur" | "converted" => Ok(CurrencyMode::ConvertedOnly),
            "both" => Ok(CurrencyMode::Both),
            _ => Err(format!("Unknown currency mode: {}. Use usd, eur, or both", s)),
        }
    }
}

impl std::fmt::Display for CurrencyMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CurrencyMode::BaseOnly => write!(f, "usd"),
            CurrencyMode::ConvertedOnly => write!(f, "eur"),
            CurrencyMode::Both => write!(f, "both"),
        }
    }
}

/// 埋め込み画像の形式タグ
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageFormatTag {
    Png,
    Jpeg,
    Webp,
}

impl ImageFormatTag {
    /// Content-Type から判定（image/* で未知の形式はJPEG扱い）
    pub fn from_content_type(content_type: &str) -> Self {
        let mime = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        match mime.as_str() {
            "image/png" => ImageFormatTag::Png,
            "image/webp" => ImageFormatTag::Webp,
            _ => ImageFormatTag::Jpeg,
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            ImageFormatTag::Png => "image/png",
            ImageFormatTag::Jpeg => "image/jpeg",
            ImageFormatTag::Webp => "image/webp",
        }
    }

    pub fn from_mime_type(mime: &str) -> Option<Self> {
        match mime {
            "image/png" => Some(ImageFormatTag::Png),
            "image/jpeg" => Some(ImageFormatTag::Jpeg),
            "image/webp" => Some(ImageFormatTag::Webp),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product_with_price(price: Option<f64>) -> CatalogProduct {
        CatalogProduct {
            name: "Olive Oil Soap".to_string(),
            unit_price: price,
            ..Default::default()
        }
    }

    #[test]
    fn test_base_price_defaults_to_zero() {
        assert_eq!(product_with_price(None).base_price(), 0.0);
        assert_eq!(product_with_price(Some(-3.0)).base_price(), 0.0);
        assert_eq!(product_with_price(Some(f64::NAN)).base_price(), 0.0);
        assert_eq!(product_with_price(Some(3.42)).base_price(), 3.42);
    }

    #[test]
    fn test_converted_price_uses_fixed_rate() {
        let product = product_with_price(Some(10.0));
        assert!((product.converted_price() - 8.5).abs() < 1e-9);
    }

    #[test]
    fn test_units_per_case_default() {
        let mut product = product_with_price(None);
        assert_eq!(product.units_per_case_or_default(), 1);
        product.units_per_case = Some(0);
        assert_eq!(product.units_per_case_or_default(), 1);
        product.units_per_case = Some(48);
        assert_eq!(product.units_per_case_or_default(), 48);
    }

    #[test]
    fn test_primary_image_lowest_order() {
        let product = CatalogProduct {
            images: vec![
                ProductImage { url: "https://cdn/b.jpg".into(), order: 2 },
                ProductImage { url: "https://cdn/a.jpg".into(), order: 0 },
                ProductImage { url: "https://cdn/c.jpg".into(), order: 0 },
            ],
            ..Default::default()
        };
        assert_eq!(product.primary_image().unwrap().url, "https://cdn/a.jpg");
        assert!(CatalogProduct::default().primary_image().is_none());
    }

    #[test]
    fn test_currency_mode_from_str() {
        assert_eq!("usd".parse::<CurrencyMode>().unwrap(), CurrencyMode::BaseOnly);
        assert_eq!("EUR".parse::<CurrencyMode>().unwrap(), CurrencyMode::ConvertedOnly);
        assert_eq!("both".parse::<CurrencyMode>().unwrap(), CurrencyMode::Both);
        assert_eq!("converted".parse::<CurrencyMode>().unwrap(), CurrencyMode::ConvertedOnly);
        assert!("gbp".parse::<CurrencyMode>().is_err());
    }

    #[test]
    fn test_currency_mode_serde_literals() {
        let mode: CurrencyMode = serde_json::from_str("\"both\"").unwrap();
        assert_eq!(mode, CurrencyMode::Both);
        assert_eq!(serde_json::to_string(&CurrencyMode::ConvertedOnly).unwrap(), "\"eur\"");
    }

    #[test]
    fn test_format_tag_from_content_type() {
        assert_eq!(ImageFormatTag::from_content_type("image/png"), ImageFormatTag::Png);
        assert_eq!(ImageFormatTag::from_content_type("image/webp"), ImageFormatTag::Webp);
        assert_eq!(ImageFormatTag::from_content_type("image/jpeg"), ImageFormatTag::Jpeg);
        assert_eq!(ImageFormatTag::from_content_type("IMAGE/PNG; charset=binary"), ImageFormatTag::Png);
        // 未知のimage/*はJPEG扱い
        assert_eq!(ImageFormatTag::from_content_type("image/gif"), ImageFormatTag::Jpeg);
    }
}
