//! Catalog Export Common Library
//!
//! PDF出力のうちI/Oを伴わない部分（型・レイアウト・文字列整形・ページ割り）

pub mod types;
pub mod layout;
pub mod text;
pub mod catalog;
pub mod error;
pub mod export;

pub use types::{CatalogProduct, CurrencyMode, ImageFormatTag, ProductImage};
pub use layout::{Column, TableGeometry, CATALOG_TABLE};
pub use catalog::{CatalogQuery, ProductRecord};
pub use error::{Error, Result};
pub use export::pdf_core::{build_row_text, paginate, price_text, RowText};
