//! catalog-export
//!
//! 商品一覧（画像付き）をページ分割テーブルのPDFカタログに出力する。

pub mod cli;
pub mod config;
pub mod error;
pub mod export;
pub mod fetcher;
