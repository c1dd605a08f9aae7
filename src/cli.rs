use catalog_export_common::CurrencyMode;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "catalog-export")]
#[command(about = "商品カタログをPDFに出力するツール", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 商品JSONからカタログPDFを生成
    Export {
        /// 商品JSONファイル
        #[arg(required = true)]
        input: PathBuf,

        /// 出力ディレクトリ（デフォルト: カレント）
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// 価格表示 (usd/eur/both)
        #[arg(short, long)]
        currency: Option<CurrencyMode>,

        /// 検索語（商品名・説明・バーコード）
        #[arg(short, long)]
        search: Option<String>,

        /// カテゴリ（シリーズ名）
        #[arg(long)]
        category: Option<String>,

        /// 画像の同時取得数 (1-8)
        #[arg(long)]
        concurrency: Option<usize>,

        /// ドキュメントタイトル
        #[arg(short, long)]
        title: Option<String>,
    },

    /// カテゴリ一覧を表示
    Categories {
        /// 商品JSONファイル
        #[arg(required = true)]
        input: PathBuf,
    },

    /// 設定を表示/初期化
    Config {
        /// 設定を表示
        #[arg(long)]
        show: bool,

        /// デフォルト設定を書き出す
        #[arg(long)]
        init: bool,
    },
}
