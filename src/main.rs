use catalog_export::export::{CatalogExporter, ExportOptions};
use catalog_export::fetcher::{FetchSettings, HttpImageFetcher};
use catalog_export::{cli, config, error};
use catalog_export_common::catalog::{categories, load_products};
use catalog_export_common::CatalogQuery;
use clap::Parser;
use cli::{Cli, Commands};
use config::Config;
use error::{CatalogExportError, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "catalog_export=debug" } else { "catalog_export=info" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = Config::load()?;

    match cli.command {
        Commands::Export { input, output, currency, search, category, concurrency, title } => {
            println!("📄 catalog-export - PDF出力\n");

            if !input.exists() {
                return Err(CatalogExportError::FileNotFound(input.display().to_string()));
            }

            // 1. 読み込み・絞り込み
            println!("[1/3] 商品を読み込み中...");
            let records = load_products(&input)?;
            let query = CatalogQuery { search, category };
            let products = query.apply(records);
            println!("✔ {}件の商品を出力対象にしました\n", products.len());

            let mode = match currency {
                Some(mode) => mode,
                None => config.currency_mode()?,
            };

            // 2. 画像取得
            println!("[2/3] 画像を取得中...");
            let progress = ProgressBar::new(products.len() as u64);
            if let Ok(style) = ProgressStyle::with_template("  {bar:40} {pos}/{len} {msg}") {
                progress.set_style(style);
            }
            let fetcher = HttpImageFetcher::new(FetchSettings::from_config(&config))?;
            let exporter = CatalogExporter::new(fetcher, concurrency.unwrap_or(config.fetch_concurrency))
                .with_progress(progress);

            let options = ExportOptions {
                title: title.unwrap_or_else(|| config.title.clone()),
                subtitle: config.subtitle.clone(),
                source_label: config.source_label.clone(),
                reference_label: config.reference_label.clone(),
                generated_on: chrono::Local::now().date_naive(),
            };
            let output_dir = output.unwrap_or_else(|| PathBuf::from("."));

            // 3. PDF生成・保存
            let outcome = exporter.export(&products, mode, &options, &output_dir).await?;
            println!("[3/3] PDFを保存しました");
            println!(
                "✔ {} ({}ページ, {}行, 画像{}枚)",
                outcome.path.display(),
                outcome.page_count,
                outcome.row_count,
                outcome.images_embedded
            );

            println!("\n✅ エクスポート完了");
        }

        Commands::Categories { input } => {
            if !input.exists() {
                return Err(CatalogExportError::FileNotFound(input.display().to_string()));
            }
            let records = load_products(&input)?;
            for category in categories(&records) {
                println!("{}", category);
            }
        }

        Commands::Config { show, init } => {
            if init {
                Config::default().save()?;
                println!("✔ デフォルト設定を書き出しました: {}", Config::config_path()?.display());
            }

            if show || !init {
                println!("設定:");
                println!("  取得タイムアウト: {}秒", config.fetch_timeout_seconds);
                println!("  最大画像サイズ: {} bytes", config.max_image_bytes);
                println!("  同時取得数: {}", config.fetch_concurrency);
                println!("  縮小サイズ: {}px", config.thumbnail_edge_px);
                println!("  通貨: {}", config.default_currency);
                println!("  タイトル: {}", config.title);
            }
        }
    }

    Ok(())
}
