use car_check_rust::archive::Archive;
use car_check_rust::checklist::CheckStatus;
use car_check_rust::cli::{Cli, Commands};
use car_check_rust::config::Config;
use car_check_rust::error::{CarCheckError, Result};
use car_check_rust::{export, session};
use clap::Parser;
use std::path::PathBuf;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load()?;

    match cli.command {
        Commands::Inspect {
            parts,
            sheet_url,
            include_photos,
        } => {
            session::run_inspection(
                &config,
                session::SessionOptions {
                    parts_file: parts,
                    sheet_url,
                    include_photos,
                    verbose: cli.verbose,
                },
            )
            .await?;
        }

        Commands::History => {
            println!("📋 car-check - 点検履歴\n");

            let archive = Archive::new(Archive::default_path()?);
            let inspections = archive.list();

            if inspections.is_empty() {
                println!("保存済みの点検はありません");
            } else {
                for (index, inspection) in inspections.iter().enumerate() {
                    let plate = if inspection.car_identity.license_plate.is_empty() {
                        "ナンバー未登録"
                    } else {
                        &inspection.car_identity.license_plate
                    };
                    let not_good = inspection
                        .items
                        .iter()
                        .filter(|i| i.status == CheckStatus::NotGood)
                        .count();
                    let date = inspection.date.replace('T', " ");
                    let date = date.get(..16).unwrap_or(&date);
                    println!(
                        "{:>2}: {}  {}  （{}件中 要確認{}件）",
                        index,
                        date,
                        plate,
                        inspection.items.len(),
                        not_good
                    );
                }
            }
        }

        Commands::Export { index, output } => {
            println!("📄 car-check - レポート出力\n");

            let archive = Archive::new(Archive::default_path()?);
            let inspections = archive.list();
            let inspection = inspections.get(index).ok_or_else(|| {
                CarCheckError::FileNotFound(format!("点検履歴 #{}", index))
            })?;

            let output = output.unwrap_or_else(|| {
                PathBuf::from(export::report_file_name(
                    &inspection.car_identity.license_plate,
                ))
            });

            export::export_inspection(
                &inspection.items,
                &inspection.car_identity,
                "車両点検レポート",
                &output,
            )?;
            println!("✔ PDFを出力: {}", output.display());
        }

        Commands::Config {
            set_api_key,
            set_sheet_url,
            show,
        } => {
            let mut config = config;

            if let Some(key) = set_api_key {
                config.set_api_key(key)?;
                println!("✔ APIキーを設定しました");
            }

            if let Some(url) = set_sheet_url {
                config.set_sheet_url(url)?;
                println!("✔ Webhook URLを設定しました");
            }

            if show {
                println!("設定:");
                println!("  モデル: {}", config.model);
                println!("  最大画像サイズ: {}px", config.max_image_size);
                println!("  タイムアウト: {}秒", config.timeout_seconds);
                println!(
                    "  APIキー: {}",
                    if config.api_key.is_some() { "設定済み" } else { "未設定" }
                );
                println!(
                    "  Webhook URL: {}",
                    config.sheet_webhook_url.as_deref().unwrap_or("未設定")
                );
                println!(
                    "  写真同梱: {}",
                    if config.include_photos { "有効" } else { "無効" }
                );
            }
        }
    }

    Ok(())
}
