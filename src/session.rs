//! 対話式点検セッション
//!
//! ## 変更履歴
//! - 2026-08-07: 初期作成
//!
//! 1回の車両ウォークアラウンド点検を端末上で進める。
//! 項目の写真解析・手動判定・メモ編集のたびにストアが変更通知を出し、
//! 同期エンジンが未送信の項目をスプレッドシートへ送る。

use crate::archive::{Archive, SavedInspection};
use crate::checklist::{
    self, CarIdentity, CheckStatus, ItemStore, ItemUpdate, Photo, SyncStatus,
};
use crate::classifier::{self, FieldKind, GeminiClient};
use crate::config::Config;
use crate::error::{CarCheckError, Result};
use crate::export;
use crate::sync::{retry_item, SheetClient, SyncEngine};
use dialoguer::Input;
use indicatif::ProgressBar;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub struct SessionOptions {
    pub parts_file: Option<PathBuf>,
    /// 設定より優先するWebhook URL
    pub sheet_url: Option<String>,
    pub include_photos: bool,
    pub verbose: bool,
}

/// セッション操作
enum SessionAction {
    /// 項目を選択（0始まりインデックス）
    Item(usize),
    /// ナンバープレートをスキャン/入力
    Plate,
    /// 走行距離計をスキャン/入力
    Odometer,
    /// 一覧を表示
    List,
    /// 送信エラーの項目を再送対象へ戻す
    Retry,
    /// PDFエクスポート＋アーカイブ保存
    Export,
    /// 終了
    Quit,
    /// 無効な入力
    Unknown,
}

pub async fn run_inspection(config: &Config, options: SessionOptions) -> Result<()> {
    let inspection_id = chrono::Local::now().to_rfc3339();

    let mut store = match &options.parts_file {
        Some(path) => checklist::load_parts_file(path)?,
        None => checklist::default_store(),
    };
    let mut identity = CarIdentity::default();

    let classifier = match config.get_api_key() {
        Ok(key) => Some(GeminiClient::new(
            key,
            config.model.clone(),
            config.timeout_seconds,
        )?),
        Err(_) => {
            println!("⚠ APIキーが未設定のためAI解析は無効です（手動入力のみ）");
            None
        }
    };

    let sheet_url = options
        .sheet_url
        .clone()
        .or_else(|| config.sheet_webhook_url.clone());
    let mut engine = match sheet_url {
        Some(url) => Some(
            SyncEngine::new(
                SheetClient::new(url),
                &inspection_id,
                options.include_photos || config.include_photos,
                store.subscribe(),
            )
            .verbose(options.verbose),
        ),
        None => {
            println!("⚠ Google Sheets連携が未設定です。`car-check config --set-sheet-url URL` で設定できます");
            None
        }
    };

    println!("\n🚗 car-check - 車両ウォークアラウンド点検\n");
    println!("点検部位: {}件", store.len());
    println!("---");
    println!("操作: [番号]項目を点検 [p]ナンバー [o]走行距離 [l]一覧 [r]再送 [e]エクスポート [q]終了");
    println!("---\n");
    print_list(&store);

    loop {
        match prompt_action(store.len())? {
            SessionAction::Item(index) => {
                let id = store.list()[index].id.clone();
                handle_item(&mut store, &id, classifier.as_ref(), config.max_image_size).await?;
                pump(&mut engine, &mut store, &identity).await;
            }
            SessionAction::Plate => {
                scan_identity_field(
                    &mut identity,
                    FieldKind::LicensePlate,
                    classifier.as_ref(),
                    config.max_image_size,
                )
                .await?;
            }
            SessionAction::Odometer => {
                scan_identity_field(
                    &mut identity,
                    FieldKind::Odometer,
                    classifier.as_ref(),
                    config.max_image_size,
                )
                .await?;
            }
            SessionAction::List => {
                print_list(&store);
            }
            SessionAction::Retry => {
                let error_ids: Vec<String> = store
                    .list()
                    .iter()
                    .filter(|i| i.sync_status == SyncStatus::Error)
                    .map(|i| i.id.clone())
                    .collect();
                if error_ids.is_empty() {
                    println!("送信エラーの項目はありません");
                } else {
                    println!("再送対象: {}件", error_ids.len());
                    for id in error_ids {
                        retry_item(&mut store, &id);
                    }
                    pump(&mut engine, &mut store, &identity).await;
                }
            }
            SessionAction::Export => {
                export_and_archive(&store, &identity, &inspection_id)?;
            }
            SessionAction::Quit => {
                let synced = store
                    .list()
                    .iter()
                    .filter(|i| i.sync_status == SyncStatus::Synced)
                    .count();
                println!("\n点検を終了します（同期済み: {}/{}件）", synced, store.len());
                break;
            }
            SessionAction::Unknown => {
                println!("無効な入力です");
            }
        }
    }

    Ok(())
}

/// 同期エンジンに溜まった変更通知を処理させる
async fn pump(
    engine: &mut Option<SyncEngine<SheetClient>>,
    store: &mut ItemStore,
    identity: &CarIdentity,
) {
    if let Some(engine) = engine {
        engine.run_pending(store, identity).await;
    }
}

fn prompt_action(item_count: usize) -> Result<SessionAction> {
    let input: String = Input::new()
        .with_prompt("操作")
        .allow_empty(true)
        .interact_text()
        .map_err(|e| CarCheckError::CliExecution(e.to_string()))?;

    let trimmed = input.trim();
    if let Ok(number) = trimmed.parse::<usize>() {
        if number >= 1 && number <= item_count {
            return Ok(SessionAction::Item(number - 1));
        }
        return Ok(SessionAction::Unknown);
    }

    match trimmed {
        "p" | "P" => Ok(SessionAction::Plate),
        "o" | "O" => Ok(SessionAction::Odometer),
        "l" | "L" | "" => Ok(SessionAction::List),
        "r" | "R" => Ok(SessionAction::Retry),
        "e" | "E" => Ok(SessionAction::Export),
        "q" | "Q" => Ok(SessionAction::Quit),
        _ => Ok(SessionAction::Unknown),
    }
}

/// 項目1件の点検操作
async fn handle_item(
    store: &mut ItemStore,
    id: &str,
    classifier: Option<&GeminiClient>,
    max_image_size: u32,
) -> Result<()> {
    let label = store.get(id).map(|i| i.label.clone()).unwrap_or_default();

    let input: String = Input::new()
        .with_prompt(format!(
            "{} [f]写真解析 [g]良好 [n]要確認 [m]メモ編集 (Enterで戻る)",
            label
        ))
        .allow_empty(true)
        .interact_text()
        .map_err(|e| CarCheckError::CliExecution(e.to_string()))?;

    match input.trim() {
        "f" | "F" => {
            let Some(photo) = prompt_photo(max_image_size)? else {
                return Ok(());
            };

            match classifier {
                Some(client) => {
                    classifier::begin_analysis(store, id, photo.clone());

                    let pb = spinner(format!("{} を解析中...", label));
                    let outcome = client.classify_part(&photo, &label).await;
                    pb.finish_and_clear();

                    if let Err(ref e) = outcome {
                        eprintln!("⚠ 解析に失敗: {}", e);
                    }
                    classifier::apply_part_result(store, id, outcome);

                    if let Some(item) = store.get(id) {
                        println!("  → {} / {}", item.status.label(), item.notes);
                    }
                }
                None => {
                    // AI解析なし: 写真だけ添付して手動判定へ
                    store.update(id, ItemUpdate::new().photo(photo));
                    prompt_manual_verdict(store, id)?;
                }
            }
        }
        "g" | "G" => {
            store.update(id, ItemUpdate::new().status(CheckStatus::Good));
            println!("  → 良好");
        }
        "n" | "N" => {
            store.update(id, ItemUpdate::new().status(CheckStatus::NotGood));
            println!("  → 要確認");
        }
        "m" | "M" => {
            let current = store.get(id).map(|i| i.notes.clone()).unwrap_or_default();
            let notes: String = Input::new()
                .with_prompt("メモ")
                .with_initial_text(current)
                .allow_empty(true)
                .interact_text()
                .map_err(|e| CarCheckError::CliExecution(e.to_string()))?;
            store.update(id, ItemUpdate::new().notes(notes));
        }
        _ => {}
    }

    Ok(())
}

/// 写真ファイルのパスを入力させて読み込む（空入力でキャンセル）
fn prompt_photo(max_image_size: u32) -> Result<Option<Photo>> {
    let path: String = Input::new()
        .with_prompt("写真ファイルのパス")
        .allow_empty(true)
        .interact_text()
        .map_err(|e| CarCheckError::CliExecution(e.to_string()))?;

    let trimmed = path.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    match Photo::load(Path::new(trimmed), max_image_size) {
        Ok(photo) => Ok(Some(photo)),
        Err(e) => {
            eprintln!("⚠ 写真を読み込めません: {}", e);
            Ok(None)
        }
    }
}

fn prompt_manual_verdict(store: &mut ItemStore, id: &str) -> Result<()> {
    let input: String = Input::new()
        .with_prompt("判定 [g]良好 [n]要確認")
        .allow_empty(true)
        .interact_text()
        .map_err(|e| CarCheckError::CliExecution(e.to_string()))?;

    let status = match input.trim() {
        "g" | "G" => CheckStatus::Good,
        "n" | "N" => CheckStatus::NotGood,
        _ => return Ok(()),
    };

    let notes: String = Input::new()
        .with_prompt("メモ")
        .allow_empty(true)
        .interact_text()
        .map_err(|e| CarCheckError::CliExecution(e.to_string()))?;

    store.update(id, ItemUpdate::new().status(status).notes(notes));
    Ok(())
}

/// ナンバープレート/走行距離計のOCRスキャン
///
/// 読み取り失敗時は空値で進めず、手動入力へフォールバックする
async fn scan_identity_field(
    identity: &mut CarIdentity,
    kind: FieldKind,
    classifier: Option<&GeminiClient>,
    max_image_size: u32,
) -> Result<()> {
    let mut scanned: Option<String> = None;

    if let Some(client) = classifier {
        if let Some(photo) = prompt_photo(max_image_size)? {
            let pb = spinner(format!("{} を読み取り中...", kind.label()));
            let result = client.extract_text(&photo, kind).await;
            pb.finish_and_clear();

            match result {
                Ok(text) => scanned = Some(text),
                Err(e) => {
                    eprintln!("⚠ {} の読み取りに失敗: {}", kind.label(), e);
                    eprintln!("  もう一度スキャンするか、手動で入力してください");
                }
            }
        }
    }

    let value = match scanned {
        Some(text) => text,
        None => Input::new()
            .with_prompt(format!("{}（手動入力）", kind.label()))
            .allow_empty(true)
            .interact_text()
            .map_err(|e| CarCheckError::CliExecution(e.to_string()))?,
    };

    match kind {
        FieldKind::LicensePlate => identity.license_plate = value.trim().to_string(),
        FieldKind::Odometer => identity.odometer = value.trim().to_string(),
    }
    println!("  → {}: {}", kind.label(), kind_value(identity, kind));

    Ok(())
}

fn kind_value<'a>(identity: &'a CarIdentity, kind: FieldKind) -> &'a str {
    match kind {
        FieldKind::LicensePlate => &identity.license_plate,
        FieldKind::Odometer => &identity.odometer,
    }
}

/// PDFエクスポートとアーカイブ保存
fn export_and_archive(store: &ItemStore, identity: &CarIdentity, inspection_id: &str) -> Result<()> {
    if !store.all_checked() {
        let remaining = store
            .list()
            .iter()
            .filter(|i| i.status == CheckStatus::Unchecked)
            .count();
        println!("✗ 全項目の点検が完了するまでエクスポートできません（残り{}件）", remaining);
        return Ok(());
    }

    let file_name = export::report_file_name(&identity.license_plate);
    let output_path = PathBuf::from(&file_name);

    match export::export_inspection(store.list(), identity, "車両点検レポート", &output_path) {
        Ok(()) => {
            println!("✔ PDFを出力: {}", output_path.display());
        }
        Err(e) => {
            eprintln!("✗ PDF生成に失敗しました: {}", e);
            return Ok(());
        }
    }

    let snapshot = SavedInspection::take(inspection_id, identity, store.list());
    let archive = Archive::new(Archive::default_path()?);
    archive.save(snapshot)?;
    println!("✔ 点検履歴へ保存しました");

    Ok(())
}

fn print_list(store: &ItemStore) {
    for (index, item) in store.list().iter().enumerate() {
        let status_mark = match item.status {
            CheckStatus::Good => "○",
            CheckStatus::NotGood => "×",
            CheckStatus::Unchecked => "・",
        };
        let sync_mark = match item.sync_status {
            SyncStatus::Synced => "✓",
            SyncStatus::Syncing => "⟳",
            SyncStatus::Error => "!",
            SyncStatus::Unsynced => " ",
        };
        let notes = if item.notes.is_empty() {
            String::new()
        } else {
            let cut: String = item.notes.chars().take(40).collect();
            format!("  {}", cut)
        };
        println!("{:>2}. {} {} {}{}", index + 1, status_mark, sync_mark, item.label, notes);
    }
    println!();
}

fn spinner(message: String) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.enable_steady_tick(Duration::from_millis(120));
    pb.set_message(message);
    pb
}
