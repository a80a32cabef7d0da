//! 点検チェックリスト
//!
//! 項目の型・ストア・標準の点検部位リスト

mod store;
mod types;

pub use store::{ItemStore, StoreEvent};
pub use types::{CarIdentity, CheckStatus, ChecklistItem, ItemUpdate, Photo, SyncStatus};

use crate::error::{CarCheckError, Result};
use serde::Deserialize;
use std::path::Path;

/// 標準のウォークアラウンド点検部位（前方から時計回り）
pub const CAR_PARTS: &[(&str, &str)] = &[
    ("front-bumper", "フロントバンパー"),
    ("hood", "ボンネット"),
    ("windshield", "フロントガラス"),
    ("front-right-tire", "右前タイヤ"),
    ("right-side-body", "右側面ボディ"),
    ("rear-right-tire", "右後タイヤ"),
    ("rear-bumper", "リアバンパー"),
    ("trunk", "トランク"),
    ("rear-left-tire", "左後タイヤ"),
    ("left-side-body", "左側面ボディ"),
    ("front-left-tire", "左前タイヤ"),
    ("roof", "ルーフ"),
];

/// 標準部位リストで新規チェックリストを作る
pub fn default_store() -> ItemStore {
    ItemStore::new(CAR_PARTS)
}

#[derive(Debug, Deserialize)]
struct PartDef {
    id: String,
    label: String,
}

/// JSONファイルから部位リストを読み込む
///
/// 形式: `[{"id": "front-bumper", "label": "フロントバンパー"}, ...]`
pub fn load_parts_file(path: &Path) -> Result<ItemStore> {
    if !path.exists() {
        return Err(CarCheckError::FileNotFound(path.display().to_string()));
    }

    let content = std::fs::read_to_string(path)?;
    let parts: Vec<PartDef> = serde_json::from_str(&content)
        .map_err(|e| CarCheckError::InvalidParts(format!("{}: {}", path.display(), e)))?;

    if parts.is_empty() {
        return Err(CarCheckError::InvalidParts(format!(
            "{}: 部位が1件もありません",
            path.display()
        )));
    }

    Ok(ItemStore::from_items(
        parts
            .into_iter()
            .map(|p| ChecklistItem::new(p.id, p.label))
            .collect(),
    ))
}
