//! 点検チェックリストの型定義
//!
//! - ChecklistItem: 1部位分の点検結果（写真・判定・メモ・同期状態）
//! - ItemUpdate: ストアへ渡す部分更新
//! - CarIdentity: 車両識別情報（ナンバープレート・走行距離）
//! - Photo: 画像ペイロード（Data URLとして永続化）

use crate::error::{CarCheckError, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::io::Cursor;
use std::path::Path;

/// 点検判定
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CheckStatus {
    #[default]
    Unchecked,
    Good,
    NotGood,
}

impl CheckStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckStatus::Unchecked => "unchecked",
            CheckStatus::Good => "good",
            CheckStatus::NotGood => "not-good",
        }
    }

    /// 表示用ラベル
    pub fn label(&self) -> &'static str {
        match self {
            CheckStatus::Unchecked => "未点検",
            CheckStatus::Good => "良好",
            CheckStatus::NotGood => "要確認",
        }
    }
}

impl std::fmt::Display for CheckStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// スプレッドシートへの同期状態
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncStatus {
    #[default]
    Unsynced,
    Syncing,
    Synced,
    Error,
}

impl SyncStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncStatus::Unsynced => "unsynced",
            SyncStatus::Syncing => "syncing",
            SyncStatus::Synced => "synced",
            SyncStatus::Error => "error",
        }
    }
}

/// 画像ペイロード
///
/// JSONへは `data:<mime>;base64,<data>` 形式のData URL文字列として出力する
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Photo {
    pub mime_type: String,
    pub data: Vec<u8>,
}

impl Photo {
    pub fn new(mime_type: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            mime_type: mime_type.into(),
            data,
        }
    }

    /// 画像ファイルを読み込む
    ///
    /// 検証を兼ねて一度デコードし、長辺が `max_edge` を超える場合は縮小して
    /// JPEGへ再エンコードする
    pub fn load(path: &Path, max_edge: u32) -> Result<Self> {
        if !path.exists() {
            return Err(CarCheckError::FileNotFound(path.display().to_string()));
        }

        let bytes = std::fs::read(path)?;
        let img = image::load_from_memory(&bytes)
            .map_err(|e| CarCheckError::ImageLoad(format!("{}: {}", path.display(), e)))?;

        let img = if img.width().max(img.height()) > max_edge {
            img.resize(max_edge, max_edge, image::imageops::FilterType::Triangle)
        } else {
            img
        };

        let mut buf = Vec::new();
        img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Jpeg)
            .map_err(|e| CarCheckError::ImageLoad(format!("JPEG再エンコード失敗: {}", e)))?;

        Ok(Self::new("image/jpeg", buf))
    }

    /// base64エンコードしたデータ部分
    pub fn base64_data(&self) -> String {
        STANDARD.encode(&self.data)
    }

    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.base64_data())
    }

    /// Data URLから復元（形式不正はNone）
    pub fn from_data_url(data_url: &str) -> Option<Self> {
        let mime_type = data_url
            .strip_prefix("data:")?
            .split(';')
            .next()
            .filter(|s| !s.is_empty())?
            .to_string();
        let encoded = data_url.split(',').nth(1)?;
        let data = STANDARD.decode(encoded).ok()?;
        Some(Self { mime_type, data })
    }
}

impl Serialize for Photo {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_data_url())
    }
}

impl<'de> Deserialize<'de> for Photo {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Photo::from_data_url(&s).ok_or_else(|| D::Error::custom("不正なData URL形式"))
    }
}

/// チェックリスト1項目
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChecklistItem {
    pub id: String,
    pub label: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo: Option<Photo>,

    #[serde(default)]
    pub status: CheckStatus,

    #[serde(default)]
    pub notes: String,

    /// 解析リクエストが飛行中の間のみtrue
    #[serde(default)]
    pub is_analyzing: bool,

    #[serde(default)]
    pub sync_status: SyncStatus,

    /// status/notesの編集のたびに加算。旧リビジョンの同期完了を破棄するために使う
    #[serde(default)]
    pub revision: u64,
}

impl ChecklistItem {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            photo: None,
            status: CheckStatus::Unchecked,
            notes: String::new(),
            is_analyzing: false,
            sync_status: SyncStatus::Unsynced,
            revision: 0,
        }
    }
}

/// ストアへの部分更新（Someのフィールドのみ適用）
#[derive(Debug, Clone, Default)]
pub struct ItemUpdate {
    pub photo: Option<Photo>,
    pub status: Option<CheckStatus>,
    pub notes: Option<String>,
    pub is_analyzing: Option<bool>,
    pub sync_status: Option<SyncStatus>,
}

impl ItemUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn photo(mut self, photo: Photo) -> Self {
        self.photo = Some(photo);
        self
    }

    pub fn status(mut self, status: CheckStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    pub fn analyzing(mut self, flag: bool) -> Self {
        self.is_analyzing = Some(flag);
        self
    }

    pub fn sync_status(mut self, status: SyncStatus) -> Self {
        self.sync_status = Some(status);
        self
    }
}

/// 車両識別情報
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CarIdentity {
    pub license_plate: String,
    pub odometer: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_status_serialize() {
        assert_eq!(
            serde_json::to_string(&CheckStatus::NotGood).unwrap(),
            r#""not-good""#
        );
        assert_eq!(
            serde_json::to_string(&CheckStatus::Good).unwrap(),
            r#""good""#
        );
        assert_eq!(
            serde_json::to_string(&CheckStatus::Unchecked).unwrap(),
            r#""unchecked""#
        );
    }

    #[test]
    fn test_sync_status_serialize() {
        assert_eq!(
            serde_json::to_string(&SyncStatus::Unsynced).unwrap(),
            r#""unsynced""#
        );
        assert_eq!(
            serde_json::to_string(&SyncStatus::Error).unwrap(),
            r#""error""#
        );
    }

    #[test]
    fn test_photo_data_url_roundtrip() {
        let photo = Photo::new("image/jpeg", vec![0xFF, 0xD8, 0xFF, 0xE0]);
        let url = photo.to_data_url();
        assert!(url.starts_with("data:image/jpeg;base64,"));

        let restored = Photo::from_data_url(&url).expect("Data URL復元失敗");
        assert_eq!(restored, photo);
    }

    #[test]
    fn test_photo_from_data_url_invalid() {
        assert!(Photo::from_data_url("not a data url").is_none());
        assert!(Photo::from_data_url("").is_none());
        assert!(Photo::from_data_url("data:;base64,AAAA").is_none());
    }

    #[test]
    fn test_item_serialize_camel_case() {
        let mut item = ChecklistItem::new("front-bumper", "フロントバンパー");
        item.status = CheckStatus::Good;
        item.notes = "目立つ損傷なし".into();

        let json = serde_json::to_string(&item).expect("シリアライズ失敗");
        assert!(json.contains("\"syncStatus\":\"unsynced\""));
        assert!(json.contains("\"isAnalyzing\":false"));
        assert!(json.contains("\"status\":\"good\""));
        // 写真なしの場合はphotoフィールド自体を出力しない
        assert!(!json.contains("\"photo\""));
    }

    #[test]
    fn test_item_roundtrip_with_photo() {
        let mut item = ChecklistItem::new("hood", "ボンネット");
        item.photo = Some(Photo::new("image/jpeg", vec![1, 2, 3]));
        item.status = CheckStatus::NotGood;
        item.notes = "中央に浅いへこみ".into();
        item.sync_status = SyncStatus::Synced;
        item.revision = 3;

        let json = serde_json::to_string(&item).expect("シリアライズ失敗");
        let restored: ChecklistItem = serde_json::from_str(&json).expect("デシリアライズ失敗");

        assert_eq!(restored.id, item.id);
        assert_eq!(restored.photo, item.photo);
        assert_eq!(restored.status, item.status);
        assert_eq!(restored.notes, item.notes);
        assert_eq!(restored.sync_status, item.sync_status);
        assert_eq!(restored.revision, 3);
    }

    #[test]
    fn test_item_deserialize_minimal() {
        // 旧形式（revision等なし）も読めること
        let json = r#"{"id": "hood", "label": "ボンネット"}"#;
        let item: ChecklistItem = serde_json::from_str(json).expect("デシリアライズ失敗");
        assert_eq!(item.status, CheckStatus::Unchecked);
        assert_eq!(item.sync_status, SyncStatus::Unsynced);
        assert_eq!(item.revision, 0);
        assert!(item.photo.is_none());
    }

    #[test]
    fn test_car_identity_serialize() {
        let identity = CarIdentity {
            license_plate: "品川 300 あ 12-34".into(),
            odometer: "45120".into(),
        };
        let json = serde_json::to_string(&identity).expect("シリアライズ失敗");
        assert!(json.contains("\"licensePlate\""));
        assert!(json.contains("\"odometer\""));
    }
}
