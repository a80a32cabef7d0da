//! 点検アーカイブ
//!
//! 完了した点検のスナップショットをJSONファイルへ永続化する。
//! 追記専用で、保存のたびにリスト全体を書き直す（新しい順）。

use crate::checklist::{CarIdentity, ChecklistItem};
use crate::error::{CarCheckError, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

const ARCHIVE_FILE_NAME: &str = "inspections.json";

/// エクスポート時点の点検スナップショット
///
/// 作成後は変更しない
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedInspection {
    pub id: String,
    pub date: String,
    pub car_identity: CarIdentity,
    pub items: Vec<ChecklistItem>,
}

impl SavedInspection {
    /// 現在の状態からスナップショットを取る
    pub fn take(inspection_id: &str, identity: &CarIdentity, items: &[ChecklistItem]) -> Self {
        Self {
            id: inspection_id.to_string(),
            date: chrono::Local::now().to_rfc3339(),
            car_identity: identity.clone(),
            items: items.to_vec(),
        }
    }
}

/// アーカイブファイルの構造
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchiveFile {
    /// バージョン（互換性チェック用）
    version: u32,
    /// 点検スナップショット（新しい順）
    inspections: Vec<SavedInspection>,
}

impl ArchiveFile {
    const CURRENT_VERSION: u32 = 1;
}

impl Default for ArchiveFile {
    fn default() -> Self {
        Self {
            version: Self::CURRENT_VERSION,
            inspections: Vec::new(),
        }
    }
}

pub struct Archive {
    path: PathBuf,
}

impl Archive {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// 既定の保存先 (~/.config/car-check/inspections.json)
    pub fn default_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| CarCheckError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home
            .join(".config")
            .join("car-check")
            .join(ARCHIVE_FILE_NAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// スナップショットを先頭に追加して全体を保存する
    pub fn save(&self, snapshot: SavedInspection) -> Result<()> {
        let mut file = self.load_file();
        file.inspections.insert(0, snapshot);

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let out = File::create(&self.path)?;
        let writer = BufWriter::new(out);
        serde_json::to_writer_pretty(writer, &file)?;
        Ok(())
    }

    /// 保存済みの点検一覧（新しい順）
    pub fn list(&self) -> Vec<SavedInspection> {
        self.load_file().inspections
    }

    /// ファイルを読み込む。欠損・破損・バージョン不一致は空として扱う
    fn load_file(&self) -> ArchiveFile {
        if !self.path.exists() {
            return ArchiveFile::default();
        }

        let file = match File::open(&self.path) {
            Ok(f) => f,
            Err(_) => return ArchiveFile::default(),
        };

        let reader = BufReader::new(file);
        match serde_json::from_reader::<_, ArchiveFile>(reader) {
            Ok(archive) => {
                if archive.version != ArchiveFile::CURRENT_VERSION {
                    eprintln!("アーカイブのバージョンが一致しません。空として扱います");
                    return ArchiveFile::default();
                }
                archive
            }
            Err(_) => ArchiveFile::default(),
        }
    }
}
