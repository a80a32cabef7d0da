//! 画像分類クライアント
//!
//! 外部のビジョンモデル(Gemini)に写真を渡し、部位の状態判定または
//! 文字抽出(OCR)を受け取る。1回のユーザー操作につき呼び出しは1回、
//! 自動リトライはしない。

mod gemini;
pub mod parser;

pub use gemini::GeminiClient;

use crate::checklist::{CheckStatus, ItemStore, ItemUpdate, Photo};
use crate::error::Result;

/// 解析中にチェックリストへ表示する仮メモ
pub const ANALYZING_NOTE: &str = "画像を解析中...";

/// 分類失敗時の固定メモ
pub const FALLBACK_NOTE: &str = "画像を解析できませんでした。手動で確認してください。";

/// 部位の状態判定結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartVerdict {
    pub status: CheckStatus,
    pub description: String,
}

/// 分類失敗時のフェイルセーフ判定
///
/// 状態不明の部位は「要確認」として人の目に委ねる
pub fn fallback_verdict() -> PartVerdict {
    PartVerdict {
        status: CheckStatus::NotGood,
        description: FALLBACK_NOTE.to_string(),
    }
}

/// OCR対象フィールド
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    LicensePlate,
    Odometer,
}

impl FieldKind {
    pub fn label(&self) -> &'static str {
        match self {
            FieldKind::LicensePlate => "ナンバープレート",
            FieldKind::Odometer => "走行距離計",
        }
    }

    pub fn prompt(&self) -> &'static str {
        match self {
            FieldKind::LicensePlate => {
                "あなたはOCRの専門家です。画像から自動車のナンバープレートを読み取ってください。\
                 プレートに記載された文字のみを返すこと。\
                 回答は {\"text\": \"読み取った文字\"} のJSONのみを出力してください。"
            }
            FieldKind::Odometer => {
                "あなたはOCRの専門家です。画像からオドメーター（走行距離計）の表示値を読み取ってください。\
                 kmやmiなどの単位を除いた数字のみを返すこと。\
                 回答は {\"text\": \"読み取った数値\"} のJSONのみを出力してください。"
            }
        }
    }
}

/// 部位判定プロンプトを組み立てる
pub fn classify_prompt(part_label: &str) -> String {
    format!(
        "あなたは自動車点検の専門家です。この{}の写真を確認し、\
         傷・へこみ・ひび割れ・異常な摩耗がないか調べてください。\
         状態を 'good' または 'not-good' に分類し、簡潔な状態説明を日本語で書いてください。\
         損傷が見当たらない場合はその旨を書くこと。\
         回答は次の形式のJSONのみを出力してください。\n\
         {{\"status\": \"good\" または \"not-good\", \"description\": \"状態の説明\"}}",
        part_label
    )
}

/// 撮影直後の状態をストアへ反映する
///
/// 写真を差し替え、判定を未点検へ戻し、解析中フラグを立てる
pub fn begin_analysis(store: &mut ItemStore, id: &str, photo: Photo) {
    store.update(
        id,
        ItemUpdate::new()
            .photo(photo)
            .status(CheckStatus::Unchecked)
            .notes(ANALYZING_NOTE)
            .analyzing(true),
    );
}

/// 分類結果（または失敗）をストアへ反映する
///
/// 失敗時はフェイルセーフ判定に差し替える。どちらの経路でも
/// 解析中フラグは必ず下ろす
pub fn apply_part_result(store: &mut ItemStore, id: &str, outcome: Result<PartVerdict>) {
    let verdict = outcome.unwrap_or_else(|_| fallback_verdict());
    store.update(
        id,
        ItemUpdate::new()
            .status(verdict.status)
            .notes(verdict.description)
            .analyzing(false),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checklist::{default_store, SyncStatus};
    use crate::error::CarCheckError;

    #[test]
    fn test_classify_prompt_contains_label() {
        let prompt = classify_prompt("フロントバンパー");
        assert!(prompt.contains("フロントバンパー"));
        assert!(prompt.contains("not-good"));
        assert!(prompt.contains("JSON"));
    }

    #[test]
    fn test_begin_analysis_marks_item() {
        let mut store = default_store();
        begin_analysis(&mut store, "hood", Photo::new("image/jpeg", vec![1, 2]));

        let item = store.get("hood").unwrap();
        assert!(item.is_analyzing);
        assert_eq!(item.status, CheckStatus::Unchecked);
        assert_eq!(item.notes, ANALYZING_NOTE);
        assert!(item.photo.is_some());
    }

    #[test]
    fn test_apply_part_result_success() {
        let mut store = default_store();
        begin_analysis(&mut store, "hood", Photo::new("image/jpeg", vec![1]));

        apply_part_result(
            &mut store,
            "hood",
            Ok(PartVerdict {
                status: CheckStatus::Good,
                description: "目立つ損傷なし".into(),
            }),
        );

        let item = store.get("hood").unwrap();
        assert_eq!(item.status, CheckStatus::Good);
        assert_eq!(item.notes, "目立つ損傷なし");
        assert!(!item.is_analyzing);
        // 結果反映で再同期対象になる
        assert_eq!(item.sync_status, SyncStatus::Unsynced);
    }

    #[test]
    fn test_apply_part_result_failure_is_fail_safe() {
        let mut store = default_store();
        begin_analysis(&mut store, "hood", Photo::new("image/jpeg", vec![1]));

        apply_part_result(
            &mut store,
            "hood",
            Err(CarCheckError::ApiCall("接続失敗".into())),
        );

        let item = store.get("hood").unwrap();
        assert_eq!(item.status, CheckStatus::NotGood);
        assert_eq!(item.notes, FALLBACK_NOTE);
        assert!(!item.is_analyzing);
    }
}
