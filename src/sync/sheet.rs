//! スプレッドシートWebhook連携
//!
//! Google Apps Script等のWebhookへ点検1件分を1行としてPOSTする。

use crate::checklist::{CarIdentity, CheckStatus, ChecklistItem};
use crate::error::{CarCheckError, Result};
use serde::Serialize;
use std::future::Future;

/// シートへ追記する1行分のペイロード
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RowPayload {
    pub inspection_id: String,
    pub timestamp: String,
    pub license_plate: String,
    pub odometer: String,
    pub part: String,
    pub status: CheckStatus,
    pub notes: String,
    /// base64エンコード済み画像データ（写真同梱が有効な場合のみ）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,
}

impl RowPayload {
    pub fn from_item(
        inspection_id: &str,
        timestamp: String,
        identity: &CarIdentity,
        item: &ChecklistItem,
        include_photo: bool,
    ) -> Self {
        Self {
            inspection_id: inspection_id.to_string(),
            timestamp,
            license_plate: or_na(&identity.license_plate),
            odometer: or_na(&identity.odometer),
            part: item.label.clone(),
            status: item.status,
            notes: item.notes.clone(),
            photo: if include_photo {
                item.photo.as_ref().map(|p| p.base64_data())
            } else {
                None
            },
        }
    }
}

fn or_na(value: &str) -> String {
    if value.trim().is_empty() {
        "N/A".to_string()
    } else {
        value.to_string()
    }
}

/// シート送信の差し替え点（テストではモックに差し替える）
pub trait SheetPush {
    fn push(&self, row: &RowPayload) -> impl Future<Output = Result<()>>;
}

pub struct SheetClient {
    url: String,
    http: reqwest::Client,
}

impl SheetClient {
    pub fn new(url: String) -> Self {
        Self {
            url,
            http: reqwest::Client::new(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl SheetPush for SheetClient {
    /// Webhookへ1行送信する
    ///
    /// Apps ScriptのWebhookはレスポンス本文・ステータスが信頼できない
    /// (no-cors相当)。到達＝HTTP交換の完了のみを成功条件とし、
    /// ネットワークレベルの失敗だけをエラーとする
    async fn push(&self, row: &RowPayload) -> Result<()> {
        self.http
            .post(&self.url)
            .json(row)
            .send()
            .await
            .map(|_| ())
            .map_err(|e| CarCheckError::SheetPush(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checklist::Photo;

    fn test_item() -> ChecklistItem {
        let mut item = ChecklistItem::new("hood", "ボンネット");
        item.status = CheckStatus::Good;
        item.notes = "目立つ損傷なし".into();
        item.photo = Some(Photo::new("image/jpeg", vec![1, 2, 3]));
        item
    }

    #[test]
    fn test_payload_serialize_camel_case() {
        let identity = CarIdentity {
            license_plate: "品川 300 あ 12-34".into(),
            odometer: "45120".into(),
        };
        let payload = RowPayload::from_item(
            "2026-08-07T09:00:00Z",
            "2026/08/07 09:00:00".into(),
            &identity,
            &test_item(),
            false,
        );

        let json = serde_json::to_string(&payload).expect("シリアライズ失敗");
        assert!(json.contains("\"inspectionId\":\"2026-08-07T09:00:00Z\""));
        assert!(json.contains("\"licensePlate\":\"品川 300 あ 12-34\""));
        assert!(json.contains("\"part\":\"ボンネット\""));
        assert!(json.contains("\"status\":\"good\""));
        // 写真同梱なしならphotoキー自体を出さない
        assert!(!json.contains("\"photo\""));
    }

    #[test]
    fn test_payload_empty_identity_becomes_na() {
        let payload = RowPayload::from_item(
            "id",
            "ts".into(),
            &CarIdentity::default(),
            &test_item(),
            false,
        );
        assert_eq!(payload.license_plate, "N/A");
        assert_eq!(payload.odometer, "N/A");
    }

    #[test]
    fn test_payload_includes_photo_when_enabled() {
        let payload = RowPayload::from_item(
            "id",
            "ts".into(),
            &CarIdentity::default(),
            &test_item(),
            true,
        );
        assert!(payload.photo.is_some());

        let json = serde_json::to_string(&payload).unwrap();
        assert!(json.contains("\"photo\""));
    }

    #[test]
    fn test_payload_photo_absent_when_item_has_none() {
        let mut item = test_item();
        item.photo = None;
        let payload =
            RowPayload::from_item("id", "ts".into(), &CarIdentity::default(), &item, true);
        assert!(payload.photo.is_none());
    }
}
