//! 同期エンジン
//!
//! チェックリストの変更を購読し、同期候補を1件ずつスプレッドシートへ
//! 送信して結果を書き戻す。送信は常にグローバルで同時1件まで。
//!
//! 項目ごとの状態遷移(sync_status):
//! - unsynced → syncing: 候補として選定
//! - syncing → synced: 送信成功
//! - syncing → error: 送信失敗（ネットワークエラー）
//! - error → unsynced: 明示的な再試行、またはstatus/notesの再編集
//! - 任意の状態 → unsynced: status/notesの編集（ストアが強制する）
//!
//! errorの項目は編集か再試行があるまで再送しない（自動リトライなし）。

mod sheet;

pub use sheet::{RowPayload, SheetClient, SheetPush};

use crate::checklist::{CarIdentity, CheckStatus, ChecklistItem, ItemStore, ItemUpdate, StoreEvent, SyncStatus};
use tokio::sync::mpsc::UnboundedReceiver;

/// 同期候補の選定
///
/// リスト順で最初の「点検済み・解析中でない・未同期」の項目を返す
pub fn find_candidate(items: &[ChecklistItem]) -> Option<&ChecklistItem> {
    items.iter().find(|item| {
        item.status != CheckStatus::Unchecked
            && !item.is_analyzing
            && item.sync_status == SyncStatus::Unsynced
    })
}

pub struct SyncEngine<P: SheetPush> {
    pusher: P,
    inspection_id: String,
    include_photos: bool,
    events: UnboundedReceiver<StoreEvent>,
    verbose: bool,
}

impl<P: SheetPush> SyncEngine<P> {
    /// エンジンを構築する
    ///
    /// 送信先(pusher)と点検IDは生成時に明示的に渡す。
    /// eventsはストアのsubscribe()で得た変更通知の受信側
    pub fn new(
        pusher: P,
        inspection_id: impl Into<String>,
        include_photos: bool,
        events: UnboundedReceiver<StoreEvent>,
    ) -> Self {
        Self {
            pusher,
            inspection_id: inspection_id.into(),
            include_photos,
            verbose: false,
            events,
        }
    }

    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// 変更通知が来ていれば候補選定から送信までを実行する
    ///
    /// エッジトリガー: 前回以降に通知が1件もなければ何もしない
    pub async fn run_pending(&mut self, store: &mut ItemStore, identity: &CarIdentity) {
        let mut changed = false;
        while self.events.try_recv().is_ok() {
            changed = true;
        }
        if !changed {
            return;
        }

        self.drain(store, identity).await;
    }

    /// 候補がなくなるまで1件ずつ送信する
    async fn drain(&mut self, store: &mut ItemStore, identity: &CarIdentity) {
        loop {
            // 送信中の項目がある間は新しい送信を始めない
            if store.any_syncing() {
                break;
            }

            let Some(candidate) = find_candidate(store.list()) else {
                break;
            };

            let id = candidate.id.clone();
            let revision = candidate.revision;
            let row = RowPayload::from_item(
                &self.inspection_id,
                now_timestamp(),
                identity,
                candidate,
                self.include_photos,
            );

            store.update(&id, ItemUpdate::new().sync_status(SyncStatus::Syncing));

            if self.verbose {
                println!("  [sync] 送信中: {}", row.part);
            }

            let outcome = match self.pusher.push(&row).await {
                Ok(()) => SyncStatus::Synced,
                Err(e) => {
                    eprintln!("⚠ シート送信に失敗: {} ({})", row.part, e);
                    SyncStatus::Error
                }
            };

            store.resolve_sync(&id, revision, outcome);

            // 自分の書き戻しによる通知は読み捨てる
            while self.events.try_recv().is_ok() {}
        }
    }
}

/// エラーになった項目を再送対象へ戻す
pub fn retry_item(store: &mut ItemStore, id: &str) {
    if store
        .get(id)
        .map(|i| i.sync_status == SyncStatus::Error)
        .unwrap_or(false)
    {
        store.update(id, ItemUpdate::new().sync_status(SyncStatus::Unsynced));
    }
}

fn now_timestamp() -> String {
    chrono::Local::now().format("%Y/%m/%d %H:%M:%S").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checklist::default_store;

    #[test]
    fn test_candidate_skips_unchecked() {
        let store = default_store();
        assert!(find_candidate(store.list()).is_none());
    }

    #[test]
    fn test_candidate_first_in_list_order() {
        let mut store = default_store();
        store.update("hood", ItemUpdate::new().status(CheckStatus::Good));
        store.update("front-bumper", ItemUpdate::new().status(CheckStatus::Good));

        // hoodを先に編集してもリスト順でfront-bumperが先
        let candidate = find_candidate(store.list()).unwrap();
        assert_eq!(candidate.id, "front-bumper");
    }

    #[test]
    fn test_candidate_skips_analyzing() {
        let mut store = default_store();
        store.update(
            "front-bumper",
            ItemUpdate::new().status(CheckStatus::Good).analyzing(true),
        );
        store.update("hood", ItemUpdate::new().status(CheckStatus::Good));

        let candidate = find_candidate(store.list()).unwrap();
        assert_eq!(candidate.id, "hood");
    }

    #[test]
    fn test_candidate_skips_synced_and_error() {
        let mut store = default_store();
        store.update("front-bumper", ItemUpdate::new().status(CheckStatus::Good));
        store.update(
            "front-bumper",
            ItemUpdate::new().sync_status(SyncStatus::Synced),
        );
        store.update("hood", ItemUpdate::new().status(CheckStatus::Good));
        store.update("hood", ItemUpdate::new().sync_status(SyncStatus::Error));

        assert!(find_candidate(store.list()).is_none());
    }

    #[test]
    fn test_retry_only_from_error() {
        let mut store = default_store();
        store.update("hood", ItemUpdate::new().status(CheckStatus::Good));
        store.update("hood", ItemUpdate::new().sync_status(SyncStatus::Synced));

        // syncedの項目は再試行対象にならない
        retry_item(&mut store, "hood");
        assert_eq!(store.get("hood").unwrap().sync_status, SyncStatus::Synced);

        store.update("hood", ItemUpdate::new().sync_status(SyncStatus::Error));
        retry_item(&mut store, "hood");
        assert_eq!(store.get("hood").unwrap().sync_status, SyncStatus::Unsynced);
    }
}
