//! チェックリストストア
//!
//! 全項目を所有する唯一のコンテナ。更新は部分更新(ItemUpdate)の
//! シャローマージで行い、変更のたびに購読者へ通知を送る。
//! 同期エンジンはこの通知を購読して候補選定をやり直す。

use super::types::{ChecklistItem, ItemUpdate, SyncStatus};
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};

/// ストア変更通知
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreEvent {
    Changed,
}

#[derive(Debug, Default)]
pub struct ItemStore {
    items: Vec<ChecklistItem>,
    subscribers: Vec<UnboundedSender<StoreEvent>>,
}

impl ItemStore {
    /// (id, ラベル) の並びから新規チェックリストを作る。並び順は以後不変
    pub fn new(parts: &[(&str, &str)]) -> Self {
        Self::from_items(
            parts
                .iter()
                .map(|(id, label)| ChecklistItem::new(*id, *label))
                .collect(),
        )
    }

    pub fn from_items(items: Vec<ChecklistItem>) -> Self {
        Self {
            items,
            subscribers: Vec::new(),
        }
    }

    /// 変更通知の購読を開始する
    pub fn subscribe(&mut self) -> UnboundedReceiver<StoreEvent> {
        let (tx, rx) = unbounded_channel();
        self.subscribers.push(tx);
        rx
    }

    /// 部分更新を適用する。idが存在しなければ何もしない
    ///
    /// status/notesを含む更新は「編集」として扱い、リビジョンを進めて
    /// 同期状態をunsyncedへ戻す。更新が同期状態を明示する場合は
    /// そちらを優先する（同期エンジンの状態遷移のみが使う）
    pub fn update(&mut self, id: &str, update: ItemUpdate) {
        let Some(item) = self.items.iter_mut().find(|i| i.id == id) else {
            return;
        };

        let edited = update.status.is_some() || update.notes.is_some();

        if let Some(photo) = update.photo {
            item.photo = Some(photo);
        }
        if let Some(status) = update.status {
            item.status = status;
        }
        if let Some(notes) = update.notes {
            item.notes = notes;
        }
        if let Some(flag) = update.is_analyzing {
            item.is_analyzing = flag;
        }

        if edited {
            item.revision += 1;
            item.sync_status = SyncStatus::Unsynced;
        }
        if let Some(sync_status) = update.sync_status {
            item.sync_status = sync_status;
        }

        self.notify();
    }

    /// 同期完了を反映する
    ///
    /// 送信を組み立てた時点のリビジョンと現在のリビジョンが一致する
    /// 場合のみ反映し、不一致（送信中に編集された）なら破棄してfalseを返す
    pub fn resolve_sync(&mut self, id: &str, revision: u64, outcome: SyncStatus) -> bool {
        let Some(item) = self.items.iter_mut().find(|i| i.id == id) else {
            return false;
        };

        if item.revision != revision {
            return false;
        }

        item.sync_status = outcome;
        self.notify();
        true
    }

    /// 現在の全項目（作成時の並び順のまま）
    pub fn list(&self) -> &[ChecklistItem] {
        &self.items
    }

    pub fn get(&self, id: &str) -> Option<&ChecklistItem> {
        self.items.iter().find(|i| i.id == id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// 全項目が点検済みか（エクスポート可否の判定に使う）
    pub fn all_checked(&self) -> bool {
        self.items
            .iter()
            .all(|i| i.status != super::types::CheckStatus::Unchecked)
    }

    pub fn any_syncing(&self) -> bool {
        self.items
            .iter()
            .any(|i| i.sync_status == SyncStatus::Syncing)
    }

    fn notify(&mut self) {
        self.subscribers
            .retain(|tx| tx.send(StoreEvent::Changed).is_ok());
    }
}
