//! レポートエクスポート
//!
//! 点検結果をPDFへ書き出す。全項目が点検済みになるまで
//! エクスポートは拒否する。

pub mod pdf;

use crate::checklist::{CarIdentity, CheckStatus, ChecklistItem};
use crate::error::{CarCheckError, Result};
use std::path::Path;

/// 既定の出力ファイル名
///
/// 例: `walk-around-check-品川300あ12-34-2026-08-07.pdf`
pub fn report_file_name(license_plate: &str) -> String {
    let plate = license_plate.trim();
    let plate = if plate.is_empty() {
        "車両".to_string()
    } else {
        // 空白はファイル名向けに詰める
        plate.split_whitespace().collect::<Vec<_>>().join("")
    };
    let date = chrono::Local::now().format("%Y-%m-%d");
    format!("walk-around-check-{}-{}.pdf", plate, date)
}

/// 点検結果をPDFへエクスポートする
///
/// 未点検の項目が残っている間は拒否する
pub fn export_inspection(
    items: &[ChecklistItem],
    identity: &CarIdentity,
    title: &str,
    output_path: &Path,
) -> Result<()> {
    let unchecked = items
        .iter()
        .filter(|i| i.status == CheckStatus::Unchecked)
        .count();
    if unchecked > 0 {
        return Err(CarCheckError::ExportBlocked(format!("残り{}件", unchecked)));
    }

    pdf::generate_pdf(items, identity, title, output_path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_file_name_with_plate() {
        let name = report_file_name("品川 300 あ 12-34");
        assert!(name.starts_with("walk-around-check-品川300あ12-34-"));
        assert!(name.ends_with(".pdf"));
    }

    #[test]
    fn test_report_file_name_without_plate() {
        let name = report_file_name("  ");
        assert!(name.starts_with("walk-around-check-車両-"));
    }
}
