use crate::checklist::{CarIdentity, CheckStatus, ChecklistItem};
use crate::error::{CarCheckError, Result};
use printpdf::*;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

const A4_WIDTH_MM: f32 = 210.0;
const A4_HEIGHT_MM: f32 = 297.0;
const MARGIN_MM: f32 = 15.0;
const HEADER_HEIGHT_MM: f32 = 30.0;
const ROW_HEIGHT_MM: f32 = 14.0;

pub fn generate_pdf(
    items: &[ChecklistItem],
    identity: &CarIdentity,
    title: &str,
    output_path: &Path,
) -> Result<()> {
    let (doc, page1, layer1) = PdfDocument::new(title, Mm(A4_WIDTH_MM), Mm(A4_HEIGHT_MM), "Layer 1");

    // TODO: 日本語フォント埋め込み（内蔵Helveticaは和文グリフを持たない）
    let font = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| CarCheckError::PdfGeneration(format!("フォント追加エラー: {:?}", e)))?;
    let font_bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|e| CarCheckError::PdfGeneration(format!("フォント追加エラー: {:?}", e)))?;

    let mut layer = doc.get_page(page1).get_layer(layer1);

    // ヘッダー
    let mut y = A4_HEIGHT_MM - MARGIN_MM;
    layer.use_text(title, 16.0, Mm(MARGIN_MM), Mm(y), &font_bold);
    y -= 8.0;
    layer.use_text(
        format!("License plate: {}", or_dash(&identity.license_plate)),
        10.0,
        Mm(MARGIN_MM),
        Mm(y),
        &font,
    );
    y -= 6.0;
    layer.use_text(
        format!("Odometer: {}", or_dash(&identity.odometer)),
        10.0,
        Mm(MARGIN_MM),
        Mm(y),
        &font,
    );
    layer.use_text(
        chrono::Local::now().format("%Y-%m-%d").to_string(),
        10.0,
        Mm(A4_WIDTH_MM - MARGIN_MM - 30.0),
        Mm(A4_HEIGHT_MM - MARGIN_MM),
        &font,
    );

    // 項目行
    let mut y = A4_HEIGHT_MM - MARGIN_MM - HEADER_HEIGHT_MM;
    for (index, item) in items.iter().enumerate() {
        if y < MARGIN_MM + ROW_HEIGHT_MM {
            let (page, new_layer) = doc.add_page(Mm(A4_WIDTH_MM), Mm(A4_HEIGHT_MM), "Layer 1");
            layer = doc.get_page(page).get_layer(new_layer);
            y = A4_HEIGHT_MM - MARGIN_MM;
        }

        layer.use_text(
            format!("{}. {}", index + 1, item.label),
            11.0,
            Mm(MARGIN_MM),
            Mm(y),
            &font_bold,
        );
        layer.use_text(
            verdict_text(item.status),
            11.0,
            Mm(A4_WIDTH_MM - MARGIN_MM - 30.0),
            Mm(y),
            &font_bold,
        );
        y -= 6.0;
        layer.use_text(
            truncate(&item.notes, 90),
            9.0,
            Mm(MARGIN_MM + 5.0),
            Mm(y),
            &font,
        );
        y -= ROW_HEIGHT_MM - 6.0;
    }

    // 保存
    let file = File::create(output_path)?;
    doc.save(&mut BufWriter::new(file))
        .map_err(|e| CarCheckError::PdfGeneration(format!("PDF保存エラー: {:?}", e)))?;

    Ok(())
}

fn verdict_text(status: CheckStatus) -> &'static str {
    match status {
        CheckStatus::Good => "GOOD",
        CheckStatus::NotGood => "NOT GOOD",
        CheckStatus::Unchecked => "-",
    }
}

fn or_dash(value: &str) -> &str {
    if value.trim().is_empty() {
        "-"
    } else {
        value
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let cut: String = text.chars().take(max_chars).collect();
        format!("{}...", cut)
    }
}
