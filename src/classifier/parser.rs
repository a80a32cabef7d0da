//! APIレスポンスパーサー
//!
//! GeminiのレスポンステキストからJSONオブジェクトを抽出し、
//! OCR結果・判定結果をパースする

use super::PartVerdict;
use crate::checklist::CheckStatus;
use crate::error::{CarCheckError, Result};
use serde::Deserialize;

/// レスポンスからJSONオブジェクト部分を抽出
///
/// 抽出優先順位:
/// 1. ```json ... ``` ブロック
/// 2. 生の {...} オブジェクト
/// 3. エラー
pub fn extract_json(response: &str) -> Result<&str> {
    // ```json ... ``` ブロックを探す
    if let Some(start_marker) = response.find("```json") {
        let start = start_marker + 7; // "```json" の長さ
        if let Some(end_offset) = response[start..].find("```") {
            let end = start + end_offset;
            return Ok(response[start..end].trim());
        }
    }

    // 生の {...} を探す
    if let Some(start) = response.find('{') {
        if let Some(end) = response.rfind('}') {
            if end >= start {
                return Ok(&response[start..=end]);
            }
        }
    }

    Err(CarCheckError::ApiParse("JSONが見つかりません".into()))
}

#[derive(Deserialize)]
struct TextResponse {
    text: String,
}

/// OCRレスポンス `{"text": "..."}` をパース
pub fn parse_text_response(response: &str) -> Result<String> {
    let json_str = extract_json(response)?;
    let parsed: TextResponse = serde_json::from_str(json_str)
        .map_err(|e| CarCheckError::ApiParse(format!("OCR JSONパースエラー: {}", e)))?;
    Ok(parsed.text.trim().to_string())
}

#[derive(Deserialize)]
struct VerdictResponse {
    status: String,
    description: String,
}

/// 判定レスポンス `{"status": "good"|"not-good", "description": "..."}` をパース
///
/// statusが想定の2値以外の場合もパース失敗として扱う
pub fn parse_verdict_response(response: &str) -> Result<PartVerdict> {
    let json_str = extract_json(response)?;
    let parsed: VerdictResponse = serde_json::from_str(json_str)
        .map_err(|e| CarCheckError::ApiParse(format!("判定JSONパースエラー: {}", e)))?;

    let status = match parsed.status.as_str() {
        "good" => CheckStatus::Good,
        "not-good" => CheckStatus::NotGood,
        other => {
            return Err(CarCheckError::ApiParse(format!(
                "不明な判定値: {}",
                other
            )))
        }
    };

    Ok(PartVerdict {
        status,
        description: parsed.description,
    })
}
