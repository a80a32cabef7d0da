//! Gemini API連携
//!
//! generateContentエンドポイントへ画像＋プロンプトを送信する。
//! レスポンスはJSON限定(responseMimeType)で受け取り、
//! 抽出・パースはparserモジュールが行う。

use super::{classify_prompt, parser, FieldKind, PartVerdict};
use crate::checklist::Photo;
use crate::error::{CarCheckError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Gemini APIリクエスト
#[derive(Serialize)]
struct GeminiRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum Part {
    Text { text: String },
    InlineData { inline_data: InlineData },
}

#[derive(Serialize)]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Serialize)]
struct GenerationConfig {
    temperature: f32,
    #[serde(rename = "responseMimeType")]
    response_mime_type: String,
}

/// Gemini APIレスポンス
#[derive(Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: ResponseContent,
}

#[derive(Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    text: String,
}

pub struct GeminiClient {
    api_key: String,
    model: String,
    http: reqwest::Client,
}

impl GeminiClient {
    pub fn new(api_key: String, model: String, timeout_seconds: u64) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .build()
            .map_err(|e| CarCheckError::ApiCall(format!("HTTPクライアント初期化失敗: {}", e)))?;

        Ok(Self {
            api_key,
            model,
            http,
        })
    }

    /// generateContent呼び出し（共通処理）
    async fn generate(&self, prompt: String, photo: &Photo) -> Result<String> {
        let request = GeminiRequest {
            contents: vec![Content {
                parts: vec![
                    Part::Text { text: prompt },
                    Part::InlineData {
                        inline_data: InlineData {
                            mime_type: photo.mime_type.clone(),
                            data: photo.base64_data(),
                        },
                    },
                ],
            }],
            generation_config: GenerationConfig {
                temperature: 0.1,
                response_mime_type: "application/json".to_string(),
            },
        };

        let url = format!(
            "{}/{}:generateContent?key={}",
            GEMINI_API_BASE, self.model, self.api_key
        );

        let response = self
            .http
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| CarCheckError::ApiCall(e.to_string()))?;

        if !response.status().is_success() {
            return Err(CarCheckError::ApiCall(format!(
                "APIステータス {}",
                response.status()
            )));
        }

        let payload: GeminiResponse = response
            .json()
            .await
            .map_err(|e| CarCheckError::ApiParse(e.to_string()))?;

        payload
            .candidates
            .first()
            .and_then(|c| c.content.parts.first())
            .map(|p| p.text.clone())
            .ok_or_else(|| CarCheckError::ApiParse("空のレスポンス".into()))
    }

    /// OCR抽出（ナンバープレート/走行距離計）
    ///
    /// 失敗は空文字ではなくErrで返す。呼び出し側は手動入力への
    /// フォールバックを提示する
    pub async fn extract_text(&self, photo: &Photo, kind: FieldKind) -> Result<String> {
        let response = self.generate(kind.prompt().to_string(), photo).await?;
        parser::parse_text_response(&response)
    }

    /// 部位の状態判定
    pub async fn classify_part(&self, photo: &Photo, part_label: &str) -> Result<PartVerdict> {
        let response = self.generate(classify_prompt(part_label), photo).await?;
        parser::parse_verdict_response(&response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gemini_request_serialize() {
        let request = GeminiRequest {
            contents: vec![Content {
                parts: vec![Part::Text {
                    text: "テストプロンプト".to_string(),
                }],
            }],
            generation_config: GenerationConfig {
                temperature: 0.1,
                response_mime_type: "application/json".to_string(),
            },
        };

        let json = serde_json::to_string(&request).expect("シリアライズ失敗");
        assert!(json.contains("\"contents\""));
        assert!(json.contains("\"generationConfig\""));
        assert!(json.contains("\"temperature\":0.1"));
        assert!(json.contains("\"responseMimeType\":\"application/json\""));
    }

    #[test]
    fn test_part_inline_data_serialize() {
        let part = Part::InlineData {
            inline_data: InlineData {
                mime_type: "image/jpeg".to_string(),
                data: "base64data".to_string(),
            },
        };
        let json = serde_json::to_string(&part).expect("シリアライズ失敗");
        assert!(json.contains("\"inline_data\""));
        assert!(json.contains("\"mime_type\":\"image/jpeg\""));
        assert!(json.contains("\"data\":\"base64data\""));
    }

    #[test]
    fn test_gemini_response_deserialize() {
        let json = r#"{
            "candidates": [{
                "content": {
                    "parts": [{
                        "text": "{\"status\": \"good\", \"description\": \"損傷なし\"}"
                    }]
                }
            }]
        }"#;

        let response: GeminiResponse = serde_json::from_str(json).expect("デシリアライズ失敗");
        assert_eq!(response.candidates.len(), 1);
        assert!(response.candidates[0].content.parts[0].text.contains("good"));
    }

    #[test]
    fn test_gemini_response_deserialize_empty() {
        let response: GeminiResponse =
            serde_json::from_str(r#"{}"#).expect("デシリアライズ失敗");
        assert!(response.candidates.is_empty());
    }
}
