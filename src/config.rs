use crate::error::{CarCheckError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_key: Option<String>,
    pub sheet_webhook_url: Option<String>,
    pub model: String,
    pub max_image_size: u32,
    pub timeout_seconds: u64,
    /// シート送信時に写真(base64)も同梱するか
    pub include_photos: bool,
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| CarCheckError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("car-check").join("config.json"))
    }

    /// APIキー取得（環境変数を優先）
    pub fn get_api_key(&self) -> Result<String> {
        if let Ok(key) = std::env::var("GEMINI_API_KEY") {
            if !key.trim().is_empty() {
                return Ok(key);
            }
        }

        self.api_key.clone().ok_or(CarCheckError::MissingApiKey)
    }

    pub fn set_api_key(&mut self, key: String) -> Result<()> {
        self.api_key = Some(key);
        self.save()
    }

    pub fn set_sheet_url(&mut self, url: String) -> Result<()> {
        self.sheet_webhook_url = Some(url);
        self.save()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            sheet_webhook_url: None,
            model: "gemini-2.5-flash".into(),
            max_image_size: 1568,
            timeout_seconds: 60,
            include_photos: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.api_key.is_none());
        assert!(config.sheet_webhook_url.is_none());
        assert_eq!(config.model, "gemini-2.5-flash");
        assert!(!config.include_photos);
    }

    #[test]
    fn test_config_deserialize_partial() {
        // 旧バージョンの設定ファイル（フィールド欠け）も読めること
        let json = r#"{"api_key": "test-key"}"#;
        let config: Config = serde_json::from_str(json).expect("デシリアライズ失敗");
        assert_eq!(config.api_key.as_deref(), Some("test-key"));
        assert_eq!(config.model, "gemini-2.5-flash");
        assert_eq!(config.timeout_seconds, 60);
    }

    #[test]
    fn test_config_roundtrip() {
        let mut config = Config::default();
        config.sheet_webhook_url = Some("https://script.google.com/macros/s/xxx/exec".into());
        config.include_photos = true;

        let json = serde_json::to_string(&config).expect("シリアライズ失敗");
        let restored: Config = serde_json::from_str(&json).expect("デシリアライズ失敗");
        assert_eq!(restored.sheet_webhook_url, config.sheet_webhook_url);
        assert!(restored.include_photos);
    }
}
