use thiserror::Error;

#[derive(Error, Debug)]
pub enum CarCheckError {
    #[error("設定エラー: {0}")]
    Config(String),

    #[error("APIキーが設定されていません。`car-check config --set-api-key YOUR_KEY` で設定してください")]
    MissingApiKey,

    #[error("ファイルが見つかりません: {0}")]
    FileNotFound(String),

    #[error("画像読み込みエラー: {0}")]
    ImageLoad(String),

    #[error("API呼び出しエラー: {0}")]
    ApiCall(String),

    #[error("APIレスポンスのパースに失敗: {0}")]
    ApiParse(String),

    #[error("シート送信エラー: {0}")]
    SheetPush(String),

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error("PDF生成エラー: {0}")]
    PdfGeneration(String),

    #[error("未点検の項目が残っています: {0}")]
    ExportBlocked(String),

    #[error("点検項目リストが不正: {0}")]
    InvalidParts(String),

    #[error("CLI実行エラー: {0}")]
    CliExecution(String),
}

pub type Result<T> = std::result::Result<T, CarCheckError>;
