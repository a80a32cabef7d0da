use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "car-check")]
#[command(about = "車両ウォークアラウンド点検AI解析・レポート生成ツール", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 対話式で点検を実施
    Inspect {
        /// 点検部位リストJSONファイル（省略時は標準リスト）
        #[arg(short, long)]
        parts: Option<PathBuf>,

        /// スプレッドシートWebhook URL（設定より優先）
        #[arg(long)]
        sheet_url: Option<String>,

        /// シート送信に写真(base64)を同梱
        #[arg(long)]
        include_photos: bool,
    },

    /// 保存済みの点検履歴を表示
    History,

    /// 保存済みの点検からPDFを生成
    Export {
        /// 履歴のインデックス（0が最新）
        #[arg(short, long, default_value = "0")]
        index: usize,

        /// 出力ファイル（省略時はナンバーと日付から自動命名）
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// 設定を表示/編集
    Config {
        /// Gemini APIキーを設定
        #[arg(long)]
        set_api_key: Option<String>,

        /// スプレッドシートWebhook URLを設定
        #[arg(long)]
        set_sheet_url: Option<String>,

        /// 設定を表示
        #[arg(long)]
        show: bool,
    },
}
