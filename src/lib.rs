//! car-check-rust
//!
//! 車両ウォークアラウンド点検ツール:
//! 部位ごとの写真をAIで判定し、チェックリストに集約、
//! スプレッドシートへ同期し、PDFレポートを出力する

pub mod archive;
pub mod checklist;
pub mod classifier;
pub mod cli;
pub mod config;
pub mod error;
pub mod export;
pub mod session;
pub mod sync;

pub use error::{CarCheckError, Result};
