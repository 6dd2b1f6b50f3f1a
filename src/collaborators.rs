// 外部コラボレーター（送信・プレビュー・通知・キー判定）のインターフェース

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::api_types::FormPayload;
use crate::errors::AppResult;

/// 選択された画像ファイル
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    pub name: String,
    pub path: PathBuf,
}

impl SelectedFile {
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "unknown".to_string());
        Self { name, path }
    }
}

/// キーボードイベント
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: String,
    /// 古いプラットフォーム向けのキーコード
    pub key_code: Option<u32>,
}

impl KeyEvent {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            key_code: None,
        }
    }
}

/// 送信処理。成功か失敗のどちらかで必ず完了する
#[async_trait]
pub trait FormSender: Send + Sync {
    async fn send(&self, payload: FormPayload) -> AppResult<()>;
}

/// 画像プレビューとエフェクトの操作
pub trait PreviewLoader: Send + Sync {
    /// ファイルを読み込みプレビューに反映する。失敗時は PreviewLoad エラー
    fn load_file(&self, file: &SelectedFile) -> AppResult<()>;

    fn reset_effects(&self);

    fn reset_scale(&self);
}

pub trait Notifier: Send + Sync {
    /// 送信成功メッセージ
    fn show_message(&self);

    fn show_alert(&self, text: &str);
}

pub trait KeyClassifier: Send + Sync {
    fn is_escape_key(&self, event: &KeyEvent) -> bool;
}

const ESCAPE_KEY_CODE: u32 = 27;

/// `Escape` / 旧来の `Esc` / キーコード27 をEscapeとみなす
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultKeyClassifier;

impl KeyClassifier for DefaultKeyClassifier {
    fn is_escape_key(&self, event: &KeyEvent) -> bool {
        event.key == "Escape" || event.key == "Esc" || event.key_code == Some(ESCAPE_KEY_CODE)
    }
}
