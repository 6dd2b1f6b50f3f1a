// Configuration constants for the photo upload form
// マジックナンバーと固定文字列はここに集約する

use std::path::{Path, PathBuf};

use log::warn;
use serde::{Deserialize, Serialize};

use crate::errors::{AppError, AppResult};

/// Application configuration constants
pub mod app {
    /// Name of the application config directory
    pub const CONFIG_DIR_NAME: &str = "photo_upload_form";

    /// Limits file name
    pub const LIMITS_FILENAME: &str = "limits.json";
}

/// Hashtag-related configuration constants
pub mod hashtags {
    /// Maximum number of hashtags in one field
    pub const MAX_QUANTITY: usize = 5;

    /// Maximum hashtag length including the leading `#`
    pub const MAX_LENGTH: usize = 20;

    /// Leading character of every hashtag
    pub const PREFIX: char = '#';
}

/// Comment-related configuration constants
pub mod comments {
    /// Maximum comment length in characters
    pub const MAX_LENGTH: usize = 140;
}

/// File extension filters
pub mod file_filters {
    /// Image file extensions accepted by the preview
    pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp"];
}

/// UI text constants
pub mod ui_text {
    /// Submit button label while idle
    pub const SUBMIT_IDLE: &str = "Save";

    /// Submit button label while a send is in flight
    pub const SUBMIT_SENDING: &str = "Saving...";
}

/// フォームの検証上限（外部から注入可能）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FormLimits {
    pub max_hashtag_quantity: usize,
    pub max_hashtag_length: usize,
    pub max_comment_length: usize,
}

impl Default for FormLimits {
    fn default() -> Self {
        Self {
            max_hashtag_quantity: hashtags::MAX_QUANTITY,
            max_hashtag_length: hashtags::MAX_LENGTH,
            max_comment_length: comments::MAX_LENGTH,
        }
    }
}

impl FormLimits {
    /// JSON文字列から読み込む。欠けているキーはデフォルト値になる
    pub fn from_json_str(json: &str) -> AppResult<Self> {
        let limits: FormLimits = serde_json::from_str(json)?;
        limits.validate()?;
        Ok(limits)
    }

    /// JSONファイルから読み込む
    pub fn load(path: &Path) -> AppResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    /// 設定ディレクトリの limits.json を読み込み、無ければデフォルト値を使う
    pub fn load_or_default() -> Self {
        Self::load_or_default_from(Self::default_path().as_deref())
    }

    /// 読み込めない場合は警告を出してデフォルト値にフォールバックする
    pub fn load_or_default_from(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            return Self::default();
        };

        if !path.exists() {
            return Self::default();
        }

        match Self::load(path) {
            Ok(limits) => limits,
            Err(e) => {
                let path_display = path.display();
                warn!("Failed to load form limits from {path_display}, using defaults: {e}");
                Self::default()
            }
        }
    }

    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(app::CONFIG_DIR_NAME).join(app::LIMITS_FILENAME))
    }

    pub fn validate(&self) -> AppResult<()> {
        if self.max_hashtag_quantity == 0 {
            return Err(AppError::config("maxHashtagQuantity must be positive"));
        }
        // `#` と最低1文字が必要
        if self.max_hashtag_length < 2 {
            return Err(AppError::config("maxHashtagLength must be at least 2"));
        }
        if self.max_comment_length == 0 {
            return Err(AppError::config("maxCommentLength must be positive"));
        }
        Ok(())
    }
}
