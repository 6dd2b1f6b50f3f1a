use thiserror::Error;

/// フォーム全体で使用する統一エラー型
#[derive(Error, Debug)]
pub enum AppError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Validation error: {field} - {message}")]
    Validation { field: String, message: String },

    #[error("Submission rejected: {0}")]
    SubmissionRejected(String),

    #[error("Preview load failed: {0}")]
    PreviewLoad(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    // Lock errors keep the original message without a prefix
    #[error("{0}")]
    StateLock(String),
}

impl AppError {
    /// バリデーションエラーを作成
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// 送信失敗エラーを作成
    pub fn submission_rejected(message: impl Into<String>) -> Self {
        Self::SubmissionRejected(message.into())
    }

    /// プレビュー読み込みエラーを作成
    pub fn preview_load(message: impl Into<String>) -> Self {
        Self::PreviewLoad(message.into())
    }

    /// 設定エラーを作成
    pub fn config(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// 状態ロックエラーを作成
    pub fn state_lock(message: impl Into<String>) -> Self {
        Self::StateLock(message.into())
    }
}

/// フォーム全体で使用するResult型
pub type AppResult<T> = Result<T, AppError>;

/// エラーのカテゴリ分類
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// ユーザー操作エラー（修正可能）
    UserError,
    /// システムエラー（再試行可能）
    SystemError,
    /// 設定エラー（設定変更が必要）
    ConfigError,
}

impl AppError {
    /// エラーのカテゴリを取得
    pub fn category(&self) -> ErrorCategory {
        match self {
            AppError::Validation { .. } => ErrorCategory::UserError,
            AppError::PreviewLoad(_) => ErrorCategory::UserError,
            AppError::Configuration(_) => ErrorCategory::ConfigError,
            AppError::SubmissionRejected(_) => ErrorCategory::SystemError,
            AppError::Io(_) => ErrorCategory::SystemError,
            AppError::Serialization(_) => ErrorCategory::SystemError,
            AppError::StateLock(_) => ErrorCategory::SystemError,
        }
    }

    /// ユーザー向けメッセージを取得
    pub fn user_message(&self) -> String {
        match self {
            AppError::Io(_) => "Could not read the file. Check its permissions.".to_string(),
            AppError::Serialization(_) => "Could not convert the form data.".to_string(),
            AppError::Validation { field, message } => format!("{field}: {message}"),
            AppError::SubmissionRejected(_) => {
                "Could not upload the photo. Please try again.".to_string()
            }
            AppError::PreviewLoad(msg) => msg.clone(),
            AppError::Configuration(msg) => format!("Configuration error: {msg}"),
            AppError::StateLock(msg) => msg.clone(),
        }
    }

    /// 再試行可能かどうか
    pub fn is_retryable(&self) -> bool {
        matches!(self.category(), ErrorCategory::SystemError)
    }
}
