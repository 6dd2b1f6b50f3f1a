// 写真アップロードフォームの検証と送信ライフサイクル
// DOM操作は collaborators のトレイト越しに外部へ委譲する

pub mod api_types;
pub mod collaborators;
pub mod comment_validator;
pub mod config;
pub mod errors;
pub mod form_validation;
pub mod hashtag_validator;
pub mod modal;
pub mod submission;
pub mod upload_form;

pub use api_types::{FieldErrors, FormPayload, ValidationVerdict};
pub use collaborators::{
    DefaultKeyClassifier, FormSender, KeyClassifier, KeyEvent, Notifier, PreviewLoader,
    SelectedFile,
};
pub use config::FormLimits;
pub use errors::{AppError, AppResult};
pub use form_validation::FormField;
pub use modal::{CloseOutcome, FocusTarget, KeyOutcome, ModalVisibility, OpenOutcome};
pub use submission::{SubmissionState, SubmitButton, SubmitLabel, SubmitOutcome};
pub use upload_form::{FormCollaborators, UploadForm};

/// ロギングを初期化する（複数回呼んでも安全）
pub fn init_logging() {
    // RUST_LOG が未設定なら info 以上を出す
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .try_init();
}
