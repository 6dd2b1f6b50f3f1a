// 写真アップロードフォームのイベントハンドラ
// 各コントローラーを束ね、入力・キー・クリック・送信イベントを受け付ける

use std::sync::{Arc, Mutex, MutexGuard};

use crate::api_types::{FieldErrors, FormPayload, ValidationVerdict};
use crate::collaborators::{
    FormSender, KeyClassifier, KeyEvent, Notifier, PreviewLoader, SelectedFile,
};
use crate::config::FormLimits;
use crate::errors::{AppError, AppResult};
use crate::form_validation::{FormField, FormFields, FormValidationCoordinator};
use crate::modal::{
    CloseOutcome, CloseReason, FocusTarget, KeyOutcome, ModalLifecycleController,
    ModalVisibility, OpenOutcome,
};
use crate::submission::{SubmissionController, SubmissionState, SubmitButton, SubmitOutcome};

/// フォームが利用する外部コラボレーター一式
pub struct FormCollaborators {
    pub sender: Arc<dyn FormSender>,
    pub preview: Arc<dyn PreviewLoader>,
    pub notifier: Arc<dyn Notifier>,
    pub key_classifier: Arc<dyn KeyClassifier>,
}

struct FormSession {
    coordinator: FormValidationCoordinator,
    modal: ModalLifecycleController,
    selected_file: Option<SelectedFile>,
}

impl FormSession {
    fn close(
        &mut self,
        reason: CloseReason,
        submission: &SubmissionController,
    ) -> AppResult<CloseOutcome> {
        let outcome = self.modal.close(reason, &mut self.coordinator, submission)?;
        if outcome == CloseOutcome::Closed {
            self.selected_file = None;
        }
        Ok(outcome)
    }
}

// ロックの取得順は常に session -> submission
pub struct UploadForm {
    session: Mutex<FormSession>,
    submission: SubmissionController,
    notifier: Arc<dyn Notifier>,
}

impl UploadForm {
    pub fn new(limits: &FormLimits, collaborators: FormCollaborators) -> AppResult<Self> {
        let FormCollaborators {
            sender,
            preview,
            notifier,
            key_classifier,
        } = collaborators;

        let session = FormSession {
            coordinator: FormValidationCoordinator::new(limits)?,
            modal: ModalLifecycleController::new(preview, notifier.clone(), key_classifier),
            selected_file: None,
        };

        Ok(Self {
            session: Mutex::new(session),
            submission: SubmissionController::new(sender),
            notifier,
        })
    }

    fn lock_session(&self) -> AppResult<MutexGuard<'_, FormSession>> {
        self.session
            .lock()
            .map_err(|e| AppError::state_lock(format!("Form session lock error: {e}")))
    }

    /// ファイル選択イベント
    pub fn select_file(&self, file: SelectedFile) -> AppResult<OpenOutcome> {
        let mut session = self.lock_session()?;
        let FormSession {
            coordinator,
            modal,
            selected_file,
        } = &mut *session;

        let outcome = modal.open(&file, coordinator, &self.submission)?;
        if outcome != OpenOutcome::PreviewFailed {
            *selected_file = Some(file);
        }
        Ok(outcome)
    }

    /// 入力イベント
    pub fn input(&self, field: FormField, value: impl Into<String>) -> AppResult<ValidationVerdict> {
        let mut session = self.lock_session()?;
        let verdict = session.coordinator.input(field, value);
        self.submission.refresh_button(session.coordinator.is_valid())?;
        Ok(verdict)
    }

    /// キー入力イベント
    pub fn key_down(&self, event: &KeyEvent, focus: FocusTarget) -> AppResult<KeyOutcome> {
        let mut session = self.lock_session()?;
        let FormSession {
            coordinator,
            modal,
            selected_file,
        } = &mut *session;

        let outcome = modal.handle_key(event, focus, coordinator, &self.submission)?;
        if outcome == KeyOutcome::Closed {
            *selected_file = None;
        }
        Ok(outcome)
    }

    /// 閉じるボタンのクリック
    pub fn click_close(&self) -> AppResult<CloseOutcome> {
        let mut session = self.lock_session()?;
        let FormSession {
            coordinator,
            modal,
            selected_file,
        } = &mut *session;

        let outcome = modal.handle_close_click(coordinator, &self.submission)?;
        if outcome == CloseOutcome::Closed {
            *selected_file = None;
        }
        Ok(outcome)
    }

    /// 送信イベント。成功時は Sending のまま通知を出してエディタを閉じる
    pub async fn submit(&self) -> AppResult<SubmitOutcome> {
        self.submission
            .submit(|| self.prepare_payload(), || self.finish_submission())
            .await
    }

    fn finish_submission(&self) -> AppResult<bool> {
        self.notifier.show_message();
        let mut session = self.lock_session()?;
        session.close(CloseReason::Submitted, &self.submission)?;
        Ok(session.coordinator.is_valid())
    }

    fn prepare_payload(&self) -> AppResult<Option<FormPayload>> {
        let mut session = self.lock_session()?;
        if !session.coordinator.validate_all() {
            return Ok(None);
        }

        let file_name = session.selected_file.as_ref().map(|f| f.name.clone());
        Ok(Some(session.coordinator.payload(file_name)))
    }

    pub fn visibility(&self) -> AppResult<ModalVisibility> {
        Ok(self.lock_session()?.modal.visibility())
    }

    pub fn fields(&self) -> AppResult<FormFields> {
        Ok(self.lock_session()?.coordinator.fields().clone())
    }

    pub fn field_errors(&self) -> AppResult<FieldErrors> {
        Ok(self.lock_session()?.coordinator.errors().clone())
    }

    /// 表示中のフィールドエラー（報告用）
    pub fn validation_errors(&self) -> AppResult<Vec<AppError>> {
        Ok(self.lock_session()?.coordinator.displayed_errors())
    }

    pub fn selected_file(&self) -> AppResult<Option<SelectedFile>> {
        Ok(self.lock_session()?.selected_file.clone())
    }

    pub fn submission_state(&self) -> AppResult<SubmissionState> {
        self.submission.state()
    }

    pub fn submit_button(&self) -> AppResult<SubmitButton> {
        self.submission.button()
    }
}
