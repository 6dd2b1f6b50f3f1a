// 写真編集モーダルの開閉とリスナー登録の管理

use std::sync::Arc;

use log::{debug, info, warn};

use crate::collaborators::{KeyClassifier, KeyEvent, Notifier, PreviewLoader, SelectedFile};
use crate::errors::AppResult;
use crate::form_validation::FormValidationCoordinator;
use crate::submission::{SubmissionController, SubmissionState};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModalVisibility {
    #[default]
    Closed,
    Open,
}

/// モーダルが開いている間だけ登録されるリスナー
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Listener {
    EscapeKey,
    CloseButton,
}

/// キー入力時のフォーカス位置
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusTarget {
    HashtagField,
    CommentField,
    Elsewhere,
}

impl FocusTarget {
    fn is_text_field(self) -> bool {
        matches!(self, FocusTarget::HashtagField | FocusTarget::CommentField)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseReason {
    CloseButton,
    EscapeKey,
    /// 送信成功後のプログラムによるクローズ
    Submitted,
}

impl CloseReason {
    fn is_user_initiated(self) -> bool {
        !matches!(self, CloseReason::Submitted)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenOutcome {
    Opened,
    /// すでに開いていた（プレビューのみ差し替え）
    AlreadyOpen,
    /// プレビューの読み込みに失敗したため開かなかった
    PreviewFailed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseOutcome {
    Closed,
    /// 送信中のため閉じなかった
    Blocked,
    /// 閉じているかリスナー未登録
    Ignored,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    /// Escape以外、またはリスナー未登録
    Ignored,
    /// 入力欄でのEscape: その場で消費し、伝播させない
    Suppressed,
    Closed,
    CloseBlocked,
}

impl KeyOutcome {
    pub fn prevents_default(self) -> bool {
        !matches!(self, KeyOutcome::Ignored)
    }

    pub fn stops_propagation(self) -> bool {
        matches!(self, KeyOutcome::Suppressed)
    }
}

pub struct ModalLifecycleController {
    visibility: ModalVisibility,
    listeners: Vec<Listener>,
    preview: Arc<dyn PreviewLoader>,
    notifier: Arc<dyn Notifier>,
    key_classifier: Arc<dyn KeyClassifier>,
}

impl ModalLifecycleController {
    pub fn new(
        preview: Arc<dyn PreviewLoader>,
        notifier: Arc<dyn Notifier>,
        key_classifier: Arc<dyn KeyClassifier>,
    ) -> Self {
        Self {
            visibility: ModalVisibility::Closed,
            listeners: Vec::new(),
            preview,
            notifier,
            key_classifier,
        }
    }

    pub fn visibility(&self) -> ModalVisibility {
        self.visibility
    }

    pub fn is_subscribed(&self, listener: Listener) -> bool {
        self.listeners.contains(&listener)
    }

    fn subscribe(&mut self) {
        for listener in [Listener::EscapeKey, Listener::CloseButton] {
            if !self.listeners.contains(&listener) {
                self.listeners.push(listener);
            }
        }
        debug!("Listeners attached: {:?}", self.listeners);
    }

    fn unsubscribe(&mut self) {
        self.listeners.clear();
        debug!("Listeners detached");
    }

    /// ファイル選択時: プレビューの読み込みに成功した場合のみ開く
    pub fn open(
        &mut self,
        file: &SelectedFile,
        form: &FormValidationCoordinator,
        submission: &SubmissionController,
    ) -> AppResult<OpenOutcome> {
        if let Err(e) = self.preview.load_file(file) {
            warn!("Failed to load preview for {}: {e}", file.name);
            self.notifier.show_alert(&e.user_message());
            return Ok(OpenOutcome::PreviewFailed);
        }

        if self.visibility == ModalVisibility::Open {
            return Ok(OpenOutcome::AlreadyOpen);
        }

        self.visibility = ModalVisibility::Open;
        self.subscribe();
        submission.refresh_button(form.is_valid())?;
        info!("Photo editor opened for {}", file.name);
        Ok(OpenOutcome::Opened)
    }

    pub fn close(
        &mut self,
        reason: CloseReason,
        form: &mut FormValidationCoordinator,
        submission: &SubmissionController,
    ) -> AppResult<CloseOutcome> {
        if self.visibility == ModalVisibility::Closed {
            return Ok(CloseOutcome::Ignored);
        }

        if reason.is_user_initiated() && submission.state()? == SubmissionState::Sending {
            info!("Close ({reason:?}) refused while a submission is in flight");
            return Ok(CloseOutcome::Blocked);
        }

        self.visibility = ModalVisibility::Closed;
        self.unsubscribe();
        form.reset();
        self.preview.reset_effects();
        self.preview.reset_scale();
        submission.refresh_button(form.is_valid())?;
        info!("Photo editor closed ({reason:?})");
        Ok(CloseOutcome::Closed)
    }

    pub fn handle_close_click(
        &mut self,
        form: &mut FormValidationCoordinator,
        submission: &SubmissionController,
    ) -> AppResult<CloseOutcome> {
        if !self.is_subscribed(Listener::CloseButton) {
            return Ok(CloseOutcome::Ignored);
        }
        self.close(CloseReason::CloseButton, form, submission)
    }

    pub fn handle_key(
        &mut self,
        event: &KeyEvent,
        focus: FocusTarget,
        form: &mut FormValidationCoordinator,
        submission: &SubmissionController,
    ) -> AppResult<KeyOutcome> {
        if !self.is_subscribed(Listener::EscapeKey) || !self.key_classifier.is_escape_key(event) {
            return Ok(KeyOutcome::Ignored);
        }

        if focus.is_text_field() {
            return Ok(KeyOutcome::Suppressed);
        }

        let outcome = match self.close(CloseReason::EscapeKey, form, submission)? {
            CloseOutcome::Closed => KeyOutcome::Closed,
            CloseOutcome::Blocked => KeyOutcome::CloseBlocked,
            CloseOutcome::Ignored => KeyOutcome::Ignored,
        };
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborators::fakes::{FakePreview, RecordingNotifier, RecordingSender};
    use crate::collaborators::DefaultKeyClassifier;
    use crate::config::FormLimits;
    use crate::form_validation::FormField;

    struct Harness {
        modal: ModalLifecycleController,
        form: FormValidationCoordinator,
        submission: SubmissionController,
        preview: Arc<FakePreview>,
        notifier: Arc<RecordingNotifier>,
    }

    fn harness_with(preview: FakePreview) -> Harness {
        let preview = Arc::new(preview);
        let notifier = Arc::new(RecordingNotifier::default());
        Harness {
            modal: ModalLifecycleController::new(
                preview.clone(),
                notifier.clone(),
                Arc::new(DefaultKeyClassifier),
            ),
            form: FormValidationCoordinator::new(&FormLimits::default()).unwrap(),
            submission: SubmissionController::new(Arc::new(RecordingSender::immediate())),
            preview,
            notifier,
        }
    }

    fn open_harness() -> Harness {
        let mut h = harness_with(FakePreview::default());
        let outcome = h
            .modal
            .open(&SelectedFile::from_path("cat.jpg"), &h.form, &h.submission)
            .unwrap();
        assert_eq!(outcome, OpenOutcome::Opened);
        h
    }

    fn escape() -> KeyEvent {
        KeyEvent::new("Escape")
    }

    #[test]
    fn test_open_attaches_listeners() {
        let h = open_harness();
        assert_eq!(h.modal.visibility(), ModalVisibility::Open);
        assert!(h.modal.is_subscribed(Listener::EscapeKey));
        assert!(h.modal.is_subscribed(Listener::CloseButton));
        assert!(h.submission.button().unwrap().enabled);
    }

    #[test]
    fn test_preview_failure_keeps_modal_closed() {
        let mut h = harness_with(FakePreview::failing());
        let outcome = h
            .modal
            .open(&SelectedFile::from_path("notes.txt"), &h.form, &h.submission)
            .unwrap();

        assert_eq!(outcome, OpenOutcome::PreviewFailed);
        assert_eq!(h.modal.visibility(), ModalVisibility::Closed);
        assert!(!h.modal.is_subscribed(Listener::EscapeKey));
        assert_eq!(h.notifier.alerts(), vec!["Unsupported file: notes.txt"]);
    }

    #[test]
    fn test_escape_in_text_field_is_suppressed() {
        let mut h = open_harness();
        for focus in [FocusTarget::HashtagField, FocusTarget::CommentField] {
            let outcome = h
                .modal
                .handle_key(&escape(), focus, &mut h.form, &h.submission)
                .unwrap();
            assert_eq!(outcome, KeyOutcome::Suppressed);
            assert!(outcome.prevents_default());
            assert!(outcome.stops_propagation());
        }
        assert_eq!(h.modal.visibility(), ModalVisibility::Open);
    }

    #[test]
    fn test_escape_elsewhere_closes_once() {
        let mut h = open_harness();
        h.form.input(FormField::Hashtags, "#");
        h.form.input(FormField::Description, "draft");

        let outcome = h
            .modal
            .handle_key(&escape(), FocusTarget::Elsewhere, &mut h.form, &h.submission)
            .unwrap();
        assert_eq!(outcome, KeyOutcome::Closed);
        assert_eq!(h.modal.visibility(), ModalVisibility::Closed);
        assert!(!h.modal.is_subscribed(Listener::EscapeKey));
        assert!(!h.modal.is_subscribed(Listener::CloseButton));

        // 入力値・エラー・エフェクトがリセットされている
        assert!(h.form.fields().hashtags.is_empty());
        assert!(h.form.fields().description.is_empty());
        assert!(h.form.errors().is_empty());
        assert_eq!(h.preview.effect_resets(), 1);
        assert!(h.submission.button().unwrap().enabled);

        // 2回目のEscapeは処理されない
        let outcome = h
            .modal
            .handle_key(&escape(), FocusTarget::Elsewhere, &mut h.form, &h.submission)
            .unwrap();
        assert_eq!(outcome, KeyOutcome::Ignored);
        assert!(!outcome.prevents_default());
        assert_eq!(h.preview.effect_resets(), 1);
    }

    #[test]
    fn test_other_keys_are_ignored() {
        let mut h = open_harness();
        let outcome = h
            .modal
            .handle_key(
                &KeyEvent::new("Enter"),
                FocusTarget::Elsewhere,
                &mut h.form,
                &h.submission,
            )
            .unwrap();
        assert_eq!(outcome, KeyOutcome::Ignored);
        assert_eq!(h.modal.visibility(), ModalVisibility::Open);
    }

    #[test]
    fn test_close_button() {
        let mut h = open_harness();
        let outcome = h
            .modal
            .handle_close_click(&mut h.form, &h.submission)
            .unwrap();
        assert_eq!(outcome, CloseOutcome::Closed);
        assert_eq!(h.modal.visibility(), ModalVisibility::Closed);

        // クローズ後はボタンのリスナーも外れている
        let outcome = h
            .modal
            .handle_close_click(&mut h.form, &h.submission)
            .unwrap();
        assert_eq!(outcome, CloseOutcome::Ignored);
        assert_eq!(h.preview.scale_resets.load(std::sync::atomic::Ordering::SeqCst), 1);
    }

    #[test]
    fn test_reopen_replaces_preview_only() {
        let mut h = open_harness();
        let outcome = h
            .modal
            .open(&SelectedFile::from_path("dog.jpg"), &h.form, &h.submission)
            .unwrap();
        assert_eq!(outcome, OpenOutcome::AlreadyOpen);
        assert_eq!(h.preview.loads.load(std::sync::atomic::Ordering::SeqCst), 2);
        assert_eq!(h.modal.visibility(), ModalVisibility::Open);
    }
}
