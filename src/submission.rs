// 送信処理の状態管理
// 送信中の再入を防ぎ、完了時（成功・失敗どちらでも）に必ずボタンを元に戻す

use std::sync::{Arc, Mutex, MutexGuard};

use log::{debug, info, warn};

use crate::api_types::FormPayload;
use crate::collaborators::FormSender;
use crate::config::ui_text;
use crate::errors::{AppError, AppResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubmissionState {
    #[default]
    Idle,
    Sending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitLabel {
    Idle,
    Sending,
}

impl SubmitLabel {
    pub fn text(self) -> &'static str {
        match self {
            SubmitLabel::Idle => ui_text::SUBMIT_IDLE,
            SubmitLabel::Sending => ui_text::SUBMIT_SENDING,
        }
    }
}

/// 送信ボタンの見た目（有効/無効とラベル）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmitButton {
    pub enabled: bool,
    pub label: SubmitLabel,
}

impl SubmitButton {
    fn idle(enabled: bool) -> Self {
        Self {
            enabled,
            label: SubmitLabel::Idle,
        }
    }
}

#[derive(Debug)]
pub enum SubmitOutcome {
    /// 送信が成功した
    Sent,
    /// 送信が失敗した（ボタンは元に戻っている）
    SendFailed(AppError),
    /// フォームが不正なため送信しなかった
    Invalid,
    /// 送信中のため無視した
    Dropped,
}

#[derive(Debug)]
struct SubmissionInner {
    state: SubmissionState,
    button: SubmitButton,
}

pub struct SubmissionController {
    inner: Mutex<SubmissionInner>,
    sender: Arc<dyn FormSender>,
}

impl SubmissionController {
    pub fn new(sender: Arc<dyn FormSender>) -> Self {
        Self {
            inner: Mutex::new(SubmissionInner {
                state: SubmissionState::Idle,
                button: SubmitButton::idle(true),
            }),
            sender,
        }
    }

    fn lock(&self) -> AppResult<MutexGuard<'_, SubmissionInner>> {
        self.inner
            .lock()
            .map_err(|e| AppError::state_lock(format!("Submission state lock error: {e}")))
    }

    pub fn state(&self) -> AppResult<SubmissionState> {
        Ok(self.lock()?.state)
    }

    pub fn button(&self) -> AppResult<SubmitButton> {
        Ok(self.lock()?.button)
    }

    /// フォームの有効性からボタンの有効/無効を再計算する。送信中は常に無効
    pub fn refresh_button(&self, form_valid: bool) -> AppResult<()> {
        let mut inner = self.lock()?;
        if inner.state == SubmissionState::Idle {
            inner.button = SubmitButton::idle(form_valid);
        }
        Ok(())
    }

    /// 送信要求を処理する
    ///
    /// `prepare` は Idle のときだけ呼ばれ、フォームが正しければペイロードを、
    /// 不正なら `None` を返す。送信は1回の受理につき必ず1回だけ行われる。
    ///
    /// `on_success` は送信成功時に Sending のまま呼ばれ、その後のフォームの有効性を返す。
    pub async fn submit<F, S>(&self, prepare: F, on_success: S) -> AppResult<SubmitOutcome>
    where
        F: FnOnce() -> AppResult<Option<FormPayload>> + Send,
        S: FnOnce() -> AppResult<bool> + Send,
    {
        let Some(mut guard) = self.try_reserve()? else {
            debug!("Submit ignored: a submission is already in flight");
            return Ok(SubmitOutcome::Dropped);
        };

        let prepared = prepare();
        if prepared.is_err() {
            guard.form_valid = false;
        }
        let payload = match prepared? {
            Some(payload) => payload,
            None => {
                guard.form_valid = false;
                debug!("Submit rejected: form is invalid");
                return Ok(SubmitOutcome::Invalid);
            }
        };

        guard.show_sending();
        info!("Submission accepted");

        let outcome = match self.sender.send(payload).await {
            Ok(()) => {
                info!("Submission settled: success");
                // 成功時の処理が終わるまで次の送信は受け付けない
                guard.form_valid = on_success()?;
                SubmitOutcome::Sent
            }
            Err(e) => {
                warn!("Submission settled: failure: {e}");
                SubmitOutcome::SendFailed(e)
            }
        };

        drop(guard);
        Ok(outcome)
    }

    /// Idle なら Sending を予約する。予約中の再入はここで弾かれる
    fn try_reserve(&self) -> AppResult<Option<SendingGuard<'_>>> {
        let mut inner = self.lock()?;
        if inner.state == SubmissionState::Sending {
            return Ok(None);
        }
        inner.state = SubmissionState::Sending;
        debug!("Submission state: Idle -> Sending");

        Ok(Some(SendingGuard {
            controller: self,
            form_valid: true,
        }))
    }
}

/// Drop 時に Idle に戻し、ボタンを復帰させる。future が途中で破棄された場合も同様
struct SendingGuard<'a> {
    controller: &'a SubmissionController,
    form_valid: bool,
}

impl SendingGuard<'_> {
    fn show_sending(&self) {
        let mut inner = match self.controller.inner.lock() {
            Ok(inner) => inner,
            Err(poisoned) => poisoned.into_inner(),
        };
        inner.button = SubmitButton {
            enabled: false,
            label: SubmitLabel::Sending,
        };
    }
}

impl Drop for SendingGuard<'_> {
    fn drop(&mut self) {
        let mut inner = match self.controller.inner.lock() {
            Ok(inner) => inner,
            Err(poisoned) => poisoned.into_inner(),
        };
        inner.state = SubmissionState::Idle;
        inner.button = SubmitButton::idle(self.form_valid);
        debug!("Submission state: Sending -> Idle");
    }
}
