// フォーム全体の検証状態
// 入力値・表示中のエラー・送信ボタンの有効判定をまとめて持つ

use log::debug;

use crate::api_types::{FieldErrors, FormPayload, ValidationVerdict};
use crate::comment_validator::CommentValidator;
use crate::config::FormLimits;
use crate::errors::{AppError, AppResult};
use crate::hashtag_validator::HashtagValidator;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Hashtags,
    Description,
}

impl FormField {
    pub fn name(self) -> &'static str {
        match self {
            FormField::Hashtags => "hashtags",
            FormField::Description => "description",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormFields {
    pub hashtags: String,
    pub description: String,
}

#[derive(Debug, Clone)]
pub struct FormValidationCoordinator {
    hashtag_validator: HashtagValidator,
    comment_validator: CommentValidator,
    fields: FormFields,
    errors: FieldErrors,
}

impl FormValidationCoordinator {
    pub fn new(limits: &FormLimits) -> AppResult<Self> {
        Ok(Self {
            hashtag_validator: HashtagValidator::new(limits)?,
            comment_validator: CommentValidator::new(limits),
            fields: FormFields::default(),
            errors: FieldErrors::default(),
        })
    }

    pub fn fields(&self) -> &FormFields {
        &self.fields
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    /// 入力イベント: 値を更新し、そのフィールドだけ再検証してエラー表示を更新する
    pub fn input(&mut self, field: FormField, value: impl Into<String>) -> ValidationVerdict {
        match field {
            FormField::Hashtags => self.fields.hashtags = value.into(),
            FormField::Description => self.fields.description = value.into(),
        }

        let verdict = self.validate_field(field);
        self.show_error(field, &verdict);
        verdict
    }

    /// 表示状態を変えずに検証する
    pub fn validate_field(&self, field: FormField) -> ValidationVerdict {
        match field {
            FormField::Hashtags => self.hashtag_validator.validate(&self.fields.hashtags),
            FormField::Description => self.comment_validator.validate(&self.fields.description),
        }
    }

    /// 送信ボタンの有効判定（両フィールド）
    pub fn is_valid(&self) -> bool {
        self.hashtag_validator.is_valid(&self.fields.hashtags)
            && self.comment_validator.is_valid(&self.fields.description)
    }

    /// 全フィールドを検証し、エラーを強制表示する
    pub fn validate_all(&mut self) -> bool {
        let hashtags = self.validate_field(FormField::Hashtags);
        let description = self.validate_field(FormField::Description);
        self.show_error(FormField::Hashtags, &hashtags);
        self.show_error(FormField::Description, &description);

        let valid = hashtags.ok && description.ok;
        if !valid {
            debug!("Form is invalid: {:?}", self.errors);
        }
        valid
    }

    /// 入力値とエラー表示を初期状態に戻す
    pub fn reset(&mut self) {
        self.fields = FormFields::default();
        self.errors = FieldErrors::default();
    }

    /// 表示中のエラーを報告用の AppError に変換する
    pub fn displayed_errors(&self) -> Vec<AppError> {
        [
            (FormField::Hashtags, &self.errors.hashtags),
            (FormField::Description, &self.errors.description),
        ]
        .into_iter()
        .filter_map(|(field, message)| {
            message
                .as_ref()
                .map(|message| AppError::validation(field.name(), message.clone()))
        })
        .collect()
    }

    pub fn payload(&self, file_name: Option<String>) -> FormPayload {
        FormPayload {
            file_name,
            hashtags: self.fields.hashtags.clone(),
            description: self.fields.description.clone(),
        }
    }

    fn show_error(&mut self, field: FormField, verdict: &ValidationVerdict) {
        let shown = (!verdict.ok).then(|| verdict.message.clone());
        match field {
            FormField::Hashtags => self.errors.hashtags = shown,
            FormField::Description => self.errors.description = shown,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coordinator() -> FormValidationCoordinator {
        FormValidationCoordinator::new(&FormLimits::default()).unwrap()
    }

    #[test]
    fn test_empty_form_is_valid() {
        let form = coordinator();
        assert!(form.is_valid());
        assert!(form.errors().is_empty());
    }

    #[test]
    fn test_input_revalidates_only_that_field() {
        let mut form = coordinator();

        let verdict = form.input(FormField::Hashtags, "#cat #CAT");
        assert!(!verdict.ok);
        assert_eq!(
            form.errors().hashtags.as_deref(),
            Some("Hashtags must not repeat")
        );
        assert!(form.errors().description.is_none());
        assert!(!form.is_valid());

        // 修正するとエラー表示が消える
        let verdict = form.input(FormField::Hashtags, "#cat #dog");
        assert!(verdict.ok);
        assert!(form.errors().hashtags.is_none());
        assert!(form.is_valid());
    }

    #[test]
    fn test_button_validity_uses_both_fields() {
        let mut form = coordinator();
        form.input(FormField::Hashtags, "#cat");
        form.input(FormField::Description, "x".repeat(141));
        assert!(!form.is_valid());

        form.input(FormField::Description, "x".repeat(140));
        assert!(form.is_valid());
    }

    #[test]
    fn test_validate_all_forces_errors() {
        let mut form = coordinator();
        form.fields.hashtags = "nohash".to_string();
        form.fields.description = "y".repeat(200);
        assert!(form.errors().is_empty());

        assert!(!form.validate_all());
        assert_eq!(
            form.errors().hashtags.as_deref(),
            Some("A hashtag must start with #")
        );
        assert_eq!(
            form.errors().description.as_deref(),
            Some("Comment must not exceed 140 characters")
        );

        let reported = form.displayed_errors();
        assert_eq!(reported.len(), 2);
        assert_eq!(
            reported[0].user_message(),
            "hashtags: A hashtag must start with #"
        );
        assert!(matches!(
            &reported[1],
            AppError::Validation { field, .. } if field == "description"
        ));
    }

    #[test]
    fn test_reset_clears_fields_and_errors() {
        let mut form = coordinator();
        form.input(FormField::Hashtags, "#");
        form.input(FormField::Description, "hello");
        form.reset();

        assert_eq!(form.fields(), &FormFields::default());
        assert!(form.errors().is_empty());
        assert!(form.is_valid());
    }

    #[test]
    fn test_payload_snapshot() {
        let mut form = coordinator();
        form.input(FormField::Hashtags, "#cat #Dog");
        form.input(FormField::Description, "ok");

        let payload = form.payload(Some("cat.png".to_string()));
        assert_eq!(payload.file_name.as_deref(), Some("cat.png"));
        assert_eq!(payload.hashtags, "#cat #Dog");
        assert_eq!(payload.description, "ok");
    }
}
