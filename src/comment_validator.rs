use crate::api_types::ValidationVerdict;
use crate::config::FormLimits;

/// コメントは文字数の上限のみ検証する
#[derive(Debug, Clone, Copy)]
pub struct CommentValidator {
    max_length: usize,
}

impl CommentValidator {
    pub fn new(limits: &FormLimits) -> Self {
        Self {
            max_length: limits.max_comment_length,
        }
    }

    pub fn is_valid(&self, text: &str) -> bool {
        text.chars().count() <= self.max_length
    }

    pub fn validate(&self, text: &str) -> ValidationVerdict {
        if self.is_valid(text) {
            ValidationVerdict::valid()
        } else {
            let max = self.max_length;
            ValidationVerdict::invalid(format!("Comment must not exceed {max} characters"))
        }
    }
}
