// ハッシュタグ入力のバリデーション
// 真偽値とエラーメッセージは同じ check() から導出する

use std::collections::HashSet;

use regex::Regex;
use thiserror::Error;

use crate::api_types::ValidationVerdict;
use crate::config::{hashtags, FormLimits};
use crate::errors::{AppError, AppResult};

/// ハッシュタグ規則違反。Display がそのままフィールドのエラーメッセージになる
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HashtagError {
    #[error("You cannot add more than {max} hashtags")]
    TooMany { max: usize },

    #[error("Hashtags must not repeat")]
    Duplicate,

    #[error("A hashtag cannot be just #")]
    OnlyHash,

    #[error("A hashtag must start with #")]
    MissingHash,

    #[error("Maximum hashtag length is {max} characters")]
    TooLong { max: usize },

    #[error("Invalid characters in hashtag")]
    InvalidCharacters,
}

/// ブラウザの `\s` / `String.prototype.trim` と同じ空白文字集合
pub fn is_separator(c: char) -> bool {
    matches!(
        c,
        '\t' | '\n'
            | '\u{000B}'
            | '\u{000C}'
            | '\r'
            | ' '
            | '\u{00A0}'
            | '\u{1680}'
            | '\u{2000}'..='\u{200A}'
            | '\u{2028}'
            | '\u{2029}'
            | '\u{202F}'
            | '\u{205F}'
            | '\u{3000}'
            | '\u{FEFF}'
    )
}

/// 空白で区切ったハッシュタグの並び。空文字列のトークンは含まない
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HashtagList<'a> {
    tokens: Vec<&'a str>,
}

impl<'a> HashtagList<'a> {
    pub fn parse(raw: &'a str) -> Self {
        Self {
            tokens: raw.split(is_separator).filter(|t| !t.is_empty()).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn tokens(&self) -> &[&'a str] {
        &self.tokens
    }

    /// 大文字小文字を区別せずに重複があるか
    pub fn has_duplicates(&self) -> bool {
        let unique: HashSet<String> = self.tokens.iter().map(|t| t.to_lowercase()).collect();
        unique.len() != self.tokens.len()
    }
}

#[derive(Debug, Clone)]
pub struct HashtagValidator {
    max_quantity: usize,
    max_length: usize,
    pattern: Regex,
}

impl HashtagValidator {
    pub fn new(limits: &FormLimits) -> AppResult<Self> {
        limits.validate()?;

        // 先頭の # を除いた文字数の上限
        let body_max = limits.max_hashtag_length - 1;
        // 大文字小文字は明示的に列挙する（Unicodeの大小無視は K や ſ まで許してしまう）
        let pattern = Regex::new(&format!("^#[a-zA-Zа-яА-ЯёЁ0-9]{{1,{body_max}}}$"))
            .map_err(|e| AppError::config(format!("Failed to build hashtag pattern: {e}")))?;

        Ok(Self {
            max_quantity: limits.max_hashtag_quantity,
            max_length: limits.max_hashtag_length,
            pattern,
        })
    }

    /// 規則を順番に適用し、最初の違反を返す
    pub fn check(&self, raw: &str) -> Result<(), HashtagError> {
        let list = HashtagList::parse(raw.trim_matches(is_separator));
        if list.is_empty() {
            // ハッシュタグは任意
            return Ok(());
        }

        if list.len() > self.max_quantity {
            return Err(HashtagError::TooMany {
                max: self.max_quantity,
            });
        }

        if list.has_duplicates() {
            return Err(HashtagError::Duplicate);
        }

        for token in list.tokens() {
            self.check_token(token)?;
        }

        Ok(())
    }

    fn check_token(&self, token: &str) -> Result<(), HashtagError> {
        if token == "#" {
            return Err(HashtagError::OnlyHash);
        }

        if !token.starts_with(hashtags::PREFIX) {
            return Err(HashtagError::MissingHash);
        }

        if token.chars().count() > self.max_length {
            return Err(HashtagError::TooLong {
                max: self.max_length,
            });
        }

        if !self.pattern.is_match(token) {
            return Err(HashtagError::InvalidCharacters);
        }

        Ok(())
    }

    pub fn validate(&self, raw: &str) -> ValidationVerdict {
        match self.check(raw) {
            Ok(()) => ValidationVerdict::valid(),
            Err(e) => ValidationVerdict::invalid(e.to_string()),
        }
    }

    pub fn is_valid(&self, raw: &str) -> bool {
        self.check(raw).is_ok()
    }
}
