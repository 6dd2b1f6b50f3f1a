// API型定義 - TypeScript自動生成対応
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

// =============================================================================
// Core Domain Types
// =============================================================================

/// 1フィールド分の検証結果。`ok == message.is_empty()` が常に成り立つ
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS, JsonSchema)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ValidationVerdict {
    pub ok: bool,
    pub message: String,
}

impl ValidationVerdict {
    pub fn valid() -> Self {
        Self {
            ok: true,
            message: String::new(),
        }
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            message: message.into(),
        }
    }
}

/// 送信時点のフォーム内容
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS, JsonSchema)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct FormPayload {
    pub file_name: Option<String>,
    pub hashtags: String,
    pub description: String,
}

/// 表示中のフィールドエラー（None は非表示）
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS, JsonSchema)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct FieldErrors {
    pub hashtags: Option<String>,
    pub description: Option<String>,
}

impl FieldErrors {
    pub fn is_empty(&self) -> bool {
        self.hashtags.is_none() && self.description.is_none()
    }
}

// =============================================================================
// Schema Generation Helper
// =============================================================================

/// 送信ペイロードのJSON Schemaを生成するヘルパー関数
pub fn generate_payload_schema() -> Result<String, serde_json::Error> {
    use schemars::schema_for;

    let schema = schema_for!(FormPayload);
    serde_json::to_string_pretty(&schema)
}
