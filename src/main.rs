// コマンドラインから1回分のアップロードを実行する

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Result};
use async_trait::async_trait;
use clap::Parser;
use log::debug;

use photo_upload_form_lib::config::file_filters;
use photo_upload_form_lib::{
    init_logging, AppError, AppResult, DefaultKeyClassifier, FormCollaborators, FormField,
    FormLimits, FormPayload, FormSender, Notifier, OpenOutcome, PreviewLoader, SelectedFile,
    SubmitOutcome, UploadForm,
};

#[derive(Parser, Debug)]
#[command(name = "photo-upload-form")]
#[command(about = "Validate and submit a photo with hashtags and a comment")]
struct Args {
    /// Image file to upload
    #[arg(short, long)]
    file: PathBuf,

    /// Space separated hashtags
    #[arg(long, default_value = "")]
    hashtags: String,

    /// Photo comment
    #[arg(short, long, default_value = "")]
    comment: String,

    /// JSON file with form limits
    #[arg(long)]
    limits: Option<PathBuf>,
}

/// ファイルシステム上の画像をプレビュー対象とする
struct FilePreview;

impl PreviewLoader for FilePreview {
    fn load_file(&self, file: &SelectedFile) -> AppResult<()> {
        let extension = file
            .path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_lowercase())
            .unwrap_or_default();

        if !file_filters::IMAGE_EXTENSIONS.contains(&extension.as_str()) {
            let name = &file.name;
            return Err(AppError::preview_load(format!("Unsupported image file: {name}")));
        }

        let metadata = std::fs::metadata(&file.path)
            .map_err(|e| AppError::preview_load(format!("Cannot read {}: {e}", file.name)))?;
        if !metadata.is_file() {
            let name = &file.name;
            return Err(AppError::preview_load(format!("Not a file: {name}")));
        }

        Ok(())
    }

    fn reset_effects(&self) {
        debug!("Effects reset");
    }

    fn reset_scale(&self) {
        debug!("Scale reset");
    }
}

struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn show_message(&self) {
        println!("Photo uploaded successfully");
    }

    fn show_alert(&self, text: &str) {
        eprintln!("{text}");
    }
}

/// ペイロードをJSONとして標準出力に書き出す
struct StdoutSender;

#[async_trait]
impl FormSender for StdoutSender {
    async fn send(&self, payload: FormPayload) -> AppResult<()> {
        println!("{}", serde_json::to_string_pretty(&payload)?);
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();
    let args = Args::parse();

    let limits = match &args.limits {
        Some(path) => FormLimits::load(path)?,
        None => FormLimits::load_or_default(),
    };

    let form = UploadForm::new(
        &limits,
        FormCollaborators {
            sender: Arc::new(StdoutSender),
            preview: Arc::new(FilePreview),
            notifier: Arc::new(ConsoleNotifier),
            key_classifier: Arc::new(DefaultKeyClassifier),
        },
    )?;

    if form.select_file(SelectedFile::from_path(&args.file))? == OpenOutcome::PreviewFailed {
        bail!("Could not open {}", args.file.display());
    }

    form.input(FormField::Hashtags, args.hashtags)?;
    form.input(FormField::Description, args.comment)?;

    match form.submit().await? {
        SubmitOutcome::Sent => Ok(()),
        SubmitOutcome::Invalid => {
            for error in form.validation_errors()? {
                eprintln!("{}", error.user_message());
            }
            bail!("The form is invalid")
        }
        SubmitOutcome::SendFailed(e) => Err(e.into()),
        SubmitOutcome::Dropped => bail!("A submission is already in flight"),
    }
}
