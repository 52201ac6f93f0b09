/*!
 * Document translation workflow.
 *
 * A document goes through upload, server-side queueing and translation,
 * then download:
 *
 * `NotStarted -> Uploaded -> {Queued, Translating} -> {Done, Error}`
 *
 * Every HTTP call goes through the request executor, so transport-level
 * retries apply to each call individually. Polling and the "not ready yet"
 * download retry are separate, outer loops. Once an upload succeeded, every
 * error raised by [`Translator::translate_document`] carries the
 * [`DocumentHandle`] so the caller can resume without uploading again.
 */

use bytes::Bytes;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use super::core::Translator;
use super::text::Formality;
use crate::errors::{DeepLError, Result};
use crate::http::{FilePart, HttpRequest, StatusContext};

/// Identifier and secret of an uploaded document
///
/// This is the only durable reference to a document job. Persist it if the
/// translation has to be resumed from another process.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DocumentHandle {
    pub document_id: String,
    pub document_key: String,
}

impl DocumentHandle {
    pub fn new(document_id: impl Into<String>, document_key: impl Into<String>) -> Self {
        Self {
            document_id: document_id.into(),
            document_key: document_key.into(),
        }
    }

    fn key_field(&self) -> Vec<(String, String)> {
        vec![("document_key".to_string(), self.document_key.clone())]
    }
}

// The key is a credential, keep it out of logs
impl fmt::Debug for DocumentHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DocumentHandle")
            .field("document_id", &self.document_id)
            .field("document_key", &"<redacted>")
            .finish()
    }
}

/// Server-side state of a document job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentState {
    Queued,
    Translating,
    Done,
    Error,
}

impl DocumentState {
    /// `Done` or `Error`
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Error)
    }
}

impl fmt::Display for DocumentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Queued => "queued",
            Self::Translating => "translating",
            Self::Done => "done",
            Self::Error => "error",
        };
        f.write_str(name)
    }
}

/// Snapshot of a document job, as returned by one status request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentStatus {
    pub document_id: String,
    #[serde(rename = "status")]
    pub state: DocumentState,
    /// Server estimate, only present while translating
    #[serde(default)]
    pub seconds_remaining: Option<u64>,
    #[serde(default)]
    pub billed_characters: Option<u64>,
    #[serde(default)]
    pub error_message: Option<String>,
}

impl DocumentStatus {
    pub fn is_done(&self) -> bool {
        self.state == DocumentState::Done
    }
}

/// Timing of the polling and download loops
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DocumentPolling {
    /// Wait between two status requests
    pub poll_interval: Duration,
    /// Download attempts after the first one while the server reports "not ready"
    pub download_retries: u32,
    /// Wait between two download attempts
    pub download_retry_delay: Duration,
}

impl Default for DocumentPolling {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(5),
            download_retries: 5,
            download_retry_delay: Duration::from_secs(5),
        }
    }
}

/// Options for a document translation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentTranslateOptions {
    #[serde(default)]
    pub formality: Option<Formality>,
    #[serde(default)]
    pub glossary_id: Option<String>,
    /// File extension of the desired output format, e.g. `docx`
    #[serde(default)]
    pub output_format: Option<String>,
}

/// Result of a completed document translation
#[derive(Debug, Clone)]
pub struct TranslatedDocument {
    pub handle: DocumentHandle,
    /// Final status snapshot (always `Done`)
    pub status: DocumentStatus,
    /// Translated document content, untouched
    pub content: Bytes,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    document_id: String,
    document_key: String,
}

impl Translator {
    /// Upload a document for translation
    ///
    /// Errors from this call never carry a handle: nothing was created on
    /// the server unless it succeeds.
    pub async fn upload_document(
        &self,
        content: impl Into<Bytes>,
        filename: &str,
        source_language: Option<&str>,
        target_language: &str,
        options: &DocumentTranslateOptions,
        cancel: &CancellationToken,
    ) -> Result<DocumentHandle> {
        if filename.trim().is_empty() {
            return Err(DeepLError::InvalidArgument(
                "document file name must not be empty".to_string(),
            ));
        }
        if target_language.trim().is_empty() {
            return Err(DeepLError::InvalidArgument(
                "target language must not be empty".to_string(),
            ));
        }

        let mut fields = vec![("target_lang".to_string(), target_language.to_string())];
        if let Some(source) = source_language {
            fields.push(("source_lang".to_string(), source.to_string()));
        }
        if let Some(formality) = options.formality {
            fields.push(("formality".to_string(), formality.as_str().to_string()));
        }
        if let Some(glossary_id) = &options.glossary_id {
            fields.push(("glossary_id".to_string(), glossary_id.clone()));
        }
        if let Some(output_format) = &options.output_format {
            fields.push(("output_format".to_string(), output_format.clone()));
        }

        let file = FilePart {
            field_name: "file".to_string(),
            filename: filename.to_string(),
            content: content.into(),
        };
        let context = StatusContext {
            using_glossary: options.glossary_id.is_some(),
            ..StatusContext::default()
        };
        let request = HttpRequest::post("/v2/document").multipart(fields, file);
        let response = self.executor().execute(&request, context, cancel).await?;
        let uploaded: UploadResponse = response.json()?;

        info!("Uploaded document '{}' as {}", filename, uploaded.document_id);
        Ok(DocumentHandle::new(uploaded.document_id, uploaded.document_key))
    }

    /// Fetch the current status of an uploaded document
    pub async fn get_document_status(
        &self,
        handle: &DocumentHandle,
        cancel: &CancellationToken,
    ) -> Result<DocumentStatus> {
        let request =
            HttpRequest::post(format!("/v2/document/{}", handle.document_id)).form(handle.key_field());
        let response = self
            .executor()
            .execute(&request, StatusContext::default(), cancel)
            .await?;
        response.json()
    }

    /// Poll the document status until it is `Done` or `Error`
    ///
    /// There is no upper bound on the number of polls; use `cancel` to stop.
    pub async fn wait_until_document_translation_finished(
        &self,
        handle: &DocumentHandle,
        cancel: &CancellationToken,
    ) -> Result<DocumentStatus> {
        let mut last_state = None;
        loop {
            let status = self.get_document_status(handle, cancel).await?;

            if last_state != Some(status.state) {
                info!(
                    "Document {} is {}{}",
                    handle.document_id,
                    status.state,
                    status
                        .seconds_remaining
                        .map(|secs| format!(" (~{}s remaining)", secs))
                        .unwrap_or_default()
                );
                last_state = Some(status.state);
            }
            if status.state.is_terminal() {
                return Ok(status);
            }

            debug!(
                "Polling document {} again in {:?}",
                handle.document_id, self.document_polling().poll_interval
            );
            sleep_or_cancel(self.document_polling().poll_interval, cancel).await?;
        }
    }

    /// Download a translated document
    ///
    /// While the server answers "not ready", the download is repeated up to
    /// `download_retries` more times with a fixed delay.
    pub async fn download_document(
        &self,
        handle: &DocumentHandle,
        cancel: &CancellationToken,
    ) -> Result<Bytes> {
        let polling = *self.document_polling();
        let request = HttpRequest::post(format!("/v2/document/{}/result", handle.document_id))
            .form(handle.key_field());
        let mut retries = 0;

        loop {
            match self
                .executor()
                .execute(&request, StatusContext::document_download(), cancel)
                .await
            {
                Ok(response) => return Ok(response.body),
                Err(DeepLError::DocumentNotReady(message)) if retries < polling.download_retries => {
                    retries += 1;
                    warn!(
                        "Document {} not ready for download ({}), retry {}/{} in {:?}",
                        handle.document_id,
                        message,
                        retries,
                        polling.download_retries,
                        polling.download_retry_delay
                    );
                    sleep_or_cancel(polling.download_retry_delay, cancel).await?;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Upload, wait for and download a document translation
    ///
    /// Failures before the upload completed come back as a document
    /// translation error without a handle; anything later carries it.
    pub async fn translate_document(
        &self,
        content: impl Into<Bytes>,
        filename: &str,
        source_language: Option<&str>,
        target_language: &str,
        options: &DocumentTranslateOptions,
        cancel: &CancellationToken,
    ) -> Result<TranslatedDocument> {
        let handle = self
            .upload_document(content, filename, source_language, target_language, options, cancel)
            .await
            .map_err(|e| DeepLError::document_failure(e, None))?;

        self.finish_document(handle, cancel).await
    }

    /// Resume a document translation from its handle: wait, then download
    pub async fn finish_document(
        &self,
        handle: DocumentHandle,
        cancel: &CancellationToken,
    ) -> Result<TranslatedDocument> {
        match self.wait_and_download(&handle, cancel).await {
            Ok((status, content)) => Ok(TranslatedDocument {
                handle,
                status,
                content,
            }),
            Err(e) => Err(DeepLError::document_failure(e, Some(handle))),
        }
    }

    /// Translate the file at `input_path` into a new file at `output_path`
    ///
    /// Refuses to overwrite an existing output file. A partially written
    /// output file is removed on failure.
    pub async fn translate_document_path(
        &self,
        input_path: &Path,
        output_path: &Path,
        source_language: Option<&str>,
        target_language: &str,
        options: &DocumentTranslateOptions,
        cancel: &CancellationToken,
    ) -> Result<DocumentStatus> {
        if tokio::fs::try_exists(output_path).await? {
            return Err(DeepLError::InvalidArgument(format!(
                "output file '{}' already exists",
                output_path.display()
            )));
        }
        let filename = input_path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| {
                DeepLError::InvalidArgument(format!(
                    "input path '{}' has no usable file name",
                    input_path.display()
                ))
            })?;
        let content = tokio::fs::read(input_path).await?;

        let translated = self
            .translate_document(content, filename, source_language, target_language, options, cancel)
            .await?;

        if let Err(e) = tokio::fs::write(output_path, &translated.content).await {
            if let Err(remove_error) = tokio::fs::remove_file(output_path).await {
                debug!(
                    "Could not remove partial output '{}': {}",
                    output_path.display(),
                    remove_error
                );
            }
            return Err(DeepLError::document_failure(e.into(), Some(translated.handle)));
        }

        Ok(translated.status)
    }

    async fn wait_and_download(
        &self,
        handle: &DocumentHandle,
        cancel: &CancellationToken,
    ) -> Result<(DocumentStatus, Bytes)> {
        let status = self
            .wait_until_document_translation_finished(handle, cancel)
            .await?;

        if status.state == DocumentState::Error {
            let message = status
                .error_message
                .clone()
                .unwrap_or_else(|| "unknown error".to_string());
            return Err(DeepLError::DocumentTranslation {
                message: format!("translation failed on the server: {}", message),
                handle: Some(handle.clone()),
                source: None,
            });
        }

        let content = self.download_document(handle, cancel).await?;
        Ok((status, content))
    }
}

/// Sleep for `duration` unless `cancel` fires first
pub(crate) async fn sleep_or_cancel(duration: Duration, cancel: &CancellationToken) -> Result<()> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(DeepLError::Cancelled),
        _ = tokio::time::sleep(duration) => Ok(()),
    }
}
