/*!
 * Batch translation fan-out.
 *
 * Translates the same texts into several target languages, one request per
 * target. Targets are independent: a failure for one target is recorded in
 * its [`BatchResult`] and never aborts the others.
 */

use futures::stream::{self, StreamExt};
use log::{debug, error, info};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;

use super::core::Translator;
use super::text::{TextResult, TextTranslateOptions};
use crate::errors::DeepLError;

/// Default cap on concurrently translated targets
pub const DEFAULT_CONCURRENT_REQUESTS: usize = 10;

/// One target language of a batch, with its own options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchTarget {
    pub target_language: String,
    #[serde(default)]
    pub options: TextTranslateOptions,
}

impl BatchTarget {
    pub fn new(target_language: impl Into<String>) -> Self {
        Self {
            target_language: target_language.into(),
            options: TextTranslateOptions::default(),
        }
    }

    pub fn with_options(mut self, options: TextTranslateOptions) -> Self {
        self.options = options;
        self
    }
}

/// Outcome of one target of a batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchResult {
    pub target_language: String,
    pub completed: bool,
    /// Translations in input order; empty if the target failed
    pub translations: Vec<TextResult>,
    pub error_message: Option<String>,
    /// Sum of billed characters over all translations
    pub billed_characters: u64,
}

impl BatchResult {
    fn success(target_language: String, translations: Vec<TextResult>) -> Self {
        let billed_characters = translations
            .iter()
            .map(|t| t.billed_characters.unwrap_or(0))
            .sum();
        Self {
            target_language,
            completed: true,
            translations,
            error_message: None,
            billed_characters,
        }
    }

    fn failure(target_language: String, error: &DeepLError) -> Self {
        Self {
            target_language,
            completed: false,
            translations: Vec::new(),
            error_message: Some(error.to_string()),
            billed_characters: 0,
        }
    }
}

/// Translates texts into many target languages with bounded concurrency
#[derive(Debug, Clone)]
pub struct BatchTranslator {
    /// The translator used for every target
    translator: Translator,

    /// Maximum number of targets in flight
    max_concurrent_requests: usize,

    /// Whether targets run concurrently or one after another
    parallel: bool,
}

impl BatchTranslator {
    /// Create a parallel batch translator with the default concurrency cap
    pub fn new(translator: Translator) -> Self {
        Self {
            translator,
            max_concurrent_requests: DEFAULT_CONCURRENT_REQUESTS,
            parallel: true,
        }
    }

    /// Set the concurrency cap (at least 1)
    pub fn with_max_concurrent_requests(mut self, max_concurrent_requests: usize) -> Self {
        self.max_concurrent_requests = max_concurrent_requests.max(1);
        self
    }

    /// Run targets concurrently (`true`) or sequentially (`false`)
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn max_concurrent_requests(&self) -> usize {
        self.max_concurrent_requests
    }

    /// Translate `texts` into every target
    ///
    /// Always returns exactly one result per target, in target order.
    pub async fn translate_batch<S: AsRef<str> + Sync>(
        &self,
        texts: &[S],
        source_language: Option<&str>,
        targets: &[BatchTarget],
        cancel: &CancellationToken,
    ) -> Vec<BatchResult> {
        let started = Instant::now();
        let results = if self.parallel {
            self.translate_parallel(texts, source_language, targets, cancel)
                .await
        } else {
            self.translate_sequential(texts, source_language, targets, cancel)
                .await
        };

        let failed = results.iter().filter(|r| !r.completed).count();
        if failed > 0 {
            error!(
                "Batch finished in {:?}: {} of {} targets failed",
                started.elapsed(),
                failed,
                results.len()
            );
        } else {
            info!(
                "Batch finished in {:?}: {} targets translated",
                started.elapsed(),
                results.len()
            );
        }
        results
    }

    async fn translate_sequential<S: AsRef<str> + Sync>(
        &self,
        texts: &[S],
        source_language: Option<&str>,
        targets: &[BatchTarget],
        cancel: &CancellationToken,
    ) -> Vec<BatchResult> {
        let mut results = Vec::with_capacity(targets.len());
        for target in targets {
            results.push(
                translate_target(&self.translator, texts, source_language, target, cancel).await,
            );
        }
        results
    }

    async fn translate_parallel<S: AsRef<str> + Sync>(
        &self,
        texts: &[S],
        source_language: Option<&str>,
        targets: &[BatchTarget],
        cancel: &CancellationToken,
    ) -> Vec<BatchResult> {
        let collected: Arc<Mutex<Vec<(usize, BatchResult)>>> =
            Arc::new(Mutex::new(Vec::with_capacity(targets.len())));

        // buffer_unordered caps the number of targets in flight
        stream::iter(targets.iter().enumerate())
            .map(|(index, target)| {
                let collected = collected.clone();
                let translator = &self.translator;

                async move {
                    debug!(
                        "Translating batch target {} ({})",
                        index + 1,
                        target.target_language
                    );
                    let result =
                        translate_target(translator, texts, source_language, target, cancel).await;
                    collected.lock().push((index, result));
                }
            })
            .buffer_unordered(self.max_concurrent_requests)
            .collect::<Vec<_>>()
            .await;

        let mut collected = std::mem::take(&mut *collected.lock());
        collected.sort_by_key(|(index, _)| *index);
        collected.into_iter().map(|(_, result)| result).collect()
    }
}

async fn translate_target<S: AsRef<str>>(
    translator: &Translator,
    texts: &[S],
    source_language: Option<&str>,
    target: &BatchTarget,
    cancel: &CancellationToken,
) -> BatchResult {
    match translator
        .translate_text(
            texts,
            source_language,
            &target.target_language,
            &target.options,
            cancel,
        )
        .await
    {
        Ok(translations) => BatchResult::success(target.target_language.clone(), translations),
        Err(e) => {
            error!("Batch target {} failed: {}", target.target_language, e);
            BatchResult::failure(target.target_language.clone(), &e)
        }
    }
}
