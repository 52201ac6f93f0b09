/*!
 * Text translation.
 *
 * A single `POST /v2/translate` request carrying one or more texts for one
 * target language. This is the unit of work the batch fan-out repeats per
 * target.
 */

use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use super::core::Translator;
use crate::errors::{DeepLError, Result};
use crate::http::{HttpRequest, StatusContext};

/// Desired formality of the translation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Formality {
    #[default]
    Default,
    More,
    Less,
    PreferMore,
    PreferLess,
}

impl Formality {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::More => "more",
            Self::Less => "less",
            Self::PreferMore => "prefer_more",
            Self::PreferLess => "prefer_less",
        }
    }
}

/// How the server splits input into sentences
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SplitSentences {
    /// No splitting at all
    Off,
    /// Split on punctuation and newlines
    All,
    /// Split on punctuation only
    NoNewlines,
}

impl SplitSentences {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Off => "0",
            Self::All => "1",
            Self::NoNewlines => "nonewlines",
        }
    }
}

/// Markup handling for the input text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TagHandling {
    Xml,
    Html,
}

impl TagHandling {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Xml => "xml",
            Self::Html => "html",
        }
    }
}

/// Options for a text translation request
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextTranslateOptions {
    #[serde(default)]
    pub formality: Option<Formality>,
    #[serde(default)]
    pub split_sentences: Option<SplitSentences>,
    #[serde(default)]
    pub preserve_formatting: Option<bool>,
    #[serde(default)]
    pub tag_handling: Option<TagHandling>,
    /// Additional context that influences the translation but is not translated
    #[serde(default)]
    pub context: Option<String>,
    #[serde(default)]
    pub glossary_id: Option<String>,
}

impl TextTranslateOptions {
    /// Append the form fields for these options
    pub(crate) fn append_fields(&self, fields: &mut Vec<(String, String)>) {
        if let Some(formality) = self.formality {
            fields.push(("formality".to_string(), formality.as_str().to_string()));
        }
        if let Some(split) = self.split_sentences {
            fields.push(("split_sentences".to_string(), split.as_str().to_string()));
        }
        if let Some(preserve) = self.preserve_formatting {
            let value = if preserve { "1" } else { "0" };
            fields.push(("preserve_formatting".to_string(), value.to_string()));
        }
        if let Some(tag_handling) = self.tag_handling {
            fields.push(("tag_handling".to_string(), tag_handling.as_str().to_string()));
        }
        if let Some(context) = &self.context {
            fields.push(("context".to_string(), context.clone()));
        }
        if let Some(glossary_id) = &self.glossary_id {
            fields.push(("glossary_id".to_string(), glossary_id.clone()));
        }
    }
}

/// One translated text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextResult {
    /// Translated text
    pub text: String,
    /// Source language, as given or as detected by the server
    pub detected_source_language: String,
    /// Characters billed for this text
    #[serde(default)]
    pub billed_characters: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct TranslateResponse {
    translations: Vec<TextResult>,
}

impl Translator {
    /// Translate `texts` into `target_language`
    ///
    /// Results come back in input order. `source_language` of `None` lets the
    /// server detect it.
    pub async fn translate_text<S: AsRef<str>>(
        &self,
        texts: &[S],
        source_language: Option<&str>,
        target_language: &str,
        options: &TextTranslateOptions,
        cancel: &CancellationToken,
    ) -> Result<Vec<TextResult>> {
        if texts.is_empty() {
            return Err(DeepLError::InvalidArgument(
                "at least one text is required".to_string(),
            ));
        }
        if target_language.trim().is_empty() {
            return Err(DeepLError::InvalidArgument(
                "target language must not be empty".to_string(),
            ));
        }
        if options.glossary_id.is_some() && source_language.is_none() {
            return Err(DeepLError::InvalidArgument(
                "source language is required when using a glossary".to_string(),
            ));
        }

        let mut fields: Vec<(String, String)> = texts
            .iter()
            .map(|text| ("text".to_string(), text.as_ref().to_string()))
            .collect();
        fields.push(("target_lang".to_string(), target_language.to_string()));
        if let Some(source) = source_language {
            fields.push(("source_lang".to_string(), source.to_string()));
        }
        fields.push(("show_billed_characters".to_string(), "1".to_string()));
        options.append_fields(&mut fields);

        let context = StatusContext {
            using_glossary: options.glossary_id.is_some(),
            ..StatusContext::default()
        };
        let request = HttpRequest::post("/v2/translate").form(fields);
        let response = self.executor().execute(&request, context, cancel).await?;
        let parsed: TranslateResponse = response.json()?;

        if parsed.translations.len() != texts.len() {
            return Err(DeepLError::InvalidResponse(format!(
                "expected {} translations, got {}",
                texts.len(),
                parsed.translations.len()
            )));
        }
        Ok(parsed.translations)
    }
}
