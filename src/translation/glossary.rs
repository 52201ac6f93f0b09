/*!
 * Glossary management.
 *
 * Glossaries map source terms to fixed target terms for one language pair.
 * Entries travel as tab-separated values, one `source\ttarget` pair per line.
 */

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use super::core::Translator;
use crate::errors::{DeepLError, Result};
use crate::http::{HttpRequest, StatusContext};

/// Metadata of a stored glossary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlossaryInfo {
    pub glossary_id: String,
    pub name: String,
    /// Whether the glossary can be used in translations yet
    pub ready: bool,
    pub source_lang: String,
    pub target_lang: String,
    pub creation_time: DateTime<Utc>,
    pub entry_count: u64,
}

/// A language pair glossaries can be created for
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlossaryLanguagePair {
    pub source_lang: String,
    pub target_lang: String,
}

#[derive(Debug, Deserialize)]
struct GlossaryList {
    glossaries: Vec<GlossaryInfo>,
}

#[derive(Debug, Deserialize)]
struct LanguagePairList {
    supported_languages: Vec<GlossaryLanguagePair>,
}

/// Ordered source to target term pairs
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GlossaryEntries {
    entries: Vec<(String, String)>,
}

impl GlossaryEntries {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entry, replacing the target of an existing source term
    pub fn insert(&mut self, source: impl Into<String>, target: impl Into<String>) -> Result<()> {
        let source = source.into();
        let target = target.into();
        validate_term(&source)?;
        validate_term(&target)?;

        match self.entries.iter_mut().find(|(s, _)| *s == source) {
            Some(entry) => entry.1 = target,
            None => self.entries.push((source, target)),
        }
        Ok(())
    }

    pub fn get(&self, source: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(s, _)| s == source)
            .map(|(_, t)| t.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(s, t)| (s.as_str(), t.as_str()))
    }

    /// Serialize to the tab-separated format the API accepts
    pub fn to_tsv(&self) -> String {
        self.entries
            .iter()
            .map(|(s, t)| format!("{}\t{}", s, t))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Parse tab-separated entries, skipping blank lines
    pub fn from_tsv(tsv: &str) -> Result<Self> {
        let mut entries = Self::new();
        for (line_number, line) in tsv.lines().enumerate() {
            let line = line.trim_end_matches('\r');
            if line.trim().is_empty() {
                continue;
            }
            let (source, target) = line.split_once('\t').ok_or_else(|| {
                DeepLError::InvalidArgument(format!(
                    "glossary entry on line {} is missing a tab separator",
                    line_number + 1
                ))
            })?;
            if entries.get(source.trim()).is_some() {
                return Err(DeepLError::InvalidArgument(format!(
                    "duplicate source term '{}' on line {}",
                    source.trim(),
                    line_number + 1
                )));
            }
            entries.insert(source.trim(), target.trim())?;
        }
        Ok(entries)
    }
}

fn validate_term(term: &str) -> Result<()> {
    if term.trim().is_empty() {
        return Err(DeepLError::InvalidArgument(
            "glossary terms must not be empty".to_string(),
        ));
    }
    if term.contains(['\t', '\n', '\r']) {
        return Err(DeepLError::InvalidArgument(format!(
            "glossary term '{}' contains a tab or line break",
            term.escape_debug()
        )));
    }
    Ok(())
}

impl Translator {
    /// Create a glossary for one language pair
    pub async fn create_glossary(
        &self,
        name: &str,
        source_lang: &str,
        target_lang: &str,
        entries: &GlossaryEntries,
        cancel: &CancellationToken,
    ) -> Result<GlossaryInfo> {
        if name.trim().is_empty() {
            return Err(DeepLError::InvalidArgument(
                "glossary name must not be empty".to_string(),
            ));
        }
        if entries.is_empty() {
            return Err(DeepLError::InvalidArgument(
                "glossary must contain at least one entry".to_string(),
            ));
        }

        let request = HttpRequest::post("/v2/glossaries").form(vec![
            ("name".to_string(), name.to_string()),
            ("source_lang".to_string(), source_lang.to_string()),
            ("target_lang".to_string(), target_lang.to_string()),
            ("entries_format".to_string(), "tsv".to_string()),
            ("entries".to_string(), entries.to_tsv()),
        ]);
        let response = self
            .executor()
            .execute(&request, StatusContext::default(), cancel)
            .await?;
        response.json()
    }

    pub async fn get_glossary(
        &self,
        glossary_id: &str,
        cancel: &CancellationToken,
    ) -> Result<GlossaryInfo> {
        let request = HttpRequest::get(format!("/v2/glossaries/{}", glossary_id));
        let response = self
            .executor()
            .execute(&request, StatusContext::glossary(), cancel)
            .await?;
        response.json()
    }

    pub async fn list_glossaries(&self, cancel: &CancellationToken) -> Result<Vec<GlossaryInfo>> {
        let request = HttpRequest::get("/v2/glossaries");
        let response = self
            .executor()
            .execute(&request, StatusContext::default(), cancel)
            .await?;
        let list: GlossaryList = response.json()?;
        Ok(list.glossaries)
    }

    pub async fn delete_glossary(&self, glossary_id: &str, cancel: &CancellationToken) -> Result<()> {
        let request = HttpRequest::delete(format!("/v2/glossaries/{}", glossary_id));
        self.executor()
            .execute(&request, StatusContext::glossary(), cancel)
            .await?;
        Ok(())
    }

    /// Fetch the entries stored in a glossary
    pub async fn get_glossary_entries(
        &self,
        glossary_id: &str,
        cancel: &CancellationToken,
    ) -> Result<GlossaryEntries> {
        let request = HttpRequest::get(format!("/v2/glossaries/{}/entries", glossary_id))
            .header("Accept", "text/tab-separated-values");
        let response = self
            .executor()
            .execute(&request, StatusContext::glossary(), cancel)
            .await?;
        GlossaryEntries::from_tsv(&response.text())
            .map_err(|e| DeepLError::InvalidResponse(e.to_string()))
    }

    /// Language pairs glossaries can be created for
    pub async fn get_glossary_language_pairs(
        &self,
        cancel: &CancellationToken,
    ) -> Result<Vec<GlossaryLanguagePair>> {
        let request = HttpRequest::get("/v2/glossary-language-pairs");
        let response = self
            .executor()
            .execute(&request, StatusContext::default(), cancel)
            .await?;
        let pairs: LanguagePairList = response.json()?;
        Ok(pairs.supported_languages)
    }
}
