/*!
 * Account usage and supported languages.
 */

use serde::{Deserialize, Serialize};
use std::fmt;
use tokio_util::sync::CancellationToken;

use super::core::Translator;
use crate::errors::Result;
use crate::http::{HttpRequest, StatusContext};

/// Count and limit of one usage dimension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageDetail {
    pub count: u64,
    pub limit: u64,
}

impl UsageDetail {
    pub fn limit_reached(&self) -> bool {
        self.count >= self.limit
    }
}

impl fmt::Display for UsageDetail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} of {}", self.count, self.limit)
    }
}

/// Usage of the current billing period
///
/// Dimensions the account has no limit for are `None`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Usage {
    pub character: Option<UsageDetail>,
    pub document: Option<UsageDetail>,
    pub team_document: Option<UsageDetail>,
}

impl Usage {
    pub fn any_limit_reached(&self) -> bool {
        [self.character, self.document, self.team_document]
            .iter()
            .flatten()
            .any(UsageDetail::limit_reached)
    }
}

#[derive(Debug, Deserialize)]
struct UsageResponse {
    character_count: Option<u64>,
    character_limit: Option<u64>,
    document_count: Option<u64>,
    document_limit: Option<u64>,
    team_document_count: Option<u64>,
    team_document_limit: Option<u64>,
}

fn detail(count: Option<u64>, limit: Option<u64>) -> Option<UsageDetail> {
    match (count, limit) {
        (Some(count), Some(limit)) => Some(UsageDetail { count, limit }),
        _ => None,
    }
}

impl From<UsageResponse> for Usage {
    fn from(r: UsageResponse) -> Self {
        Self {
            character: detail(r.character_count, r.character_limit),
            document: detail(r.document_count, r.document_limit),
            team_document: detail(r.team_document_count, r.team_document_limit),
        }
    }
}

/// A language supported by the API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Language {
    #[serde(rename = "language")]
    pub code: String,
    pub name: String,
    /// Only reported for target languages
    #[serde(default)]
    pub supports_formality: Option<bool>,
}

impl Translator {
    /// Usage and limits of the current billing period
    pub async fn get_usage(&self, cancel: &CancellationToken) -> Result<Usage> {
        let request = HttpRequest::get("/v2/usage");
        let response = self
            .executor()
            .execute(&request, StatusContext::default(), cancel)
            .await?;
        let usage: UsageResponse = response.json()?;
        Ok(usage.into())
    }

    pub async fn get_source_languages(&self, cancel: &CancellationToken) -> Result<Vec<Language>> {
        self.get_languages("source", cancel).await
    }

    pub async fn get_target_languages(&self, cancel: &CancellationToken) -> Result<Vec<Language>> {
        self.get_languages("target", cancel).await
    }

    async fn get_languages(&self, kind: &str, cancel: &CancellationToken) -> Result<Vec<Language>> {
        let request = HttpRequest::get("/v2/languages").query("type", kind);
        let response = self
            .executor()
            .execute(&request, StatusContext::default(), cancel)
            .await?;
        response.json()
    }
}
