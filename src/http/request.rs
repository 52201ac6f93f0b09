/*!
 * Request and response values passed between the executor and a transport.
 *
 * Bodies are owned data rather than reqwest builders so the same logical
 * request can be sent again on every retry attempt.
 */

use bytes::Bytes;
use reqwest::Method;
use serde::de::DeserializeOwned;

use crate::errors::{DeepLError, Result};

/// File attached to a multipart request
#[derive(Debug, Clone)]
pub struct FilePart {
    /// Form field name
    pub field_name: String,
    /// File name reported to the server
    pub filename: String,
    /// Raw file content
    pub content: Bytes,
}

/// Body of an API request
#[derive(Debug, Clone, Default)]
pub enum RequestBody {
    #[default]
    Empty,
    /// `application/x-www-form-urlencoded`, keys may repeat
    Form(Vec<(String, String)>),
    /// `multipart/form-data` with text fields and one file
    Multipart {
        fields: Vec<(String, String)>,
        file: FilePart,
    },
}

/// A single logical API request, relative to the server URL
#[derive(Debug, Clone)]
pub struct HttpRequest {
    /// HTTP method
    pub method: Method,
    /// Path below the server URL, e.g. `/v2/translate`
    pub path: String,
    /// Query string parameters
    pub query: Vec<(String, String)>,
    /// Request headers, on top of the client-wide ones
    pub headers: Vec<(String, String)>,
    /// Request body
    pub body: RequestBody,
}

impl HttpRequest {
    /// Create a request with the given method and path
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            headers: Vec::new(),
            body: RequestBody::Empty,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Add a query parameter
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Add a header
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((key.into(), value.into()));
        self
    }

    /// Set a form-encoded body
    pub fn form(mut self, fields: Vec<(String, String)>) -> Self {
        self.body = RequestBody::Form(fields);
        self
    }

    /// Set a multipart body
    pub fn multipart(mut self, fields: Vec<(String, String)>, file: FilePart) -> Self {
        self.body = RequestBody::Multipart { fields, file };
        self
    }

    /// Value of the first form or multipart field with the given name
    pub fn field(&self, name: &str) -> Option<&str> {
        let fields = match &self.body {
            RequestBody::Form(fields) => fields,
            RequestBody::Multipart { fields, .. } => fields,
            RequestBody::Empty => return None,
        };
        fields
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// All values of a repeated form or multipart field
    pub fn fields(&self, name: &str) -> Vec<&str> {
        match &self.body {
            RequestBody::Form(fields) | RequestBody::Multipart { fields, .. } => fields
                .iter()
                .filter(|(key, _)| key == name)
                .map(|(_, value)| value.as_str())
                .collect(),
            RequestBody::Empty => Vec::new(),
        }
    }
}

/// Buffered HTTP response
#[derive(Debug, Clone)]
pub struct HttpResponse {
    /// Status code
    pub status: u16,
    /// Response body
    pub body: Bytes,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Decode the body as JSON
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_slice(&self.body).map_err(|e| {
            DeepLError::InvalidResponse(format!(
                "{} (body: {})",
                e,
                truncate(&String::from_utf8_lossy(&self.body), 200)
            ))
        })
    }

    /// Body as UTF-8 text, replacing invalid sequences
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() > max_chars {
        text.chars().take(max_chars).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}
