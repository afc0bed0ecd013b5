// SPDX-FileCopyrightText: 2026 Figrelay Contributors
// SPDX-License-Identifier: MIT

//! Outbound Figma REST client.
//!
//! The relay makes exactly one kind of outbound call: `GET /v1/files/{file_id}`, with the
//! access token configured at startup passed through verbatim.

use std::fmt;

use serde_json::Value;

const DEFAULT_BASE_URL: &str = "https://api.figma.com";
const TOKEN_HEADER: &str = "X-Figma-Token";

#[derive(Debug)]
pub enum FigmaError {
    MissingToken,
    Http(reqwest::Error),
    Status { status: u16, body: String },
}

impl fmt::Display for FigmaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingToken => {
                write!(f, "no Figma access token configured (set FIGMA_ACCESS_TOKEN)")
            }
            Self::Http(source) => write!(f, "figma api request failed: {source}"),
            Self::Status { status, body } => {
                write!(f, "figma api returned status {status}: {body}")
            }
        }
    }
}

impl std::error::Error for FigmaError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Http(source) => Some(source),
            _ => None,
        }
    }
}

pub struct FigmaClient {
    http: reqwest::Client,
    token: Option<String>,
    base_url: String,
}

impl FigmaClient {
    pub fn new(token: Option<String>) -> Self {
        Self { http: reqwest::Client::new(), token, base_url: DEFAULT_BASE_URL.to_owned() }
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    /// Fetches the file's document JSON. Any non-success status is surfaced as a
    /// [`FigmaError::Status`] with the response body as context.
    pub async fn get_file(&self, file_id: &str) -> Result<Value, FigmaError> {
        let token = self.token.as_deref().ok_or(FigmaError::MissingToken)?;
        let url = format!("{}/v1/files/{file_id}", self.base_url);

        let response = self
            .http
            .get(&url)
            .header(TOKEN_HEADER, token)
            .send()
            .await
            .map_err(FigmaError::Http)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FigmaError::Status { status: status.as_u16(), body });
        }

        response.json().await.map_err(FigmaError::Http)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn get_file_without_token_fails_fast() {
        let client = FigmaClient::new(None);
        let error = client.get_file("abc123").await.expect_err("must fail");
        assert!(matches!(error, FigmaError::MissingToken));
        assert!(error.to_string().contains("FIGMA_ACCESS_TOKEN"));
    }

    #[test]
    fn has_token_reflects_configuration() {
        assert!(!FigmaClient::new(None).has_token());
        assert!(FigmaClient::new(Some("token".to_owned())).has_token());
    }
}
