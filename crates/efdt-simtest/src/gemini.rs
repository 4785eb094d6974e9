//! Gemini-backed insight provider.
//!
//! Best effort: any failure (network, HTTP status, unexpected body) is
//! logged and reported as "no insight".

use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use efdt_logic::insight::{InsightProvider, InsightSummary};
use serde_json::{json, Value};

const DEFAULT_GEMINI_ENDPOINT: &str = "https://generativelanguage.googleapis.com";
const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub struct GeminiInsight {
    client: reqwest::blocking::Client,
    api_key: String,
    url: String,
}

impl GeminiInsight {
    pub fn new(api_key: String, endpoint: &str, model: &str) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("building HTTP client")?;
        Ok(Self {
            client,
            api_key,
            url: generate_content_url(endpoint, model),
        })
    }

    /// Reads `GEMINI_API_KEY`, plus optional `GEMINI_ENDPOINT` and
    /// `GEMINI_MODEL`. `Ok(None)` when no key is set.
    pub fn from_env() -> Result<Option<Self>> {
        let api_key = match std::env::var("GEMINI_API_KEY") {
            Ok(key) if !key.trim().is_empty() => key,
            _ => return Ok(None),
        };
        let endpoint = std::env::var("GEMINI_ENDPOINT")
            .unwrap_or_else(|_| DEFAULT_GEMINI_ENDPOINT.to_string());
        let model =
            std::env::var("GEMINI_MODEL").unwrap_or_else(|_| DEFAULT_GEMINI_MODEL.to_string());
        Self::new(api_key, &endpoint, &model).map(Some)
    }

    fn generate(&self, prompt: &str) -> Result<String> {
        let payload = json!({
            "contents": [
                { "parts": [ { "text": prompt } ] }
            ]
        });

        let response = self
            .client
            .post(&self.url)
            .header("x-goog-api-key", &self.api_key)
            .json(&payload)
            .send()
            .context("gemini request failed")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            bail!("gemini error {}: {}", status, truncate(&body, 320));
        }

        let body: Value = response.json().context("invalid gemini response")?;
        extract_text(&body).ok_or_else(|| anyhow!("gemini response had no text"))
    }
}

impl InsightProvider for GeminiInsight {
    fn name(&self) -> &str {
        "gemini"
    }

    fn fetch_insight(&self, summary: &InsightSummary) -> Option<String> {
        match self.generate(&summary.prompt()) {
            Ok(text) => Some(text),
            Err(e) => {
                log::warn!("insight request failed: {e:#}");
                None
            }
        }
    }
}

fn generate_content_url(endpoint: &str, model: &str) -> String {
    format!(
        "{}/v1beta/models/{}:generateContent",
        endpoint.trim_end_matches('/'),
        model
    )
}

/// Text parts of the first candidate, joined by newlines.
fn extract_text(body: &Value) -> Option<String> {
    let text = body["candidates"]
        .as_array()
        .and_then(|candidates| candidates.first())
        .and_then(|candidate| candidate["content"]["parts"].as_array())
        .map(|parts| {
            parts
                .iter()
                .filter_map(|part| part["text"].as_str())
                .collect::<Vec<_>>()
                .join("\n")
        })?;
    if text.trim().is_empty() {
        None
    } else {
        Some(text)
    }
}

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_chars).collect();
        format!("{head}…")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url() {
        assert_eq!(
            generate_content_url("https://example.test/", "gemini-x"),
            "https://example.test/v1beta/models/gemini-x:generateContent"
        );
    }

    #[test]
    fn test_extract_text_joins_parts() {
        let body = json!({
            "candidates": [
                { "content": { "parts": [ { "text": "One." }, { "text": "Two." } ] } },
                { "content": { "parts": [ { "text": "ignored" } ] } }
            ]
        });
        assert_eq!(extract_text(&body).as_deref(), Some("One.\nTwo."));
    }

    #[test]
    fn test_extract_text_missing_or_blank() {
        assert_eq!(extract_text(&json!({})), None);
        assert_eq!(extract_text(&json!({ "candidates": [] })), None);
        let blank = json!({ "candidates": [ { "content": { "parts": [ { "text": " " } ] } } ] });
        assert_eq!(extract_text(&blank), None);
    }

    #[test]
    fn test_unreachable_endpoint_yields_no_insight() {
        // Port 9 (discard) on localhost refuses connections
        let provider =
            GeminiInsight::new("key".to_string(), "http://127.0.0.1:9", "gemini-x").unwrap();
        let summary = InsightSummary {
            city: "Pune".to_string(),
            top_site_ids: vec!["PUN-001".to_string()],
            avg_suitability_score: 300.0,
            verified_credits: 100,
            compliance_grade: "A".to_string(),
            compliance_rate: 100.0,
            climate_viability: 90.0,
            roi: 40.0,
            total_jobs: 500,
        };
        assert_eq!(provider.fetch_insight(&summary), None);
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdef", 3), "abc…");
    }
}
