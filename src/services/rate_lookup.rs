//! Live tariff-rate lookup against the Gemini API
//!
//! Best-effort by contract: every failure path (no credential, network
//! error, bad status, unparseable reply) degrades to `None` so the caller
//! proceeds with the unpatched engine table.

use async_trait::async_trait;
use regex::Regex;

use crate::traits::RateLookup;

const GEMINI_MODEL: &str = "gemini-2.5-flash-lite";

/// Rates are scaled integers: 0% free trade up to 150% extreme protection
pub const MAX_SCALED_RATE: u16 = 15_000;

/// Country ids match the legacy engine's table rows
fn country_name(id: u8) -> String {
    match id {
        1 => "USA",
        2 => "China",
        3 => "India",
        4 => "Germany",
        5 => "Japan",
        6 => "South Korea",
        7 => "Vietnam",
        8 => "Malaysia",
        9 => "UK",
        10 => "France",
        _ => return id.to_string(),
    }
    .to_string()
}

fn category_name(id: u8) -> String {
    match id {
        1 => "Electronics",
        2 => "Steel",
        3 => "Agriculture",
        4 => "Automobiles",
        5 => "Textiles",
        6 => "Chemicals",
        7 => "Machinery",
        8 => "Pharmaceuticals",
        _ => return id.to_string(),
    }
    .to_string()
}

/// Prompt instructing the model to answer with a single bare number
fn build_prompt(exporter: &str, importer: &str, category: &str) -> String {
    format!(
        "You are a trade tariff expert with knowledge of WTO MFN rates and bilateral trade agreements.\n\n\
         Task: Return the most likely customs import tariff rate that {importer} applies on {category} goods imported from {exporter}.\n\n\
         Consider:\n\
         - WTO Most Favoured Nation (MFN) bound and applied rates\n\
         - Any active free trade agreements between {exporter} and {importer}\n\
         - Preferential rates if a trade agreement exists\n\
         - Typical tariff ranges for {category} in {importer}\n\n\
         Examples of realistic rates:\n\
         - USA on Steel from China: 25.0 (due to Section 301 tariffs)\n\
         - EU (Germany) on Electronics from Japan: 0.0 (EPA agreement)\n\
         - India on Automobiles from USA: 100.0 (high protection)\n\
         - USA on Textiles from Vietnam: 12.0\n\
         - China on Agriculture from USA: 25.0 (trade war tariffs)\n\n\
         Reply with ONLY a single number representing the percentage. \
         No % sign. No explanation. No text. Just the number.\n\
         Example reply: 25.0"
    )
}

/// Extract the first numeric token from a free-text reply and convert it to
/// a clamped scaled integer (25.0 -> 2500)
fn extract_scaled_rate(raw: &str) -> Option<u16> {
    let number = Regex::new(r"\d+(?:\.\d+)?").unwrap();
    let token = number.find(raw)?.as_str();
    let value: f64 = token.parse().ok()?;
    let scaled = (value * 100.0).round();
    Some(scaled.clamp(0.0, MAX_SCALED_RATE as f64) as u16)
}

/// Gemini-backed live rate lookup
pub struct GeminiRateLookup {
    api_key: Option<String>,
    client: reqwest::Client,
}

impl GeminiRateLookup {
    /// Create a new lookup; `None` for the key disables it entirely
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            api_key,
            client: reqwest::Client::new(),
        }
    }

    async fn query_gemini(&self, api_key: &str, prompt: &str) -> Result<String, String> {
        let request_body = serde_json::json!({
            "contents": [
                {
                    "parts": [
                        {
                            "text": prompt
                        }
                    ]
                }
            ],
            "generationConfig": {
                "temperature": 0
            }
        });

        let url = format!(
            "https://generativelanguage.googleapis.com/v1beta/models/{}:generateContent?key={}",
            GEMINI_MODEL, api_key
        );

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .json(&request_body)
            .send()
            .await
            .map_err(|e| format!("network error: {e}"))?;

        if !response.status().is_success() {
            return Err(format!("unexpected status: {}", response.status()));
        }

        let response_json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| format!("failed to parse response: {e}"))?;

        response_json
            .get("candidates")
            .and_then(|candidates| candidates.get(0))
            .and_then(|candidate| candidate.get("content"))
            .and_then(|content| content.get("parts"))
            .and_then(|parts| parts.get(0))
            .and_then(|part| part.get("text"))
            .and_then(|text| text.as_str())
            .map(|text| text.to_string())
            .ok_or_else(|| "no content in response".to_string())
    }
}

#[async_trait]
impl RateLookup for GeminiRateLookup {
    async fn live_rate(&self, exporter: u8, importer: u8, category: u8) -> Option<u16> {
        let api_key = self.api_key.as_deref()?;

        let prompt = build_prompt(
            &country_name(exporter),
            &country_name(importer),
            &category_name(category),
        );

        match self.query_gemini(api_key, &prompt).await {
            Ok(text) => {
                let rate = extract_scaled_rate(&text);
                if rate.is_none() {
                    tracing::warn!(reply = %text.trim(), "Gemini reply carried no numeric token");
                }
                rate
            }
            Err(reason) => {
                tracing::warn!(%reason, "Gemini lookup failed, proceeding without live rate");
                None
            }
        }
    }
}
