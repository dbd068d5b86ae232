//! Image description tool, backed by Gemini's multimodal API.
//!
//! Fetches the image bytes and sends them inline with the query, so the
//! agent can reason about user-provided photos when writing blogs.

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde_json::{json, Value};

use super::{Tool, ToolParameter};

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";
const VISION_MODEL: &str = "gemini-1.5-flash";

/// Describe an image at a URL.
pub struct DescribeImage {
    http: reqwest::Client,
    google_api_key: Option<String>,
}

impl DescribeImage {
    pub fn new(http: reqwest::Client, google_api_key: Option<String>) -> Self {
        Self {
            http,
            google_api_key,
        }
    }

    async fn fetch_image(&self, image_url: &str) -> Result<(String, Vec<u8>), String> {
        let response = self
            .http
            .get(image_url)
            .send()
            .await
            .map_err(|e| e.to_string())?;

        if !response.status().is_success() {
            return Err(format!("image fetch failed with status {}", response.status()));
        }

        let mime = response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("image/jpeg")
            .to_string();
        let bytes = response.bytes().await.map_err(|e| e.to_string())?;
        Ok((mime, bytes.to_vec()))
    }
}

const PARAMS: [ToolParameter; 2] = [
    ToolParameter::required(
        "query",
        "string",
        "What to describe, e.g. \"Describe the scene, key objects, and travel context\"",
    ),
    ToolParameter::required("image_url", "string", "URL of the image to analyze"),
];

#[async_trait]
impl Tool for DescribeImage {
    fn name(&self) -> &str {
        "get_multimodal_capability"
    }

    fn description(&self) -> &str {
        "Analyze an image at a URL and answer a question about it: scenes, objects, moods, activities."
    }

    fn parameters(&self) -> &[ToolParameter] {
        &PARAMS
    }

    async fn invoke(&self, args: &Value) -> anyhow::Result<String> {
        let Some(key) = &self.google_api_key else {
            return Ok("Error analyzing image: GEMINI_API_KEY is not configured".to_string());
        };
        let query = args["query"].as_str().unwrap_or("Describe this picture.");
        let image_url = args["image_url"].as_str().unwrap_or_default();

        let (mime, bytes) = match self.fetch_image(image_url).await {
            Ok(image) => image,
            Err(e) => return Ok(format!("Error fetching image from URL: {}", e)),
        };

        let url = format!(
            "{}/{}:generateContent?key={}",
            GEMINI_API_BASE,
            VISION_MODEL,
            urlencoding::encode(key)
        );
        let body = json!({
            "contents": [{
                "parts": [
                    { "text": query },
                    { "inline_data": { "mime_type": mime, "data": BASE64.encode(&bytes) } }
                ]
            }]
        });

        let response = match self.http.post(&url).json(&body).send().await {
            Ok(r) => r,
            Err(e) => return Ok(format!("Error analyzing image: {}", e)),
        };
        if !response.status().is_success() {
            return Ok(format!(
                "Error analyzing image: API returned status {}",
                response.status()
            ));
        }

        let payload: Value = match response.json().await {
            Ok(p) => p,
            Err(e) => return Ok(format!("Error analyzing image: {}", e)),
        };

        let text: String = payload["candidates"][0]["content"]["parts"]
            .as_array()
            .map(|parts| {
                parts
                    .iter()
                    .filter_map(|p| p["text"].as_str())
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        if text.is_empty() {
            Ok("Error analyzing image: empty model response".to_string())
        } else {
            Ok(text)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_key_yields_error_string() {
        let tool = DescribeImage::new(reqwest::Client::new(), None);
        let out = tool
            .invoke(&json!({"query": "what is this", "image_url": "https://img.test/a.jpg"}))
            .await
            .unwrap();
        assert!(out.contains("GEMINI_API_KEY"));
    }
}
