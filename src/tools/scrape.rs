//! Website content tool: Serper's scrape endpoint, with a direct-fetch
//! fallback when no API key is configured.

use async_trait::async_trait;
use serde_json::{json, Value};
use url::Url;

use super::{Tool, ToolParameter};

const SERPER_SCRAPE_URL: &str = "https://scrape.serper.dev";
const MAX_CONTENT_CHARS: usize = 20_000;

/// Fetch the raw text content of a website.
pub struct WebsiteContent {
    http: reqwest::Client,
    serper_api_key: Option<String>,
}

impl WebsiteContent {
    pub fn new(http: reqwest::Client, serper_api_key: Option<String>) -> Self {
        Self {
            http,
            serper_api_key,
        }
    }

    async fn scrape_via_serper(&self, key: &str, website: &str) -> Result<String, String> {
        let response = self
            .http
            .post(SERPER_SCRAPE_URL)
            .header("X-API-KEY", key)
            .json(&json!({ "url": website }))
            .send()
            .await
            .map_err(|e| e.to_string())?;

        if !response.status().is_success() {
            return Err(format!("scrape failed with status {}", response.status()));
        }

        let data: Value = response.json().await.map_err(|e| e.to_string())?;
        let content = data["text"]
            .as_str()
            .or_else(|| data["content"].as_str())
            .unwrap_or("No content found");

        Ok(json!({
            "website": website,
            "status": "success",
            "title": data["title"].as_str().unwrap_or("No title found"),
            "description": data["description"].as_str().unwrap_or("No description found"),
            "content": truncate(content),
            "url": data["url"].as_str().unwrap_or(website),
        })
        .to_string())
    }

    /// Fetch the page directly and strip it down to readable text.
    async fn fetch_directly(&self, website: &str) -> Result<String, String> {
        let response = self
            .http
            .get(website)
            .send()
            .await
            .map_err(|e| e.to_string())?;

        if !response.status().is_success() {
            return Err(format!("HTTP error: {}", response.status()));
        }

        let is_html = response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .map(|s| s.contains("text/html"))
            .unwrap_or(false);

        let body = response.text().await.map_err(|e| e.to_string())?;
        let content = if is_html { extract_text_from_html(&body) } else { body };

        Ok(json!({
            "website": website,
            "status": "success",
            "content": truncate(&content),
            "url": website,
        })
        .to_string())
    }
}

fn truncate(content: &str) -> String {
    if content.len() <= MAX_CONTENT_CHARS {
        return content.to_string();
    }
    let mut end = MAX_CONTENT_CHARS;
    while end > 0 && !content.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}... [content truncated]", &content[..end])
}

const PARAMS: [ToolParameter; 1] = [ToolParameter::required(
    "website",
    "string",
    "The website URL to scrape, e.g. \"https://www.visitrome.com\"",
)];

#[async_trait]
impl Tool for WebsiteContent {
    fn name(&self) -> &str {
        "get_raw_website_content"
    }

    fn description(&self) -> &str {
        "Scrape website content and return raw text without summarization. Useful for getting full details from a specific page."
    }

    fn parameters(&self) -> &[ToolParameter] {
        &PARAMS
    }

    async fn invoke(&self, args: &Value) -> anyhow::Result<String> {
        let website = args["website"].as_str().unwrap_or_default();

        if Url::parse(website).is_err() {
            return Ok(format!("Error while scraping website: invalid URL '{}'", website));
        }

        let result = match &self.serper_api_key {
            Some(key) => self.scrape_via_serper(key, website).await,
            None => self.fetch_directly(website).await,
        };

        Ok(result.unwrap_or_else(|e| format!("Error while scraping website: {}", e)))
    }
}

/// Extract readable text from HTML (simple approach).
fn extract_text_from_html(html: &str) -> String {
    // Remove script and style blocks first
    let mut text = html.to_string();

    for (open, close) in [("<script", "</script>"), ("<style", "</style>")] {
        while let Some(start) = text.find(open) {
            if let Some(end) = text[start..].find(close) {
                text = format!("{}{}", &text[..start], &text[start + end + close.len()..]);
            } else {
                break;
            }
        }
    }

    // Remove all remaining tags
    let mut result = String::new();
    let mut in_tag = false;

    for c in text.chars() {
        if c == '<' {
            in_tag = true;
        } else if c == '>' {
            in_tag = false;
            result.push(' ');
        } else if !in_tag {
            result.push(c);
        }
    }

    // Clean up whitespace
    let result: String = result.split_whitespace().collect::<Vec<_>>().join(" ");

    html_decode(&result)
}

/// Basic HTML entity decoding.
fn html_decode(s: &str) -> String {
    s.replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&nbsp;", " ")
}
