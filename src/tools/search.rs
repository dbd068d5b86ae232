//! Web and image search tools, backed by the Serper API.

use async_trait::async_trait;
use serde_json::{json, Value};

use super::{Tool, ToolParameter};

const SERPER_SEARCH_URL: &str = "https://google.serper.dev/search";
const SERPER_IMAGES_URL: &str = "https://google.serper.dev/images";

async fn serper_post(
    http: &reqwest::Client,
    url: &str,
    api_key: &str,
    query: &str,
) -> Result<Value, String> {
    let response = http
        .post(url)
        .header("X-API-KEY", api_key)
        .json(&json!({ "q": query }))
        .send()
        .await
        .map_err(|e| e.to_string())?;

    if !response.status().is_success() {
        return Err(format!("request failed with status {}", response.status()));
    }
    response.json().await.map_err(|e| e.to_string())
}

/// Search the web for information on a topic.
pub struct WebSearch {
    http: reqwest::Client,
    serper_api_key: Option<String>,
}

impl WebSearch {
    pub fn new(http: reqwest::Client, serper_api_key: Option<String>) -> Self {
        Self {
            http,
            serper_api_key,
        }
    }
}

const SEARCH_PARAMS: [ToolParameter; 2] = [
    ToolParameter::required(
        "query",
        "string",
        "The search query, e.g. \"best restaurants in Paris\"",
    ),
    ToolParameter::optional("max_results", "integer", "Maximum results to return (default: 4)"),
];

#[async_trait]
impl Tool for WebSearch {
    fn name(&self) -> &str {
        "get_search_results"
    }

    fn description(&self) -> &str {
        "Search the internet for information on a given topic. Returns relevant search results with titles, links, and snippets."
    }

    fn parameters(&self) -> &[ToolParameter] {
        &SEARCH_PARAMS
    }

    async fn invoke(&self, args: &Value) -> anyhow::Result<String> {
        let Some(key) = &self.serper_api_key else {
            return Ok("Error: SERPER_API_KEY is not configured".to_string());
        };
        let query = args["query"].as_str().unwrap_or_default();
        let max_results = args["max_results"].as_u64().unwrap_or(4) as usize;

        let data = match serper_post(&self.http, SERPER_SEARCH_URL, key, query).await {
            Ok(data) => data,
            Err(e) => return Ok(format!("Error during search: {}", e)),
        };

        let Some(organic) = data["organic"].as_array() else {
            return Ok("No results found or API error occurred.".to_string());
        };

        let results: Vec<Value> = organic
            .iter()
            .take(max_results)
            .enumerate()
            .map(|(i, result)| {
                json!({
                    "position": i + 1,
                    "title": result["title"].as_str().unwrap_or("No title available"),
                    "link": result["link"].as_str().unwrap_or("No link available"),
                    "snippet": result["snippet"].as_str().unwrap_or("No snippet available"),
                    "source": result["displayLink"].as_str().unwrap_or("Unknown source"),
                })
            })
            .collect();

        Ok(json!({
            "search_query": query,
            "total_results": results.len(),
            "results": results,
        })
        .to_string())
    }
}

/// Search the web for images.
pub struct ImageSearch {
    http: reqwest::Client,
    serper_api_key: Option<String>,
}

impl ImageSearch {
    pub fn new(http: reqwest::Client, serper_api_key: Option<String>) -> Self {
        Self {
            http,
            serper_api_key,
        }
    }
}

const IMAGE_PARAMS: [ToolParameter; 2] = [
    ToolParameter::required("query", "string", "The image search query, e.g. \"sunset beach\""),
    ToolParameter::optional("max_results", "integer", "Maximum image URLs to return (default: 5)"),
];

#[async_trait]
impl Tool for ImageSearch {
    fn name(&self) -> &str {
        "get_image_search_results"
    }

    fn description(&self) -> &str {
        "Search for images on the internet. Returns a list of relevant image URLs."
    }

    fn parameters(&self) -> &[ToolParameter] {
        &IMAGE_PARAMS
    }

    async fn invoke(&self, args: &Value) -> anyhow::Result<String> {
        let Some(key) = &self.serper_api_key else {
            return Ok("Error: SERPER_API_KEY is not configured".to_string());
        };
        let query = args["query"].as_str().unwrap_or_default();
        let max_results = args["max_results"].as_u64().unwrap_or(5) as usize;

        let data = match serper_post(&self.http, SERPER_IMAGES_URL, key, query).await {
            Ok(data) => data,
            Err(e) => return Ok(format!("Error during image search: {}", e)),
        };

        let Some(images) = data["images"].as_array() else {
            return Ok("No image results found or API error occurred.".to_string());
        };

        let results: Vec<&str> = images
            .iter()
            .take(max_results)
            .filter_map(|img| img["imageUrl"].as_str())
            .collect();

        Ok(json!({
            "search_query": query,
            "total_results": results.len(),
            "results": results,
        })
        .to_string())
    }
}
