//! Weather lookup tool, backed by the weather-agent HTTP endpoint.

use async_trait::async_trait;
use serde_json::{json, Value};

use super::{Tool, ToolParameter};

/// Answer weather questions for any location.
pub struct WeatherInfo {
    http: reqwest::Client,
    api_url: String,
}

impl WeatherInfo {
    pub fn new(http: reqwest::Client, api_url: String) -> Self {
        Self { http, api_url }
    }
}

const PARAMS: [ToolParameter; 1] = [ToolParameter::required(
    "query",
    "string",
    "A weather question, e.g. \"Will it rain in Dhaka tomorrow?\"",
)];

#[async_trait]
impl Tool for WeatherInfo {
    fn name(&self) -> &str {
        "weather_info"
    }

    fn description(&self) -> &str {
        "Get weather information for any location or weather-related query, e.g. 'What's the weather like in London?'"
    }

    fn parameters(&self) -> &[ToolParameter] {
        &PARAMS
    }

    async fn invoke(&self, args: &Value) -> anyhow::Result<String> {
        let query = args["query"].as_str().unwrap_or_default();

        let response = self
            .http
            .post(&self.api_url)
            .json(&json!({ "query": query }))
            .send()
            .await;

        let response = match response {
            Ok(r) => r,
            Err(e) => return Ok(format!("Error fetching weather data: {}", e)),
        };

        if !response.status().is_success() {
            return Ok(format!(
                "Failed to get weather information. Status code: {}",
                response.status()
            ));
        }

        let data: Value = match response.json().await {
            Ok(data) => data,
            Err(e) => return Ok(format!("Error fetching weather data: {}", e)),
        };

        let weather = data["response"]
            .as_str()
            .unwrap_or("No weather information available");
        let sentiment = data["sentiment"].as_f64().unwrap_or(0.0);

        Ok(format!(
            "Weather Information: {} (Sentiment: {})",
            weather, sentiment
        ))
    }
}
