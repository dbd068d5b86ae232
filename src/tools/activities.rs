//! Activity and attraction search tool, backed by the Apify TripAdvisor
//! actor.

use async_trait::async_trait;
use serde_json::{json, Value};

use super::hotels::{apify_run_sync_url, image_urls, TRIPADVISOR_ACTOR};
use super::{Tool, ToolParameter};

/// Search for activities, attractions, and restaurants in a location.
pub struct ActivitySearch {
    http: reqwest::Client,
    apify_token: Option<String>,
}

impl ActivitySearch {
    pub fn new(http: reqwest::Client, apify_token: Option<String>) -> Self {
        Self { http, apify_token }
    }
}

const PARAMS: [ToolParameter; 2] = [
    ToolParameter::required(
        "location",
        "string",
        "City or location to search, e.g. \"London,UK\"",
    ),
    ToolParameter::optional("max_items", "integer", "Maximum items to return (default: 2)"),
];

#[async_trait]
impl Tool for ActivitySearch {
    fn name(&self) -> &str {
        "get_activities"
    }

    fn description(&self) -> &str {
        "Search for activities, attractions, and restaurants in a specific location. Returns places to visit with ratings, addresses, and booking links."
    }

    fn parameters(&self) -> &[ToolParameter] {
        &PARAMS
    }

    async fn invoke(&self, args: &Value) -> anyhow::Result<String> {
        let Some(token) = &self.apify_token else {
            return Ok("Error searching activities: APIFY_API_TOKEN is not configured".to_string());
        };
        let location = args["location"].as_str().unwrap_or_default();
        let max_items = args["max_items"].as_u64().unwrap_or(2);

        let run_input = json!({
            "query": location,
            "maxItemsPerQuery": max_items,
            "includeTags": true,
            "includeNearbyResults": true,
            "includeAttractions": true,
            "includeRestaurants": true,
            "includeHotels": false,
            "includeVacationRentals": false,
            "includePriceOffers": false,
            "includeAiReviewsSummary": false,
            "language": "en",
            "currency": "USD",
        });

        let response = self
            .http
            .post(apify_run_sync_url(TRIPADVISOR_ACTOR, token))
            .json(&run_input)
            .send()
            .await;

        let response = match response {
            Ok(r) => r,
            Err(e) => return Ok(format!("Error searching activities: {}", e)),
        };
        if !response.status().is_success() {
            return Ok(format!(
                "Error searching activities: API returned status {}",
                response.status()
            ));
        }

        let items: Vec<Value> = match response.json().await {
            Ok(items) => items,
            Err(e) => return Ok(format!("Error searching activities: {}", e)),
        };

        let activities: Vec<Value> = items.iter().map(activity_from_item).collect();
        Ok(json!({ "activities": activities }).to_string())
    }
}

fn activity_from_item(item: &Value) -> Value {
    let title = item["name"]
        .as_str()
        .or_else(|| item["locationString"].as_str())
        .unwrap_or("Unknown");
    let location = item["locationString"].as_str().unwrap_or("Unknown");

    json!({
        "tag": item["category"].as_str(),
        "title": title,
        "description": item["description"]
            .as_str()
            .map(String::from)
            .unwrap_or_else(|| format!("{} in {}", title, location)),
        "minimum_duration": "1-2 hours",
        "booking_url": item["webUrl"].as_str().or_else(|| item["website"].as_str()),
        "address": item["address"].as_str().unwrap_or("Address not available"),
        "geocode": {
            "latitude": item["latitude"].as_f64().unwrap_or(0.0),
            "longitude": item["longitude"].as_f64().unwrap_or(0.0),
        },
        "NumberOfReviews": item["numberOfReviews"].as_u64().unwrap_or(0),
        "Rating": item["rating"].as_f64().unwrap_or(0.0),
        "image_urls": image_urls(item),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_token_yields_error_string() {
        let tool = ActivitySearch::new(reqwest::Client::new(), None);
        let out = tool.invoke(&json!({"location": "Rome,Italy"})).await.unwrap();
        assert!(out.contains("APIFY_API_TOKEN"));
    }

    #[test]
    fn activity_mapping_defaults_duration() {
        let item = json!({"name": "Test Museum", "category": "museum"});
        let activity = activity_from_item(&item);
        assert_eq!(activity["title"], "Test Museum");
        assert_eq!(activity["minimum_duration"], "1-2 hours");
        assert_eq!(activity["tag"], "museum");
    }
}
