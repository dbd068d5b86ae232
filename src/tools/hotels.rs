//! Hotel search tool, backed by the Apify TripAdvisor actor.

use async_trait::async_trait;
use serde_json::{json, Value};

use super::{Tool, ToolParameter};

/// TripAdvisor scraper actor on Apify.
pub(crate) const TRIPADVISOR_ACTOR: &str = "dbEyMBriog95Fv8CW";

pub(crate) fn apify_run_sync_url(actor: &str, token: &str) -> String {
    format!(
        "https://api.apify.com/v2/acts/{}/run-sync-get-dataset-items?token={}",
        actor,
        urlencoding::encode(token)
    )
}

/// Search for hotels in a location.
pub struct HotelSearch {
    http: reqwest::Client,
    apify_token: Option<String>,
}

impl HotelSearch {
    pub fn new(http: reqwest::Client, apify_token: Option<String>) -> Self {
        Self { http, apify_token }
    }
}

const PARAMS: [ToolParameter; 4] = [
    ToolParameter::required(
        "location",
        "string",
        "City or location to search, e.g. \"Lauterbrunnen,Switzerland\"",
    ),
    ToolParameter::required("checkinDate", "string", "Check-in date, YYYY-MM-DD"),
    ToolParameter::required("checkoutDate", "string", "Check-out date, YYYY-MM-DD"),
    ToolParameter::optional("max_items", "integer", "Maximum hotels to return (default: 1)"),
];

#[async_trait]
impl Tool for HotelSearch {
    fn name(&self) -> &str {
        "get_hotels"
    }

    fn description(&self) -> &str {
        "Search for hotels in a specific location. Returns hotel data including name, description, address, geocode, reviews, rating, price range, amenities, contact info, and images."
    }

    fn parameters(&self) -> &[ToolParameter] {
        &PARAMS
    }

    async fn invoke(&self, args: &Value) -> anyhow::Result<String> {
        let Some(token) = &self.apify_token else {
            return Ok("Error searching hotels: APIFY_API_TOKEN is not configured".to_string());
        };
        let location = args["location"].as_str().unwrap_or_default();
        let max_items = args["max_items"].as_u64().unwrap_or(1);

        let run_input = json!({
            "query": location,
            "checkInDate": args["checkinDate"].as_str().unwrap_or_default(),
            "checkOutDate": args["checkoutDate"].as_str().unwrap_or_default(),
            "currency": "USD",
            "includeAiReviewsSummary": false,
            "includeAttractions": false,
            "includeHotels": true,
            "includeNearbyResults": true,
            "includePriceOffers": true,
            "includeRestaurants": false,
            "includeTags": true,
            "includeVacationRentals": false,
            "language": "en",
            "maxItemsPerQuery": max_items,
        });

        let response = self
            .http
            .post(apify_run_sync_url(TRIPADVISOR_ACTOR, token))
            .json(&run_input)
            .send()
            .await;

        let response = match response {
            Ok(r) => r,
            Err(e) => return Ok(format!("Error searching hotels: {}", e)),
        };
        if !response.status().is_success() {
            return Ok(format!(
                "Error searching hotels: API returned status {}",
                response.status()
            ));
        }

        let items: Vec<Value> = match response.json().await {
            Ok(items) => items,
            Err(e) => return Ok(format!("Error searching hotels: {}", e)),
        };

        let hotels: Vec<Value> = items.iter().map(hotel_from_item).collect();
        Ok(json!({ "hotels": hotels }).to_string())
    }
}

/// Map one raw dataset item to the hotel shape the agent expects.
fn hotel_from_item(item: &Value) -> Value {
    let name = item["name"]
        .as_str()
        .or_else(|| item["locationString"].as_str())
        .unwrap_or("Unknown Hotel");
    let location = item["locationString"].as_str().unwrap_or("Unknown");

    json!({
        "name": name,
        "description": item["description"]
            .as_str()
            .map(String::from)
            .unwrap_or_else(|| format!("{} in {}", name, location)),
        "booking_url": item["webUrl"].as_str().or_else(|| item["website"].as_str()),
        "address": item["address"].as_str().unwrap_or("Address not available"),
        "geocode": {
            "latitude": item["latitude"].as_f64().unwrap_or(0.0),
            "longitude": item["longitude"].as_f64().unwrap_or(0.0),
        },
        "phone": item["phone"].as_str(),
        "number_of_reviews": item["numberOfReviews"].as_u64().unwrap_or(0),
        "rating": item["rating"].as_f64().unwrap_or(0.0),
        "price_range": item["priceRange"].as_str(),
        "amenities": item["amenities"].clone(),
        "image_urls": image_urls(item),
    })
}

pub(crate) fn image_urls(item: &Value) -> Vec<Value> {
    item["photos"]
        .as_array()
        .map(|photos| photos.iter().take(5).cloned().collect())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_token_yields_error_string() {
        let tool = HotelSearch::new(reqwest::Client::new(), None);
        let out = tool
            .invoke(&json!({
                "location": "Paris,France",
                "checkinDate": "2025-06-01",
                "checkoutDate": "2025-06-03"
            }))
            .await
            .unwrap();
        assert!(out.contains("APIFY_API_TOKEN"));
    }

    #[test]
    fn hotel_mapping_fills_defaults() {
        let item = json!({
            "name": "Hotel A",
            "webUrl": "https://a.example/book",
            "latitude": 48.85,
            "longitude": 2.35,
            "photos": ["p1", "p2", "p3", "p4", "p5", "p6"]
        });
        let hotel = hotel_from_item(&item);
        assert_eq!(hotel["name"], "Hotel A");
        assert_eq!(hotel["booking_url"], "https://a.example/book");
        assert_eq!(hotel["address"], "Address not available");
        assert_eq!(hotel["image_urls"].as_array().unwrap().len(), 5);
        assert_eq!(hotel["description"], "Hotel A in Unknown");
    }

    #[test]
    fn run_sync_url_escapes_token() {
        let url = apify_run_sync_url(TRIPADVISOR_ACTOR, "a b");
        assert!(url.contains("token=a%20b"));
    }
}
