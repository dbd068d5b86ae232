//! Trip-planning agent: tool wiring, query enhancement, and defensive
//! post-processing of the loop's final answer.

use std::sync::Arc;

use chrono::{Duration, Utc};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::agent::ReactAgent;
use crate::config::Config;
use crate::llm::ModelClient;
use crate::tools::{
    ActivitySearch, HotelSearch, ImageSearch, ToolError, ToolRegistry, WeatherInfo, WebSearch,
    WebsiteContent,
};

const TRIP_SYSTEM_PROMPT: &str = r#"You are an expert trip planning assistant that creates comprehensive travel itineraries. Help users plan trips by following these steps:

1. SEARCH FOR DESTINATIONS: Use web search to find the best cities/destinations based on user requirements
2. FIND ACCOMMODATIONS: For each destination, find the best hotel using the hotels tool
3. DISCOVER ACTIVITIES: Find top activities and attractions in each city using the activities tool
4. CREATE STRUCTURED RESPONSE: Always respond with a complete JSON structure matching the exact format below

CRITICAL RESPONSE FORMAT - your final response must be a JSON object in this exact structure:

{
  "message": "Your conversational response to the user",
  "Requirement_options": ["extracted user preferences/requirements"],
  "intent": "trip_planning",
  "sessionId": "provided session ID",
  "timestamp": "current ISO timestamp",
  "itinerary": {
    "overview": {
      "start_location": "departure city/location",
      "destination_location": "main destination or 'Multiple Cities'",
      "summary": "brief trip summary",
      "duration_days": 0,
      "people_count": 0,
      "start_date": "YYYY-MM-DD",
      "end_date": "YYYY-MM-DD",
      "image_urls": ["relevant destination images"],
      "Estimated_overall_cost": 0
    },
    "Cities": [
      {
        "travel": {
          "from": "departure location",
          "to": "arrival city",
          "estimate_time": 0,
          "estimate_price": 0,
          "option": "flight/train/bus/car"
        },
        "Accomodation": {
          "name": "hotel name",
          "description": "hotel description",
          "address": "full address",
          "geocode": { "latitude": 0.0, "longitude": 0.0 },
          "rating": 0,
          "review_count": 0,
          "phone": "contact number",
          "amenities": ["list of amenities"],
          "price": { "amount": 0, "currency": "USD" },
          "guests": 0,
          "image_urls": ["hotel images"],
          "booking_url": "reservation link"
        },
        "days": [
          {
            "title": "Day title",
            "date": "YYYY-MM-DD",
            "description": "day description",
            "day_number": "Day 1",
            "activities": [
              {
                "tag": "category",
                "title": "activity name",
                "description": "activity description",
                "minimum_duration": "time needed",
                "booking_url": "booking link",
                "address": "activity address",
                "NumberOfReview": 0,
                "Ratings": 0.0,
                "geocode": { "latitude": 0.0, "longitude": 0.0 },
                "image_urls": ["activity images"]
              }
            ]
          }
        ]
      }
    ]
  }
}

IMPORTANT RULES:
- NEVER leave any field null or empty - if data is missing from tools, use reasonable estimates or defaults
- Always provide realistic cost estimates and durations
- Include at least 2-3 activities per day
- Ensure all geocode coordinates are valid numbers
- Make responses conversational and helpful
- Extract user requirements from their query for Requirement_options
- Always search for destinations first, then hotels, then activities for each city"#;

/// The trip-planning agent with its full tool set.
pub struct TripPlanner {
    agent: ReactAgent,
    max_rounds: usize,
}

impl TripPlanner {
    /// Wire up the trip tool set and the agent. Tools whose API keys are
    /// absent still register; they report the missing configuration when
    /// called.
    pub fn new(
        config: &Config,
        model: Arc<dyn ModelClient>,
        http: reqwest::Client,
    ) -> Result<Self, ToolError> {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(WebSearch::new(
            http.clone(),
            config.serper_api_key.clone(),
        )))?;
        registry.register(Arc::new(HotelSearch::new(
            http.clone(),
            config.apify_api_token.clone(),
        )))?;
        registry.register(Arc::new(ActivitySearch::new(
            http.clone(),
            config.apify_api_token.clone(),
        )))?;
        registry.register(Arc::new(WebsiteContent::new(
            http.clone(),
            config.serper_api_key.clone(),
        )))?;
        registry.register(Arc::new(ImageSearch::new(
            http.clone(),
            config.serper_api_key.clone(),
        )))?;
        registry.register(Arc::new(WeatherInfo::new(
            http,
            config.weather_api_url.clone(),
        )))?;

        Ok(Self {
            agent: ReactAgent::new(model, Arc::new(registry), TRIP_SYSTEM_PROMPT),
            max_rounds: config.max_rounds,
        })
    }

    /// Process a trip-planning query into the structured trip payload.
    ///
    /// Never fails: model errors and unparsable answers degrade to
    /// templated error/fallback payloads.
    pub async fn process_query(&self, query: &str, session_id: Option<&str>) -> Value {
        let session_id = session_id
            .map(String::from)
            .unwrap_or_else(|| format!("session_{}", Uuid::new_v4()));

        let enhanced_query = format!(
            "Session ID: {session_id}\nUser Query: {query}\n\nPlease create a comprehensive trip plan following the exact JSON format specified in your system prompt."
        );

        match self.agent.run(&enhanced_query, self.max_rounds).await {
            Ok(answer) => extract_json_object(&answer)
                .unwrap_or_else(|| fallback_response(query, &session_id, &answer)),
            Err(e) => {
                tracing::error!(error = %e, "trip planning query failed");
                error_response(query, &session_id, &e.to_string())
            }
        }
    }
}

/// Extract and parse the first balanced `{...}` span in `text`.
///
/// Braces inside JSON string literals do not count toward the balance, so
/// prose or fenced text around the object is tolerated.
pub(crate) fn extract_json_object(text: &str) -> Option<Value> {
    let bytes = text.as_bytes();
    let start = text.find('{')?;

    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, &b) in bytes.iter().enumerate().skip(start) {
        if in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
            continue;
        }
        match b {
            b'"' => in_string = true,
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return serde_json::from_str(&text[start..=i]).ok();
                }
            }
            _ => {}
        }
    }
    None
}

/// Fallback payload when the agent's answer is not valid JSON.
fn fallback_response(query: &str, session_id: &str, agent_response: &str) -> Value {
    let message = if agent_response.is_empty() {
        "I've created a basic trip plan for you. Please provide more specific details for a better itinerary."
    } else {
        agent_response
    };
    let now = Utc::now();

    json!({
        "message": message,
        "Requirement_options": [query],
        "intent": "trip_planning",
        "sessionId": session_id,
        "timestamp": now.to_rfc3339(),
        "itinerary": {
            "overview": {
                "start_location": "Your Location",
                "destination_location": "Destination",
                "summary": "Custom trip plan based on your preferences",
                "duration_days": 3,
                "people_count": 1,
                "start_date": now.format("%Y-%m-%d").to_string(),
                "end_date": (now + Duration::days(3)).format("%Y-%m-%d").to_string(),
                "image_urls": [],
                "Estimated_overall_cost": 1500
            },
            "Cities": []
        }
    })
}

/// Error payload for a fatal model failure.
fn error_response(query: &str, session_id: &str, error: &str) -> Value {
    json!({
        "message": format!(
            "I apologize, but I encountered an error while planning your trip: {}. Please try rephrasing your request.",
            error
        ),
        "Requirement_options": [query],
        "intent": "trip_planning",
        "sessionId": session_id,
        "timestamp": Utc::now().to_rfc3339(),
        "itinerary": {
            "overview": {
                "start_location": "",
                "destination_location": "",
                "summary": "Error occurred during planning",
                "duration_days": 0,
                "people_count": 0,
                "start_date": "",
                "end_date": "",
                "image_urls": [],
                "Estimated_overall_cost": 0
            },
            "Cities": []
        }
    })
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;
    use crate::config::Provider;
    use crate::llm::{ChatMessage, ModelError};

    struct CannedModel {
        reply: String,
    }

    #[async_trait]
    impl ModelClient for CannedModel {
        async fn call(&self, _history: &[ChatMessage]) -> Result<String, ModelError> {
            Ok(self.reply.clone())
        }
    }

    fn planner_with_reply(reply: &str) -> TripPlanner {
        let config = Config::new(Provider::Gemini, "gemini-2.0-flash".to_string());
        TripPlanner::new(
            &config,
            Arc::new(CannedModel {
                reply: reply.to_string(),
            }),
            reqwest::Client::new(),
        )
        .unwrap()
    }

    #[test]
    fn extracts_plain_object() {
        let value = extract_json_object(r#"{"a": 1}"#).unwrap();
        assert_eq!(value["a"], 1);
    }

    #[test]
    fn extracts_object_from_surrounding_prose() {
        let text = "Here is your plan:\n```json\n{\"message\": \"hi\", \"n\": {\"x\": 2}}\n```\nEnjoy!";
        let value = extract_json_object(text).unwrap();
        assert_eq!(value["message"], "hi");
        assert_eq!(value["n"]["x"], 2);
    }

    #[test]
    fn braces_inside_strings_do_not_unbalance() {
        let text = r#"{"message": "use {curly} braces", "ok": true}"#;
        let value = extract_json_object(text).unwrap();
        assert_eq!(value["ok"], true);
    }

    #[test]
    fn no_object_yields_none() {
        assert!(extract_json_object("no json here").is_none());
        assert!(extract_json_object("{unclosed").is_none());
    }

    #[tokio::test]
    async fn structured_reply_is_parsed() {
        let planner = planner_with_reply(
            r#"<response>{"message": "done", "intent": "trip_planning"}</response>"#,
        );
        let value = planner.process_query("Plan a trip to Rome", Some("s1")).await;
        assert_eq!(value["message"], "done");
    }

    #[tokio::test]
    async fn prose_reply_falls_back_to_template() {
        let planner = planner_with_reply("<response>Sorry, I could only find trains.</response>");
        let value = planner.process_query("Plan a trip", Some("s2")).await;
        assert_eq!(value["message"], "Sorry, I could only find trains.");
        assert_eq!(value["intent"], "trip_planning");
        assert_eq!(value["sessionId"], "s2");
        assert_eq!(value["itinerary"]["overview"]["duration_days"], 3);
    }

    #[tokio::test]
    async fn session_id_is_generated_when_absent() {
        let planner = planner_with_reply("<response>plain text</response>");
        let value = planner.process_query("anything", None).await;
        let session = value["sessionId"].as_str().unwrap();
        assert!(session.starts_with("session_"));
    }
}
