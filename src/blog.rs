//! Travel-blog generator agent: analyzes user-provided images and composes
//! a markdown blog, without web search or scraping.

use std::sync::Arc;

use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::agent::ReactAgent;
use crate::config::Config;
use crate::llm::ModelClient;
use crate::planner::extract_json_object;
use crate::tools::{DescribeImage, ToolError, ToolRegistry};

const BLOG_SYSTEM_PROMPT: &str = r#"You are a focused travel blog writer. Create clear, engaging, well-structured travel blogs in markdown.

SCOPE AND DATA SOURCES
- Use only the user's prompt and provided image URLs.
- Analyze images via get_multimodal_capability to infer scenes, objects, moods, or activities.
- Do not perform web search or scraping. Avoid unverifiable specifics.

BLOG GUIDELINES
- Structure: title, intro, 3-6 concise sections, and a short wrap-up.
- Tone: follow the requested tone; keep language natural and helpful.
- Include the provided images at relevant points with descriptive alt text and short captions.
- Use markdown headings (#, ##, ###), lists (-), quotes (>), and **bold** for emphasis when useful.
- Embed images with: ![Alt text](image_url "Short caption")

OUTPUT FORMAT (MUST be valid JSON):
{
    "blog_content": {
        "title": "Blog title",
        "Detail": "Full markdown blog content with images embedded"
    },
    "metadata": {
        "word_count": 1250,
        "reading_time": "5 minutes",
        "generated_at": "ISO timestamp"
    }
}

RULES
- Do not fabricate specific facts, prices, or schedules.
- Do not use web search or scrape any site.
- Keep it readable and useful without external references."#;

/// Number of rounds the blog agent gets; it only ever analyzes images, so
/// it needs fewer than the trip planner.
const BLOG_MAX_ROUNDS: usize = 15;

/// Parameters of one blog-generation request.
#[derive(Debug, Clone, Deserialize)]
pub struct BlogRequest {
    #[serde(default = "default_tone")]
    pub tone: String,
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default)]
    pub tour_itinerary: String,
    #[serde(default = "default_creativity")]
    pub creativity: String,
    #[serde(default)]
    pub user_prompt: String,
    #[serde(default)]
    pub user_images: Vec<String>,
}

fn default_tone() -> String {
    "casual".to_string()
}

fn default_language() -> String {
    "English".to_string()
}

fn default_creativity() -> String {
    "medium".to_string()
}

impl Default for BlogRequest {
    fn default() -> Self {
        Self {
            tone: default_tone(),
            language: default_language(),
            tour_itinerary: String::new(),
            creativity: default_creativity(),
            user_prompt: String::new(),
            user_images: Vec::new(),
        }
    }
}

impl BlogRequest {
    /// A request must name a topic one way or the other.
    pub fn has_topic(&self) -> bool {
        !self.user_prompt.is_empty() || !self.tour_itinerary.is_empty()
    }
}

/// The blog-generation agent, equipped with the image-analysis tool only.
pub struct BlogGenerator {
    agent: ReactAgent,
}

impl BlogGenerator {
    pub fn new(
        config: &Config,
        model: Arc<dyn ModelClient>,
        http: reqwest::Client,
    ) -> Result<Self, ToolError> {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(DescribeImage::new(
            http,
            config.google_api_key.clone(),
        )))?;

        Ok(Self {
            agent: ReactAgent::new(model, Arc::new(registry), BLOG_SYSTEM_PROMPT),
        })
    }

    /// Generate a blog for the request. Never fails; degraded paths return
    /// a markdown fallback document.
    pub async fn process_query(&self, request: &BlogRequest) -> Value {
        let images = if request.user_images.is_empty() {
            "None".to_string()
        } else {
            request.user_images.join(", ")
        };

        let enhanced_query = format!(
            r#"BLOG GENERATION REQUEST

Tone: {tone}
Language: {language}
Creativity Level: {creativity}
Main Topic/Prompt: {prompt}
Tour Itinerary: {itinerary}
User Images: {images}

INSTRUCTIONS
- Write a well-structured markdown blog in the specified tone and language.
- For EACH image URL provided, call get_multimodal_capability with a short, helpful query and the image_url.
- Use each observation to craft a caption, alt text, and a placement for the image.
- Return ONLY the required JSON with fields: blog_content, metadata."#,
            tone = request.tone,
            language = request.language,
            creativity = request.creativity,
            prompt = request.user_prompt,
            itinerary = request.tour_itinerary,
            images = images,
        );

        match self.agent.run(&enhanced_query, BLOG_MAX_ROUNDS).await {
            Ok(answer) => {
                extract_json_object(&answer).unwrap_or_else(|| fallback_response(request, &answer))
            }
            Err(e) => {
                tracing::error!(error = %e, "blog generation query failed");
                error_response(request, &e.to_string())
            }
        }
    }
}

/// Markdown fallback when the agent's answer is not valid JSON.
fn fallback_response(request: &BlogRequest, agent_response: &str) -> Value {
    let word_count = agent_response.split_whitespace().count();
    json!({
        "blog_content": format!(
            "# Travel Blog\n\n{}\n\n---\n*This blog was generated based on your request.*",
            agent_response
        ),
        "metadata": {
            "title": "Generated Travel Blog",
            "tone": request.tone,
            "language": request.language,
            "creativity_level": request.creativity,
            "word_count": word_count,
            "reading_time": format!("{} minutes", std::cmp::max(1, word_count / 200)),
            "tags": ["travel", "blog", "generated"],
            "destinations": []
        },
        "message": "Blog generated successfully using fallback formatting.",
        "timestamp": Utc::now().to_rfc3339()
    })
}

fn error_response(request: &BlogRequest, error: &str) -> Value {
    json!({
        "blog_content": format!(
            "# Blog Generation Error\n\nWe encountered an issue while generating your travel blog:\n\n**Error**: {}\n\nPlease try again with your request.",
            error
        ),
        "metadata": {
            "title": "Blog Generation Error",
            "tone": request.tone,
            "language": request.language,
            "creativity_level": request.creativity,
            "word_count": 0,
            "reading_time": "1 minute",
            "tags": ["error"],
            "destinations": []
        },
        "message": format!("Error occurred during blog generation: {}", error),
        "timestamp": Utc::now().to_rfc3339()
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

    fn generator_with_reply(reply: &str) -> BlogGenerator {
        let config = Config::new(Provider::Gemini, "gemini-2.0-flash".to_string());
        BlogGenerator::new(
            &config,
            Arc::new(CannedModel {
                reply: reply.to_string(),
            }),
            reqwest::Client::new(),
        )
        .unwrap()
    }

    #[test]
    fn request_requires_a_topic() {
        let empty = BlogRequest::default();
        assert!(!empty.has_topic());

        let with_prompt = BlogRequest {
            user_prompt: "Cherry blossoms in Japan".to_string(),
            ..Default::default()
        };
        assert!(with_prompt.has_topic());
    }

    #[test]
    fn request_deserializes_with_defaults() {
        let request: BlogRequest =
            serde_json::from_value(json!({"user_prompt": "Alps hiking"})).unwrap();
        assert_eq!(request.tone, "casual");
        assert_eq!(request.language, "English");
        assert_eq!(request.creativity, "medium");
        assert!(request.user_images.is_empty());
    }

    #[tokio::test]
    async fn structured_reply_is_parsed() {
        let generator = generator_with_reply(
            r##"<response>{"blog_content": {"title": "Alps", "Detail": "# Alps"}, "metadata": {}}</response>"##,
        );
        let request = BlogRequest {
            user_prompt: "Alps hiking".to_string(),
            ..Default::default()
        };
        let value = generator.process_query(&request).await;
        assert_eq!(value["blog_content"]["title"], "Alps");
    }

    #[tokio::test]
    async fn prose_reply_falls_back_to_markdown() {
        let generator = generator_with_reply("<response>Just some prose about the Alps.</response>");
        let request = BlogRequest {
            user_prompt: "Alps hiking".to_string(),
            ..Default::default()
        };
        let value = generator.process_query(&request).await;
        let content = value["blog_content"].as_str().unwrap();
        assert!(content.starts_with("# Travel Blog"));
        assert!(content.contains("Just some prose about the Alps."));
        assert_eq!(value["metadata"]["tone"], "casual");
    }
}
