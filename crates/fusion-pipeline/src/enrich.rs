//! AI enrichment adapters.
//!
//! Analysis and translation are capabilities injected at construction. The
//! simulated implementations are deterministic and offline; the LLM
//! implementations speak an OpenAI-compatible chat endpoint. Enrichment
//! failure leaves the event exactly as it arrived.

use async_trait::async_trait;
use event_core::{AiInsights, Sentiment, SentimentLabel, Translation, UnifiedEvent};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;
use tracing::warn;

const GROQ_CHAT_URL: &str = "https://api.groq.com/openai/v1/chat/completions";
const GROQ_MODEL: &str = "llama-3.1-8b-instant";

/// Default translation target for the downstream report view.
const TARGET_LANG: &str = "ar";

#[derive(Debug, Error)]
pub enum EnrichError {
    #[error("model request failed: {0}")]
    Request(String),
    #[error("model response unusable: {0}")]
    Response(String),
}

#[derive(Debug, Clone)]
pub struct TextAnalysis {
    pub summary: String,
    pub sentiment: Sentiment,
}

/// Produces a strategic summary and sentiment for event text.
#[async_trait]
pub trait TextAnalyst: Send + Sync {
    async fn analyze(&self, text: &str, context: &str) -> Result<TextAnalysis, EnrichError>;
}

/// Translates event text into a target language.
#[async_trait]
pub trait Translator: Send + Sync {
    async fn translate(&self, text: &str, target_lang: &str) -> Result<String, EnrichError>;
}

/// Keyword-heuristic analyst. Deterministic so tests and offline runs
/// behave identically.
pub struct SimulatedAnalyst;

#[async_trait]
impl TextAnalyst for SimulatedAnalyst {
    async fn analyze(&self, text: &str, _context: &str) -> Result<TextAnalysis, EnrichError> {
        let lower = text.to_lowercase();
        let hostile = lower.contains("conflict") || lower.contains("attack");
        Ok(TextAnalysis {
            // Keep the original text as the summary so translation keyword
            // matching still works downstream.
            summary: text.to_string(),
            sentiment: Sentiment {
                score: if hostile { -0.8 } else { -0.4 },
                label: SentimentLabel::Negative,
            },
        })
    }
}

/// Identity translator used when no live model is configured.
pub struct SimulatedTranslator;

#[async_trait]
impl Translator for SimulatedTranslator {
    async fn translate(&self, text: &str, _target_lang: &str) -> Result<String, EnrichError> {
        Ok(text.to_string())
    }
}

/// Shared OpenAI-compatible chat client.
#[derive(Clone)]
pub struct LlmClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: String,
}

impl LlmClient {
    pub fn new(client: reqwest::Client, api_key: String) -> Self {
        Self {
            client,
            base_url: GROQ_CHAT_URL.to_string(),
            api_key,
            model: GROQ_MODEL.to_string(),
        }
    }

    async fn complete(&self, prompt: &str, temperature: f64) -> Result<String, EnrichError> {
        let body = json!({
            "messages": [{"role": "user", "content": prompt}],
            "model": self.model,
            "temperature": temperature,
        });
        let response = self
            .client
            .post(&self.base_url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| EnrichError::Request(e.to_string()))?;

        if !response.status().is_success() {
            return Err(EnrichError::Request(format!(
                "status {}",
                response.status()
            )));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| EnrichError::Response(e.to_string()))?;
        parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| EnrichError::Response("empty choices".to_string()))
    }
}

/// LLM-backed analyst.
pub struct LlmAnalyst {
    llm: LlmClient,
}

impl LlmAnalyst {
    pub fn new(llm: LlmClient) -> Self {
        Self { llm }
    }
}

#[derive(Debug, Deserialize)]
struct AnalystVerdict {
    summary: String,
    score: f64,
    label: String,
}

#[async_trait]
impl TextAnalyst for LlmAnalyst {
    async fn analyze(&self, text: &str, context: &str) -> Result<TextAnalysis, EnrichError> {
        let prompt = format!(
            "Act as an intelligence analyst. Summarize the following event in one \
             concise strategic sentence (max 20 words). Then provide a sentiment \
             score (-1.0 to 1.0) and label (positive/negative/neutral).\n\n\
             Event: {text}\nContext: {context}\n\n\
             Output format JSON: {{\"summary\": \"...\", \"score\": -0.5, \"label\": \"negative\"}}\n\
             Only return JSON."
        );
        let raw = self.llm.complete(&prompt, 0.5).await?;
        let cleaned = raw.replace("```json", "").replace("```", "");
        let verdict: AnalystVerdict = serde_json::from_str(cleaned.trim())
            .map_err(|e| EnrichError::Response(e.to_string()))?;
        let label = match verdict.label.as_str() {
            "positive" => SentimentLabel::Positive,
            "neutral" => SentimentLabel::Neutral,
            _ => SentimentLabel::Negative,
        };
        Ok(TextAnalysis {
            summary: verdict.summary,
            sentiment: Sentiment {
                score: verdict.score.clamp(-1.0, 1.0),
                label,
            },
        })
    }
}

/// LLM-backed translator.
pub struct LlmTranslator {
    llm: LlmClient,
}

impl LlmTranslator {
    pub fn new(llm: LlmClient) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl Translator for LlmTranslator {
    async fn translate(&self, text: &str, target_lang: &str) -> Result<String, EnrichError> {
        if text.is_empty() {
            return Ok(String::new());
        }
        let language = match target_lang {
            "ar" => "Arabic",
            "de" => "German",
            _ => "English",
        };
        let prompt = format!(
            "Translate the following text to {language}. Keep the tone professional \
             and suitable for an operational report. Return only the translated \
             text.\n\nText: \"{text}\""
        );
        let translated = self.llm.complete(&prompt, 0.2).await?;
        Ok(translated.replace('"', "").trim().to_string())
    }
}

/// Event enrichment front end over the injected capabilities.
pub struct Enricher {
    analyst: Arc<dyn TextAnalyst>,
    translator: Arc<dyn Translator>,
}

impl Enricher {
    pub fn new(analyst: Arc<dyn TextAnalyst>, translator: Arc<dyn Translator>) -> Self {
        Self {
            analyst,
            translator,
        }
    }

    /// Offline deterministic enricher.
    pub fn simulated() -> Self {
        Self::new(Arc::new(SimulatedAnalyst), Arc::new(SimulatedTranslator))
    }

    /// Live LLM enricher when `GEOWATCH_USE_LIVE_AI=1` and a `GROQ_API_KEY`
    /// are present, simulated otherwise.
    pub fn from_env(client: reqwest::Client) -> Self {
        let live = std::env::var("GEOWATCH_USE_LIVE_AI")
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false);
        let key = std::env::var("GROQ_API_KEY").ok().filter(|k| !k.is_empty());
        match (live, key) {
            (true, Some(key)) => {
                let llm = LlmClient::new(client, key);
                Self::new(
                    Arc::new(LlmAnalyst::new(llm.clone())),
                    Arc::new(LlmTranslator::new(llm)),
                )
            }
            _ => Self::simulated(),
        }
    }

    /// Attach insights and a translation. Any capability failure leaves the
    /// corresponding field unset and the base event untouched.
    pub async fn enrich(&self, mut event: UnifiedEvent) -> UnifiedEvent {
        let mut insights = AiInsights::default();

        match self
            .analyst
            .analyze(&event.summary, event.category.as_str())
            .await
        {
            Ok(analysis) => {
                insights.summary = Some(analysis.summary);
                insights.sentiment = Some(analysis.sentiment);
            }
            Err(e) => {
                warn!(event = %event.id, "text analysis failed: {e}");
            }
        }

        if event.tags.iter().any(|t| t == "ais") {
            insights.detected_objects =
                Some(vec!["Simulated Vessel (No Image Source)".to_string()]);
        }

        let summary_text = insights
            .summary
            .clone()
            .unwrap_or_else(|| event.summary.clone());
        let title = self.translator.translate(&event.title, TARGET_LANG).await;
        let summary = self.translator.translate(&summary_text, TARGET_LANG).await;
        match (title, summary) {
            (Ok(title), Ok(summary)) => {
                event.translated = Some(Translation {
                    title,
                    summary,
                    lang: TARGET_LANG.to_string(),
                });
            }
            (Err(e), _) | (_, Err(e)) => {
                warn!(event = %event.id, "translation failed: {e}");
            }
        }

        event.ai_insights = Some(insights);
        event
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use event_core::{EventCategory, Severity};
    use serde_json::Value;

    fn sample_event(summary: &str) -> UnifiedEvent {
        UnifiedEvent {
            id: "e1".to_string(),
            source: "Test".to_string(),
            category: EventCategory::Conflicts,
            severity: Severity::High,
            confidence: 0.9,
            title: "Armed clash reported".to_string(),
            summary: summary.to_string(),
            time: Utc::now(),
            lat: None,
            lon: None,
            country: None,
            tags: vec![],
            url: None,
            raw_payload: Value::Null,
            ai_insights: None,
            translated: None,
            analysis: None,
        }
    }

    #[tokio::test]
    async fn test_simulated_analyst_is_deterministic() {
        let analyst = SimulatedAnalyst;
        let hostile = analyst.analyze("Armed attack on convoy", "conflicts").await.unwrap();
        assert_eq!(hostile.sentiment.score, -0.8);
        assert_eq!(hostile.sentiment.label, SentimentLabel::Negative);
        assert_eq!(hostile.summary, "Armed attack on convoy");

        let mild = analyst.analyze("Heavy rain expected", "natural").await.unwrap();
        assert_eq!(mild.sentiment.score, -0.4);
    }

    #[tokio::test]
    async fn test_enrich_attaches_insights_and_translation() {
        let enricher = Enricher::simulated();
        let event = enricher.enrich(sample_event("Ongoing conflict near the border")).await;

        let insights = event.ai_insights.unwrap();
        assert_eq!(insights.sentiment.unwrap().score, -0.8);
        assert!(insights.detected_objects.is_none());

        let translated = event.translated.unwrap();
        assert_eq!(translated.lang, "ar");
        assert_eq!(translated.title, "Armed clash reported");
    }

    #[tokio::test]
    async fn test_ais_tagged_events_get_detected_objects() {
        let enricher = Enricher::simulated();
        let mut event = sample_event("Vessel loitering");
        event.tags.push("ais".to_string());
        let event = enricher.enrich(event).await;
        let objects = event.ai_insights.unwrap().detected_objects.unwrap();
        assert_eq!(objects, vec!["Simulated Vessel (No Image Source)"]);
    }

    #[tokio::test]
    async fn test_failing_analyst_leaves_event_usable() {
        struct FailingAnalyst;
        #[async_trait]
        impl TextAnalyst for FailingAnalyst {
            async fn analyze(&self, _: &str, _: &str) -> Result<TextAnalysis, EnrichError> {
                Err(EnrichError::Request("model down".to_string()))
            }
        }

        let enricher = Enricher::new(Arc::new(FailingAnalyst), Arc::new(SimulatedTranslator));
        let event = enricher.enrich(sample_event("anything")).await;
        let insights = event.ai_insights.unwrap();
        assert!(insights.summary.is_none());
        assert!(insights.sentiment.is_none());
        // Translation still ran off the base summary
        assert_eq!(event.translated.unwrap().summary, "anything");
    }
}
