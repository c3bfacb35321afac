use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{config::GeminiConfig, dto::Draft, error::DraftError};

pub const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const API_KEY_HEADER: &str = "x-goog-api-key";

const SYSTEM_INSTRUCTION: &str = "You are a professional email assistant. Write clear, concise, \
friendly, and polished emails that match the instruction. Avoid placeholders and ensure the \
email is ready to send immediately. Produce JSON using the schema: {\"subject\": string, \
\"body\": string}. The body must use paragraph separation with blank lines and can include \
bullet lists when helpful. Keep the tone human and professional.";

/// Produces a subject and body for a short instruction.
#[async_trait]
pub trait Drafter: Send + Sync {
    async fn draft(
        &self,
        config: &GeminiConfig,
        topic: &str,
        context: Option<&str>,
    ) -> Result<Draft, DraftError>;
}

pub fn system_instruction() -> &'static str {
    SYSTEM_INSTRUCTION
}

pub fn user_prompt(topic: &str, context: Option<&str>) -> String {
    format!(
        "Primary instruction:\n{topic}\n\nAdditional context:\n{}\n\n\
         Return only valid JSON matching the schema. Do not include markdown fences or commentary.",
        context.unwrap_or("None provided")
    )
}

/// Removes a leading ```` ```json ```` fence and a trailing ```` ``` ```` fence.
pub fn strip_fences(raw: &str) -> &str {
    let mut text = raw.trim();

    if text
        .get(..7)
        .is_some_and(|head| head.eq_ignore_ascii_case("```json"))
    {
        text = text[7..].trim_start();
    }
    if let Some(rest) = text.strip_suffix("```") {
        text = rest;
    }

    text.trim()
}

/// Parses model output into a draft with a non-empty subject and body.
///
/// Only a JSON object is accepted; arrays and scalars are invalid output.
pub fn parse_draft(raw: &str) -> Result<Draft, DraftError> {
    let invalid = || DraftError::InvalidResponse {
        raw: raw.to_string(),
    };

    let parsed: Value = serde_json::from_str(strip_fences(raw)).map_err(|_| invalid())?;
    let Value::Object(fields) = parsed else {
        return Err(invalid());
    };

    let field = |name: &str| {
        fields
            .get(name)
            .and_then(Value::as_str)
            .filter(|value| !value.is_empty())
            .map(str::to_string)
    };

    match (field("subject"), field("body")) {
        (Some(subject), Some(body)) => Ok(Draft { subject, body }),
        _ => Err(invalid()),
    }
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: [Content<'a>; 1],
}

#[derive(Serialize)]
struct Content<'a> {
    parts: [Part<'a>; 2],
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

impl GenerateResponse {
    fn text(self) -> String {
        self.candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .and_then(|c| c.parts.into_iter().next())
            .and_then(|p| p.text)
            .unwrap_or_default()
    }
}

/// Drafts through the Gemini `generateContent` REST endpoint.
#[derive(Clone)]
pub struct GeminiDrafter {
    client: reqwest::Client,
    base_url: String,
}

impl GeminiDrafter {
    pub fn new(client: reqwest::Client) -> Self {
        Self::with_base_url(client, GEMINI_BASE_URL)
    }

    pub fn with_base_url(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    fn endpoint(&self, model: &str) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            model
        )
    }

    async fn generate(&self, config: &GeminiConfig, prompt: &str) -> Result<String, DraftError> {
        let request = GenerateRequest {
            contents: [Content {
                parts: [
                    Part {
                        text: system_instruction(),
                    },
                    Part { text: prompt },
                ],
            }],
        };

        let url = self.endpoint(&config.model);
        tracing::debug!("Calling Gemini model '{}'", config.model);

        let response = self
            .client
            .post(&url)
            .header(API_KEY_HEADER, &config.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| DraftError::Request(e.without_url()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DraftError::Status { status, body });
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|e| DraftError::Request(e.without_url()))?;
        Ok(parsed.text())
    }
}

#[async_trait]
impl Drafter for GeminiDrafter {
    async fn draft(
        &self,
        config: &GeminiConfig,
        topic: &str,
        context: Option<&str>,
    ) -> Result<Draft, DraftError> {
        tracing::info!("Drafting email with model '{}'", config.model);

        let raw = self.generate(config, &user_prompt(topic, context)).await?;
        tracing::debug!("Raw model output: {}", raw);

        let draft = parse_draft(&raw)?;
        tracing::info!("Draft ready with subject '{}'", draft.subject);

        Ok(draft)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PLAIN: &str = r#"{"subject":"Hi","body":"Hello"}"#;

    #[test]
    fn fences_are_stripped_case_insensitively() {
        let inputs = [
            PLAIN.to_string(),
            format!("```json\n{PLAIN}\n```"),
            format!("```JSON {PLAIN}```"),
            format!("  ```Json\n\n{PLAIN}\n```\n  "),
        ];
        for input in inputs {
            assert_eq!(strip_fences(&input), PLAIN, "input: {input:?}");
        }
    }

    #[test]
    fn stripping_is_idempotent() {
        let once = strip_fences("```json\n{\"a\":1}\n```");
        assert_eq!(strip_fences(once), once);
    }

    #[test]
    fn complete_response_yields_draft() {
        let draft = parse_draft(PLAIN).unwrap();
        assert_eq!(
            draft,
            Draft {
                subject: "Hi".into(),
                body: "Hello".into()
            }
        );
    }

    #[test]
    fn missing_body_is_an_error_carrying_raw_output() {
        let raw = r#"{"subject":"Hi"}"#;
        let err = parse_draft(raw).unwrap_err();
        assert!(matches!(err, DraftError::InvalidResponse { .. }));
        assert!(err.to_string().contains(raw));
    }

    #[test]
    fn empty_fields_and_non_json_are_errors() {
        assert!(parse_draft(r#"{"subject":"","body":"x"}"#).is_err());
        assert!(parse_draft("Sure! Here is your email.").is_err());
        assert!(parse_draft(r#"{"subject":1,"body":"x"}"#).is_err());
    }

    #[test]
    fn array_output_is_not_a_draft() {
        let err = parse_draft(r#"["Hi","Hello"]"#).unwrap_err();
        assert!(matches!(err, DraftError::InvalidResponse { .. }));
        assert!(parse_draft("```json\n[\"Hi\",\"Hello\"]\n```").is_err());
        assert!(parse_draft(r#""Hi""#).is_err());
    }

    #[tokio::test]
    async fn request_failure_does_not_expose_api_key() {
        let drafter = GeminiDrafter::with_base_url(reqwest::Client::new(), "http://127.0.0.1:9");
        let config = GeminiConfig {
            api_key: "SUPER-SECRET-KEY".into(),
            model: "gemini-1.5-flash".into(),
        };

        let err = drafter
            .draft(&config, "thank the client", None)
            .await
            .unwrap_err();

        assert!(matches!(err, DraftError::Request(_)));
        let message = err.to_string();
        assert!(!message.contains("SUPER-SECRET-KEY"), "{message}");
        assert!(!message.contains("generateContent"), "{message}");
    }

    #[test]
    fn prompt_defaults_context() {
        let prompt = user_prompt("thank the client", None);
        assert!(prompt.contains("Primary instruction:\nthank the client"));
        assert!(prompt.contains("Additional context:\nNone provided"));
        assert!(prompt.contains("Do not include markdown fences"));

        let prompt = user_prompt("thank the client", Some("Project shipped early"));
        assert!(prompt.contains("Additional context:\nProject shipped early"));
    }

    #[test]
    fn response_text_comes_from_first_part() {
        let response: GenerateResponse = serde_json::from_str(
            r#"{"candidates":[{"content":{"parts":[{"text":"first"},{"text":"second"}]}}]}"#,
        )
        .unwrap();
        assert_eq!(response.text(), "first");

        let empty: GenerateResponse = serde_json::from_str("{}").unwrap();
        assert_eq!(empty.text(), "");
    }

    #[test]
    fn request_sends_two_text_segments() {
        let request = GenerateRequest {
            contents: [Content {
                parts: [Part { text: "sys" }, Part { text: "user" }],
            }],
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["contents"][0]["parts"][0]["text"], "sys");
        assert_eq!(value["contents"][0]["parts"][1]["text"], "user");
    }

    #[test]
    fn endpoint_includes_model() {
        let drafter = GeminiDrafter::with_base_url(reqwest::Client::new(), "http://localhost:9/");
        assert_eq!(
            drafter.endpoint("gemini-1.5-flash"),
            "http://localhost:9/v1beta/models/gemini-1.5-flash:generateContent"
        );
    }
}
