//! SEO tag generation for a video script

use serde::{Deserialize, Serialize};

use crate::{
    error::{LlmError, Result},
    extract,
    gateway::Gateway,
    provider::ChatError,
    types::Message,
};

/// Longest script prefix sent to the model, in characters
const MAX_SCRIPT_CHARS: usize = 4000;

const MAX_TAGS: usize = 10;

const SYSTEM_PROMPT: &str = r#"You are a YouTube SEO expert. Generate exactly 10 relevant keywords/tags for this video.

IMPORTANT RULES:
1. Generate EXACTLY 10 tags
2. Tags must be GENERAL KEYWORDS (1-3 words maximum), NOT full search phrases
3. Write the tags IN THE SAME LANGUAGE as the video script (English script, English tags; French script, French tags; and so on)
4. Prefer broad, generic terms that cover the topic
5. Include the main subject and popular related terms
6. Avoid tags that are too specific or too long
7. Think about general categories and themes

GOOD TAG EXAMPLES:
- "investing", "ETF", "finance", "stock market", "money"
- "investissement", "bourse", "argent", "épargne", "finances"

BAD TAG EXAMPLES (too specific):
- "how to invest in ETF 2024", "best ETF for beginners to buy"

Reply ONLY with a JSON array of 10 strings, no explanation.
Example: ["tag1", "tag2", "tag3", ...]"#;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TagsRequest {
    #[serde(default)]
    pub video_script: Option<String>,
    #[serde(default)]
    pub video_title: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagsResponse {
    pub tags: Vec<String>,
}

/// Generate up to ten tags for a script
pub async fn generate(gateway: &Gateway, request: TagsRequest) -> Result<TagsResponse> {
    let script = request
        .video_script
        .filter(|s| !s.is_empty())
        .ok_or_else(|| LlmError::InvalidRequest("videoScript is required".to_string()))?;

    let title = request.video_title.filter(|t| !t.is_empty());

    tracing::debug!(title = title.as_deref().unwrap_or("Untitled"), "generating tags");

    let messages = vec![Message::system(SYSTEM_PROMPT), Message::user(user_content(title.as_deref(), &script))];

    let content = gateway.complete(messages, None).await.map_err(|e| match e {
        ChatError::RateLimited => LlmError::RateLimited,
        ChatError::PaymentRequired => LlmError::PaymentRequired,
        ChatError::Upstream { status, .. } => LlmError::Generation(format!("AI Gateway error: {status}")),
        ChatError::EmptyContent => LlmError::Generation("No content in AI response".to_string()),
        ChatError::NotConfigured => LlmError::Config("AI gateway API key is not configured".to_string()),
        ChatError::Connection(_) | ChatError::InvalidResponse(_) => {
            LlmError::Generation("Failed to generate tags".to_string())
        }
    })?;

    let Some(items) = extract::json_array(&content) else {
        tracing::error!(content = %content, "tag reply is not a JSON array");
        return Err(LlmError::Parse("Failed to parse tags from AI response".to_string()));
    };

    let tags = extract::strings(items, MAX_TAGS);

    tracing::debug!(count = tags.len(), "tags generated");

    Ok(TagsResponse { tags })
}

fn user_content(title: Option<&str>, script: &str) -> String {
    let excerpt: String = script.chars().take(MAX_SCRIPT_CHARS).collect();

    format!(
        "VIDEO TITLE: {}\n\nVIDEO SCRIPT:\n{excerpt}",
        title.unwrap_or("Untitled")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{Scripted, gateway, gateway_with_model};

    fn request(script: &str) -> TagsRequest {
        TagsRequest {
            video_script: Some(script.to_owned()),
            video_title: None,
        }
    }

    #[tokio::test]
    async fn twelve_tags_are_cut_to_ten() {
        let reply = serde_json::to_string(&(1..=12).map(|i| format!("tag{i}")).collect::<Vec<_>>()).unwrap();
        let provider = Scripted::arc(Ok(reply));

        let response = generate(&gateway(&provider), request("abc")).await.unwrap();

        assert_eq!(response.tags.len(), 10);
        assert_eq!(response.tags.first().unwrap(), "tag1");
        assert_eq!(response.tags.last().unwrap(), "tag10");
    }

    #[tokio::test]
    async fn fenced_reply_is_parsed() {
        let provider = Scripted::arc(Ok("```json\n[\"a\",\"b\"]\n```".to_owned()));

        let response = generate(&gateway(&provider), request("abc")).await.unwrap();

        assert_eq!(response.tags, ["a", "b"]);
    }

    #[tokio::test]
    async fn non_string_entries_are_dropped() {
        let provider = Scripted::arc(Ok(r#"["a", 1, null, "b"]"#.to_owned()));

        let response = generate(&gateway(&provider), request("abc")).await.unwrap();

        assert_eq!(response.tags, ["a", "b"]);
    }

    #[tokio::test]
    async fn user_message_carries_title_and_truncated_script() {
        let provider = Scripted::arc(Ok("[]".to_owned()));
        let script = "é".repeat(5000);

        generate(
            &gateway_with_model(&provider, "google/gemini-2.5-flash"),
            TagsRequest {
                video_script: Some(script),
                video_title: Some("My video".to_owned()),
            },
        )
        .await
        .unwrap();

        let seen = provider.seen().unwrap();
        assert_eq!(seen.model, "google/gemini-2.5-flash");
        assert!(seen.temperature.is_none());

        let user = &seen.messages[1].content;
        assert!(user.starts_with("VIDEO TITLE: My video\n\nVIDEO SCRIPT:\n"));
        assert_eq!(user.chars().filter(|c| *c == 'é').count(), MAX_SCRIPT_CHARS);
    }

    #[test]
    fn missing_title_is_untitled() {
        assert!(user_content(None, "abc").starts_with("VIDEO TITLE: Untitled\n"));
    }

    #[tokio::test]
    async fn empty_script_is_rejected() {
        let provider = Scripted::arc(Ok("[]".to_owned()));

        let err = generate(&gateway(&provider), request("")).await.unwrap_err();

        assert_eq!(err.to_string(), "videoScript is required");
        assert!(provider.seen().is_none());
    }

    #[tokio::test]
    async fn object_reply_is_a_parse_error() {
        let provider = Scripted::arc(Ok(r#"{"tags": ["a"]}"#.to_owned()));

        let err = generate(&gateway(&provider), request("abc")).await.unwrap_err();

        assert!(matches!(err, LlmError::Parse(ref m) if m == "Failed to parse tags from AI response"));
    }

    #[tokio::test]
    async fn upstream_failures_keep_their_messages() {
        let cases = [
            (ChatError::RateLimited, "Rate limit exceeded, please try again later"),
            (ChatError::PaymentRequired, "Insufficient credits, please add funds"),
            (
                ChatError::Upstream {
                    status: 503,
                    body: String::new(),
                },
                "AI Gateway error: 503",
            ),
            (ChatError::EmptyContent, "No content in AI response"),
        ];

        for (error, message) in cases {
            let provider = Scripted::arc(Err(error));
            let err = generate(&gateway(&provider), request("abc")).await.unwrap_err();
            assert_eq!(err.to_string(), message);
        }
    }
}
