//! Click-through optimised title generation
//!
//! Two variants share one pipeline: the fixed variant draws on a catalogue of
//! proven title structures, the mimicry variant copies the style of titles the
//! caller supplies. Both send the full script and expect a `{"titles": [...]}`
//! object back.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    error::{LlmError, Result},
    extract,
    gateway::Gateway,
    provider::ChatError,
    types::Message,
};

const MAX_TITLES: usize = 5;

const TEMPERATURE: f64 = 0.7;

const STRUCTURES_PROMPT: &str = r#"You are an expert in optimising YouTube titles to maximise CTR (click-through rate).

Your job is to use the 45 PROVEN TITLE STRUCTURES below to write 5 OPTIMISED titles based on the supplied video script.

# 45 YOUTUBE TITLE STRUCTURES THAT WORK:

## Curiosity and Contrast:
1. Here's what ALWAYS happens before (Dramatic Event)
2. The strangest (Entities) ever created...
3. (Objection). (Objection). Then (Action)... You Won't Believe It!
4. When the "(Fakes)" join the real (Entity)
5. (Action) Done In Front Of The (Original Creator)
6. (Activity) while (Unexpected or Opposite Activity)
7. (Person) Reacts to (Adjacent Person Doing a Contrasting Activity)
8. [Person] Does [Unexpected Thing] ([Activity] Tutorial)
9. (Person) tries (Foreign Thing) for the first time
10. We put an (Expensive Thing) in our (Cheap Thing)
11. What Happens When You (Absurd Action)?

## Authority and Revelation:
12. What (Authority Figures) understood about (Problem) that we forgot
13. The TRUTH about (Activity) that PROS know
14. What (Authority Figures) Understand That Most People Don't

## Lists and Completeness:
15. I Tested Every FREE (Tool)
16. (Entity) Explained in 8 Minutes
17. 5 (Seasonal Entities) that (Authority Figures) Always (Action)
18. 9 Strange Habits you pick up (in the Entity)
19. 7 Beginner (Entity) Mistakes to Avoid
20. 10 Free AI (Tools)
21. 24 HOURS WITH a [New Entity]
22. Our Daily Routine (As the First [Profession])
23. 10 (Desirable Entities)
24. 11 of the Most Faked (Items) In The World

## Negativity and Warning:
25. NEVER Do These 4 Things at (Place)
26. Yes, Your (Possession) Is (Undesired Result)! 8 Mistakes and how to fix them
27. Always (Action) your (Possession) (never [Action] it)
28. The ONLY Sign that (Something Scary is True)
29. The Struggles of (Specific Situation)
30. If You Do (Best Practice), You Need to Watch This
31. Hunting the King of (Negative Entity)
32. The (Principle): If You Don't Change This, (Entity) Will Never Change
33. 5 Warning Signs (Something Needs to Improve)
34. What I Wish I Knew BEFORE (Action)

## Desire and Goal:
35. The Only (Entity) they ever made that (Reaches a big goal)
36. The ONLY (Object) with NO LIMITS
37. How (Simple Action) (Big Result)
38. 6 (Easy Things) that make ANY (Hard Goal) easy!
39. Top 11 No-(Hard Thing) (Desirable Things) for (Audience)
40. The Fastest Way to reach [Big Goal] (From Anywhere)
41. These SMALL CHANGES cut 90% of (Problems)

## News and Follow-up:
42. This 1-Minute (Entity) Makes You (Desired State)
43. I Built an Anonymous (Entity) to "Prove It's Not Luck"
44. I Tried (Trend) for 3 Months. Here's What Happened
45. (New Product) Leaks - 10 Reasons to Upgrade THIS year!

STRICT RULES:
1. Your 5 titles must:
   - Use at least 3 different structures from the 45
   - Be optimised for YouTube CTR
   - Fit the content of the script
   - Stay between 50 and 70 characters
   - Create curiosity or promise value
   - Use powerful, emotional words
   - Be written IN THE SAME LANGUAGE as the script

2. Output format: return ONLY JSON in exactly this format:
{
  "titles": [
    "Optimised title 1...",
    "Title 2 with a variation...",
    "A different title 3...",
    "Unique title 4...",
    "Creative title 5..."
  ]
}"#;

const MIMICRY_PROMPT: &str = r#"You are an expert in optimising YouTube titles to maximise CTR (click-through rate).

The user gives you a video script and a list of example titles they like. Study the examples closely and infer their style: length, tone, punctuation, capitalisation, use of numbers, emotional hooks and recurring patterns.

STRICT RULES:
1. Write 5 new titles for the script that REPRODUCE the style of the examples
2. Never copy an example verbatim; adapt its pattern to the script's content
3. Each title must:
   - Fit the content of the script
   - Be optimised for YouTube CTR
   - Stay close to the typical length of the examples
   - Be written IN THE SAME LANGUAGE as the script

4. Output format: return ONLY JSON in exactly this format:
{
  "titles": [
    "Title 1...",
    "Title 2...",
    "Title 3...",
    "Title 4...",
    "Title 5..."
  ]
}"#;

/// Request for the fixed-structure variant
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TitlesRequest {
    #[serde(default)]
    pub video_script: Option<String>,
}

/// Request for the example-mimicry variant
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExampleTitlesRequest {
    #[serde(default)]
    pub video_script: Option<String>,
    /// Left untyped so a malformed list is a validation error, not a body rejection
    #[serde(default)]
    pub example_titles: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TitlesResponse {
    pub titles: Vec<String>,
}

/// Generate titles from the fixed structure catalogue
pub async fn generate(gateway: &Gateway, request: TitlesRequest) -> Result<TitlesResponse> {
    let script = required_script(request.video_script)?;

    tracing::debug!(structures = 45, "generating titles");

    let user = format!(
        "VIDEO SCRIPT:\n{script}\n\nWrite 5 optimised YouTube titles using the 45 proven title structures above. \
         The titles must fit the content of the script and maximise click-through rate (CTR)."
    );

    complete(gateway, STRUCTURES_PROMPT, user).await
}

/// Generate titles in the style of caller-supplied examples
pub async fn generate_from_examples(gateway: &Gateway, request: ExampleTitlesRequest) -> Result<TitlesResponse> {
    let script = required_script(request.video_script)?;

    let examples = match request.example_titles {
        Some(Value::Array(items)) => extract::strings(items, usize::MAX),
        _ => Vec::new(),
    };

    if examples.is_empty() {
        return Err(LlmError::InvalidRequest(
            "exampleTitles must be a non-empty array".to_string(),
        ));
    }

    tracing::debug!(examples = examples.len(), "generating titles from examples");

    let listed = examples
        .iter()
        .enumerate()
        .map(|(i, title)| format!("{}. {title}", i + 1))
        .collect::<Vec<_>>()
        .join("\n");

    let user = format!(
        "EXAMPLE TITLES:\n{listed}\n\nVIDEO SCRIPT:\n{script}\n\nWrite 5 YouTube titles for this script in the style of the example titles."
    );

    complete(gateway, MIMICRY_PROMPT, user).await
}

fn required_script(script: Option<String>) -> Result<String> {
    script
        .filter(|s| !s.is_empty())
        .ok_or_else(|| LlmError::InvalidRequest("videoScript is required".to_string()))
}

async fn complete(gateway: &Gateway, system: &str, user: String) -> Result<TitlesResponse> {
    let messages = vec![Message::system(system), Message::user(user)];

    let content = gateway.complete(messages, Some(TEMPERATURE)).await.map_err(|e| match e {
        ChatError::RateLimited => LlmError::RateLimited,
        ChatError::PaymentRequired => LlmError::PaymentRequired,
        ChatError::EmptyContent | ChatError::InvalidResponse(_) => {
            LlmError::Generation("Invalid AI response".to_string())
        }
        ChatError::Upstream { .. } | ChatError::Connection(_) => {
            LlmError::Generation("Error while generating titles".to_string())
        }
        ChatError::NotConfigured => LlmError::Config("AI gateway API key is not configured".to_string()),
    })?;

    let Some(mut reply) = extract::json_object(&content) else {
        tracing::error!(content = %content, "title reply has no JSON object");
        return Err(LlmError::Parse("Failed to parse AI response".to_string()));
    };

    let titles = match reply.remove("titles") {
        Some(Value::Array(items)) => extract::strings(items, MAX_TITLES),
        _ => Vec::new(),
    };

    if titles.is_empty() {
        tracing::error!(content = %content, "title reply has no titles");
        return Err(LlmError::Parse("Invalid response format".to_string()));
    }

    tracing::debug!(count = titles.len(), "titles generated");

    Ok(TitlesResponse { titles })
}
