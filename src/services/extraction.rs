//! Vision model client: turns a screenshot into structured item metadata.
//!
//! A single OpenAI-compatible `chat/completions` call with the image embedded
//! as a base64 data URL. One attempt, fixed 30 second timeout, no retry. Any
//! failure (transport, non-2xx, unparseable content) degrades into a fixed
//! fallback record so the caller always receives a well-formed object.

use std::time::Duration;

use anyhow::{Context, anyhow};
use base64::{Engine as _, engine::general_purpose::STANDARD};
use serde_json::{Value, json};

use crate::models::extraction::ExtractionResult;

/// Upper bound on one model call.
const EXTRACTION_TIMEOUT: Duration = Duration::from_secs(30);

/// Prompt instructing the model to return the eight extraction fields as a
/// bare JSON object.
const EXTRACTION_PROMPT: &str = r#"
You are an AI assistant for the game 'Steal a Brainrot'.
Your task is to analyze a screenshot of a game item listing or inventory.
Extract the following information and return it in valid JSON format.

Crucial: You must generate a 'title' that strictly follows the marketing format below, AND a 'clean_name' for searching.

**Title Format Rules:**
1. Start with a relevant emoji (e.g., 🌋 for Lava, 🌈 for Rainbow, 🚽 for generic).
2. Follow with: "{Mutation} {Traits Count} Trait {Item Name} (OG/Variant if visible)".
3. Add a fire emoji 🔥 and then the stats if visible (e.g., "4.4B/s").
4. Add "(RARE SECRET)" or similar rarity tags if applicable.
5. ALWAYS Append: "| (💸 CHEAPEST | 📦 FAST DELIVERY)"
6. IF the item is "Free Brainrot" (look for "Free" tag or price 0), APPEND this specific suffix:
   "| Steal A Brainrot | COMES WITH FREE BRAINROT 🆓"

**Clean Name Rules (For Search):**
- MUST BE EXTREMELY SHORT AND PRECISE for market search.
- ONLY include the Mutation (if any) and the base Item Name.
- DO NOT include trait counts (like "26"), "OG", stats, emojis, or marketing fluff.
- Example: "Lava Skibidi Toilet" or "Rainbow Camera Man"

**Examples:**
- Non-Free Item Title: "🌋 Lava 1 Trait Skibidi Toilet (OG) 🔥 4.4B/s (RARE SECRET) | (💸 CHEAPEST | 📦 FAST DELIVERY)"
- Free Item Title: "🌈 Rainbow 2 Trait Camera Man 🔥 1.2B/s | (💸 CHEAPEST | 📦 FAST DELIVERY) | Steal A Brainrot | COMES WITH FREE BRAINROT 🆓"

**Fields to Extract:**
1. title: The formatted marketing string as defined above.
2. clean_name: The clean item name for searching market prices (e.g. "Lava Skibidi Toilet").
3. mutation: The mutation name (e.g., "Rainbow", "Lava"). Null if none.
4. traits_count: The integer number of traits.
5. brainrot_type: "Free" or "Non-free".
6. price_suggestion: A rough integer estimate (e.g. 500). 0 if Free.
7. item_name: The base item name WITHOUT mutations or OG tags, exactly as it might appear in a dictionary (e.g. "Skibidi Toilet", "Cocofanto Elefanto").
8. ms_rate: The M/s or B/s rate as a string exactly as shown on the image (e.g. "4.4B/s", "150M/s"). Null if none.

Return ONLY the JSON object. Do not include markdown code blocks.
"#;

/// Analyze an item screenshot with the vision model.
///
/// # Arguments
///
/// * `http` - Shared outbound HTTP client
/// * `base_url` - OpenAI-compatible provider base URL (no trailing slash)
/// * `model` - Model name for the completion request
/// * `image_bytes` - Raw uploaded image
/// * `api_key` - Provider credential from the config table
///
/// # Failure policy
///
/// Never returns an error. Failures are logged server-side and mapped to
/// [`ExtractionResult::degraded`], which carries the reason in its `error`
/// field.
pub async fn analyze_image(
    http: &reqwest::Client,
    base_url: &str,
    model: &str,
    image_bytes: &[u8],
    api_key: &str,
) -> ExtractionResult {
    match call_model(http, base_url, model, image_bytes, api_key).await {
        Ok(result) => result,
        Err(e) => {
            tracing::error!("Error calling vision model: {e:#}");
            ExtractionResult::degraded(e.to_string())
        }
    }
}

async fn call_model(
    http: &reqwest::Client,
    base_url: &str,
    model: &str,
    image_bytes: &[u8],
    api_key: &str,
) -> anyhow::Result<ExtractionResult> {
    let image_url = format!("data:image/jpeg;base64,{}", STANDARD.encode(image_bytes));

    let payload = json!({
        "model": model,
        "messages": [
            {
                "role": "user",
                "content": [
                    { "type": "text", "text": EXTRACTION_PROMPT },
                    { "type": "image_url", "image_url": { "url": image_url } }
                ]
            }
        ],
        "max_tokens": 1000
    });

    let response = http
        .post(format!("{base_url}/chat/completions"))
        .bearer_auth(api_key)
        .json(&payload)
        .timeout(EXTRACTION_TIMEOUT)
        .send()
        .await
        .context("request to vision model failed")?
        .error_for_status()
        .context("vision model returned an error status")?;

    let body: Value = response
        .json()
        .await
        .context("vision model response was not JSON")?;

    let content = body["choices"][0]["message"]["content"]
        .as_str()
        .ok_or_else(|| anyhow!("vision model response had no message content"))?;

    parse_extraction(content)
}

/// Parse the model's text output into an [`ExtractionResult`], tolerating
/// markdown code fences around the JSON object.
fn parse_extraction(content: &str) -> anyhow::Result<ExtractionResult> {
    let cleaned = strip_code_fences(content);
    serde_json::from_str(&cleaned).context("vision model content was not the expected JSON")
}

/// Remove markdown code-fence markers the model sometimes wraps its JSON in,
/// despite being told not to.
fn strip_code_fences(content: &str) -> String {
    let content = content.trim();
    let stripped = if content.starts_with("```json") {
        content.replace("```json", "").replace("```", "")
    } else if content.starts_with("```") {
        content.replace("```", "")
    } else {
        content.to_string()
    };
    stripped.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_json_passes_through_fence_stripping() {
        assert_eq!(strip_code_fences(r#"{"title": "x"}"#), r#"{"title": "x"}"#);
    }

    #[test]
    fn json_fence_markers_are_removed() {
        let fenced = "```json\n{\"title\": \"x\"}\n```";
        assert_eq!(strip_code_fences(fenced), "{\"title\": \"x\"}");
    }

    #[test]
    fn plain_fence_markers_are_removed() {
        let fenced = "```\n{\"title\": \"x\"}\n```";
        assert_eq!(strip_code_fences(fenced), "{\"title\": \"x\"}");
    }

    #[test]
    fn fenced_model_output_parses() {
        let content = r#"```json
        {
            "title": "🌋 Lava 1 Trait Skibidi Toilet (OG) 🔥 4.4B/s (RARE SECRET) | (💸 CHEAPEST | 📦 FAST DELIVERY)",
            "clean_name": "Lava Skibidi Toilet",
            "mutation": "Lava",
            "traits_count": 1,
            "brainrot_type": "Non-free",
            "price_suggestion": 500,
            "item_name": "Skibidi Toilet",
            "ms_rate": "4.4B/s"
        }
        ```"#;
        let result = parse_extraction(content).unwrap();
        assert_eq!(result.clean_name, "Lava Skibidi Toilet");
        assert_eq!(result.mutation.as_deref(), Some("Lava"));
        assert_eq!(result.traits_count, 1);
        assert_eq!(result.price_suggestion, 500.0);
        assert_eq!(result.error, None);
    }

    #[test]
    fn non_json_content_is_an_error() {
        assert!(parse_extraction("I could not read the image, sorry").is_err());
    }
}
