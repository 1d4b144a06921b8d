//! Content generation — orchestrates the two LLM-backed pipelines.
//!
//! Flow: validate → quota check → build prompt → fallback chain →
//!       filter/normalize → charge quota → return response.
//!
//! The only write in either pipeline is the quota charge, which happens
//! strictly after a usable generation and is never refunded. Everything else
//! is stateless; saving the result as a draft is a separate client call.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::AppError;
use crate::generation::fallback::{generate_with_fallback, MODEL_CHAIN};
use crate::generation::parse::{parse_json_object, parse_text};
use crate::generation::platform::Platform;
use crate::generation::prompts::{REPURPOSE_PROMPT_TEMPLATE, VIBE_CHANGE_PROMPT_TEMPLATE};
use crate::generation::vibe::Vibe;
use crate::llm_client::ModelGateway;
use crate::usage::store::UserStore;
use crate::usage::{check_quota, increment_quota, DAILY_LIMIT};

/// Output budget for repurposing — several posts come back in one response.
const REPURPOSE_MAX_TOKENS: u32 = 1500;
/// Output budget for a vibe change — a single rewritten text.
const VIBE_CHANGE_MAX_TOKENS: u32 = 1000;

// ────────────────────────────────────────────────────────────────────────────
// Data models
// ────────────────────────────────────────────────────────────────────────────

/// Request body for content repurposing.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepurposeRequest {
    pub original_content: String,
    pub platforms: Vec<Platform>,
    pub vibe: Vibe,
    /// Absent for anonymous visitors, who are neither checked nor charged.
    #[serde(default)]
    pub user_id: Option<String>,
}

/// Response from the repurposing pipeline.
///
/// `repurposed_content` holds only requested platforms the model actually
/// produced text for; a missing key means that platform came back empty.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RepurposeResponse {
    pub repurposed_content: BTreeMap<Platform, String>,
    pub remaining: i32,
}

/// Request body for a vibe change.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VibeChangeRequest {
    pub text: String,
    pub vibe: Vibe,
    #[serde(default)]
    pub user_id: Option<String>,
}

/// Response from the vibe-change pipeline. The text is the winning model's
/// output verbatim.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VibeChangeResponse {
    pub transformed_text: String,
    pub remaining: i32,
}

// ────────────────────────────────────────────────────────────────────────────
// Pipelines
// ────────────────────────────────────────────────────────────────────────────

/// Runs the repurposing pipeline: one source text in, one post per requested
/// platform out.
///
/// Steps:
/// 1. Validate content and platform list
/// 2. Quota check (identified users only) — exhausted users are rejected
///    before any model is called
/// 3. Build prompt, walk the fallback chain until a backend yields a JSON
///    object
/// 4. Filter the object down to the requested platforms
/// 5. Charge one generation and report the remaining allowance
pub async fn repurpose(
    users: &dyn UserStore,
    gateway: &dyn ModelGateway,
    request: RepurposeRequest,
) -> Result<RepurposeResponse, AppError> {
    if request.original_content.trim().is_empty() {
        return Err(AppError::Validation(
            "originalContent cannot be empty".to_string(),
        ));
    }
    if request.platforms.is_empty() {
        return Err(AppError::Validation("platforms cannot be empty".to_string()));
    }

    ensure_quota(users, request.user_id.as_deref()).await?;

    info!(
        "Repurposing for {} platform(s), vibe={}",
        request.platforms.len(),
        request.vibe.as_str()
    );

    let prompt = build_repurpose_prompt(&request.original_content, &request.platforms, request.vibe);

    let generated = generate_with_fallback(
        gateway,
        MODEL_CHAIN,
        &prompt,
        REPURPOSE_MAX_TOKENS,
        parse_json_object::<HashMap<String, String>>,
    )
    .await
    .map_err(|e| AppError::Generation(e.last_error))?;

    // Keep only the requested platforms. Anything extra the model volunteered
    // is dropped, as are requested platforms it skipped or left blank.
    let repurposed_content: BTreeMap<Platform, String> = request
        .platforms
        .iter()
        .filter_map(|platform| {
            generated
                .get(platform.as_str())
                .filter(|text| !text.is_empty())
                .map(|text| (*platform, text.clone()))
        })
        .collect();

    let remaining = charge(users, request.user_id.as_deref()).await?;

    info!(
        "Repurposed {}/{} requested platform(s), remaining={}",
        repurposed_content.len(),
        request.platforms.len(),
        remaining
    );

    Ok(RepurposeResponse {
        repurposed_content,
        remaining,
    })
}

/// Runs the vibe-change pipeline: rewrites one text in the requested tone,
/// leaving the message intact.
pub async fn change_vibe(
    users: &dyn UserStore,
    gateway: &dyn ModelGateway,
    request: VibeChangeRequest,
) -> Result<VibeChangeResponse, AppError> {
    if request.text.trim().is_empty() {
        return Err(AppError::Validation("text cannot be empty".to_string()));
    }

    ensure_quota(users, request.user_id.as_deref()).await?;

    info!("Vibe change to {}", request.vibe.as_str());

    let prompt = build_vibe_change_prompt(&request.text, request.vibe);

    let transformed_text = generate_with_fallback(
        gateway,
        MODEL_CHAIN,
        &prompt,
        VIBE_CHANGE_MAX_TOKENS,
        parse_text,
    )
    .await
    .map_err(|e| AppError::Generation(e.last_error))?;

    let remaining = charge(users, request.user_id.as_deref()).await?;

    Ok(VibeChangeResponse {
        transformed_text,
        remaining,
    })
}

// ────────────────────────────────────────────────────────────────────────────
// Quota steps
// ────────────────────────────────────────────────────────────────────────────

/// Rejects the request up front when an identified user has nothing left
/// today. Anonymous requests pass through unchecked.
async fn ensure_quota(users: &dyn UserStore, user_id: Option<&str>) -> Result<(), AppError> {
    if let Some(user_id) = user_id {
        let status = check_quota(users, user_id).await?;
        if !status.can_generate {
            return Err(AppError::QuotaExceeded);
        }
    }
    Ok(())
}

/// Charges one generation for an identified user. Anonymous requests are not
/// charged and report the full daily allowance.
async fn charge(users: &dyn UserStore, user_id: Option<&str>) -> Result<i32, AppError> {
    match user_id {
        Some(user_id) => increment_quota(users, user_id).await,
        None => Ok(DAILY_LIMIT),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Prompt builders
// ────────────────────────────────────────────────────────────────────────────

/// Builds the repurposing prompt. The format example always lists all five
/// platforms with their ceilings; the instructions tell the model to fill in
/// only the requested ones.
fn build_repurpose_prompt(original_content: &str, platforms: &[Platform], vibe: Vibe) -> String {
    let platform_list = platforms
        .iter()
        .map(|p| p.as_str())
        .collect::<Vec<_>>()
        .join(", ");

    REPURPOSE_PROMPT_TEMPLATE
        .replace("{platform_list}", &platform_list)
        .replace("{format_example}", &repurpose_format_example())
        .replace("{vibe}", vibe.as_str())
        .replace("{original_content}", original_content)
}

/// The JSON object shape quoted to the model, one line per platform.
fn repurpose_format_example() -> String {
    let lines: Vec<String> = Platform::ALL
        .iter()
        .map(|p| {
            format!(
                r#"  "{}": "your {} {} here (max {} chars)""#,
                p.as_str(),
                p.as_str(),
                p.content_kind(),
                p.char_limit()
            )
        })
        .collect();

    format!("{{\n{}\n}}", lines.join(",\n"))
}

fn build_vibe_change_prompt(text: &str, vibe: Vibe) -> String {
    VIBE_CHANGE_PROMPT_TEMPLATE
        .replace("{vibe}", vibe.as_str())
        .replace("{vibe_instruction}", vibe.instruction())
        .replace("{text}", text)
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::llm_client::testing::ScriptedGateway;
    use crate::usage::store::testing::MemoryUserStore;

    /// A full five-platform response plus one platform nobody asked for.
    const FULL_JSON: &str = r#"{
        "x": "Short post",
        "linkedin": "Longer post",
        "instagram": "A caption",
        "tiktok": "A description",
        "newsletter": "A section",
        "threads": "Unrequested extra"
    }"#;

    fn repurpose_request(user_id: Option<&str>) -> RepurposeRequest {
        RepurposeRequest {
            original_content: "We just shipped our new analytics dashboard.".to_string(),
            platforms: vec![Platform::X, Platform::Linkedin],
            vibe: Vibe::Professional,
            user_id: user_id.map(str::to_string),
        }
    }

    fn vibe_request(user_id: Option<&str>) -> VibeChangeRequest {
        VibeChangeRequest {
            text: "Our quarterly numbers are in.".to_string(),
            vibe: Vibe::Funny,
            user_id: user_id.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn test_repurpose_rejects_blank_content_before_any_backend_call() {
        let store = MemoryUserStore::default();
        let gateway = ScriptedGateway::new(vec![Ok(FULL_JSON)]);
        let mut request = repurpose_request(Some("user-1"));
        request.original_content = "   ".to_string();

        let err = repurpose(&store, &gateway, request).await.unwrap_err();

        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(gateway.call_count(), 0);
        assert!(store.record("user-1").is_none(), "invalid input must not be charged");
    }

    #[tokio::test]
    async fn test_repurpose_rejects_empty_platform_list() {
        let store = MemoryUserStore::default();
        let gateway = ScriptedGateway::new(vec![Ok(FULL_JSON)]);
        let mut request = repurpose_request(Some("user-1"));
        request.platforms = vec![];

        let err = repurpose(&store, &gateway, request).await.unwrap_err();

        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(gateway.call_count(), 0);
    }

    #[tokio::test]
    async fn test_repurpose_filters_to_requested_platforms() {
        let store = MemoryUserStore::default();
        let gateway = ScriptedGateway::new(vec![Ok(FULL_JSON)]);

        let response = repurpose(&store, &gateway, repurpose_request(None))
            .await
            .unwrap();

        assert_eq!(response.repurposed_content.len(), 2);
        assert_eq!(
            response.repurposed_content.get(&Platform::X).map(String::as_str),
            Some("Short post")
        );
        assert!(response.repurposed_content.get(&Platform::Instagram).is_none());
    }

    #[tokio::test]
    async fn test_repurpose_drops_blank_platform_entries() {
        let store = MemoryUserStore::default();
        let gateway = ScriptedGateway::new(vec![Ok(r#"{"x": "", "linkedin": "Longer post"}"#)]);

        let response = repurpose(&store, &gateway, repurpose_request(None))
            .await
            .unwrap();

        assert!(response.repurposed_content.get(&Platform::X).is_none());
        assert_eq!(response.repurposed_content.len(), 1);
    }

    #[tokio::test]
    async fn test_repurpose_anonymous_reports_full_allowance_without_writes() {
        let store = MemoryUserStore::default();
        let gateway = ScriptedGateway::new(vec![Ok(FULL_JSON)]);

        let response = repurpose(&store, &gateway, repurpose_request(None))
            .await
            .unwrap();

        assert_eq!(response.remaining, DAILY_LIMIT);
        assert!(store.record("user-1").is_none());
    }

    #[tokio::test]
    async fn test_repurpose_charges_only_after_success() {
        let store = MemoryUserStore::default();
        let gateway = ScriptedGateway::new(vec![Ok(FULL_JSON)]);

        let response = repurpose(&store, &gateway, repurpose_request(Some("user-1")))
            .await
            .unwrap();

        assert_eq!(response.remaining, DAILY_LIMIT - 1);
        let record = store.record("user-1").unwrap();
        assert_eq!(record.generations_used_today, 1);
        assert_eq!(record.last_generation_date, Some(Utc::now().date_naive()));
    }

    #[tokio::test]
    async fn test_repurpose_total_failure_is_not_charged() {
        let store = MemoryUserStore::default();
        // Empty script: every model in the chain fails
        let gateway = ScriptedGateway::new(vec![]);

        let err = repurpose(&store, &gateway, repurpose_request(Some("user-1")))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Generation(_)));
        assert_eq!(gateway.call_count(), MODEL_CHAIN.len());
        assert!(store.record("user-1").is_none(), "failed generations must not be charged");
    }

    #[tokio::test]
    async fn test_last_allowance_works_then_quota_blocks() {
        let today = Utc::now().date_naive();
        let store = MemoryUserStore::with_record("user-1", DAILY_LIMIT - 1, today);
        let gateway = ScriptedGateway::new(vec![Ok(FULL_JSON), Ok(FULL_JSON)]);

        let response = repurpose(&store, &gateway, repurpose_request(Some("user-1")))
            .await
            .unwrap();
        assert_eq!(response.remaining, 0);
        assert_eq!(gateway.call_count(), 1);

        let err = repurpose(&store, &gateway, repurpose_request(Some("user-1")))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::QuotaExceeded));
        assert_eq!(
            gateway.call_count(),
            1,
            "an exhausted user must never reach a backend"
        );
    }

    #[tokio::test]
    async fn test_vibe_change_takes_first_usable_backend() {
        let store = MemoryUserStore::default();
        let gateway = ScriptedGateway::new(vec![Err(504), Ok("Great joke here")]);

        let response = change_vibe(&store, &gateway, vibe_request(Some("user-1")))
            .await
            .unwrap();

        assert_eq!(response.transformed_text, "Great joke here");
        assert_eq!(response.remaining, DAILY_LIMIT - 1);
        assert_eq!(gateway.call_count(), 2);
    }

    #[tokio::test]
    async fn test_vibe_change_rejects_blank_text() {
        let store = MemoryUserStore::default();
        let gateway = ScriptedGateway::new(vec![Ok("anything")]);
        let mut request = vibe_request(None);
        request.text = "\n\t ".to_string();

        let err = change_vibe(&store, &gateway, request).await.unwrap_err();

        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(gateway.call_count(), 0);
    }

    #[test]
    fn test_requests_deserialize_from_wire_names() {
        let request: RepurposeRequest = serde_json::from_value(serde_json::json!({
            "originalContent": "hello",
            "platforms": ["x", "newsletter"],
            "vibe": "Casual"
        }))
        .unwrap();

        assert_eq!(request.platforms, vec![Platform::X, Platform::Newsletter]);
        assert!(request.user_id.is_none());

        let request: VibeChangeRequest = serde_json::from_value(serde_json::json!({
            "text": "hello",
            "vibe": "Educational",
            "userId": "user-1"
        }))
        .unwrap();

        assert_eq!(request.vibe, Vibe::Educational);
        assert_eq!(request.user_id.as_deref(), Some("user-1"));
    }

    #[test]
    fn test_responses_serialize_to_wire_names() {
        let response = RepurposeResponse {
            repurposed_content: BTreeMap::from([(Platform::X, "Short post".to_string())]),
            remaining: 4,
        };

        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["repurposedContent"]["x"], "Short post");
        assert_eq!(value["remaining"], 4);

        let response = VibeChangeResponse {
            transformed_text: "Rewritten".to_string(),
            remaining: 5,
        };

        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["transformedText"], "Rewritten");
    }

    #[test]
    fn test_repurpose_prompt_embeds_request_details() {
        let prompt = build_repurpose_prompt(
            "Launch day!",
            &[Platform::X, Platform::Tiktok],
            Vibe::Funny,
        );

        assert!(prompt.contains("for: x, tiktok."));
        assert!(prompt.contains(r#"Use a "Funny" tone"#));
        assert!(prompt.contains(r#"Original content: "Launch day!""#));
        assert!(prompt.contains("max 280 chars"));
        assert!(prompt.contains("max 2200 chars"));
        assert!(prompt.contains("Only include the platforms requested."));
    }

    #[test]
    fn test_vibe_prompt_embeds_instruction() {
        let prompt = build_vibe_change_prompt("Our Q3 numbers are in.", Vibe::Professional);

        assert!(prompt.contains(r#"match a "Professional" tone"#));
        assert!(prompt.contains("Make it formal, polished"));
        assert!(prompt.contains(r#"Original content: "Our Q3 numbers are in.""#));
        assert!(prompt.contains("Return only the transformed text"));
    }
}
