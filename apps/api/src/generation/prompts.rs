// All LLM prompt constants for the Generation module.
// Placeholders are filled by the builders in `generator`.

/// Repurposing prompt template.
/// Replace `{platform_list}`, `{vibe}`, `{original_content}`, and
/// `{format_example}` before sending.
pub const REPURPOSE_PROMPT_TEMPLATE: &str = r#"You are a content repurposing expert. Transform the following content into optimized posts for: {platform_list}.

Use a "{vibe}" tone for all posts.

Original content: "{original_content}"

Provide the repurposed content in JSON format like this (no markdown code blocks):
{format_example}

Only include the platforms requested. Keep each platform's character limit in mind."#;

/// Vibe-change prompt template.
/// Replace `{vibe}`, `{vibe_instruction}`, and `{text}` before sending.
pub const VIBE_CHANGE_PROMPT_TEMPLATE: &str = r#"Transform the following content to match a "{vibe}" tone. {vibe_instruction}

Original content: "{text}"

Keep the core message and meaning intact. Only change the tone and style. Return only the transformed text, nothing else."#;
