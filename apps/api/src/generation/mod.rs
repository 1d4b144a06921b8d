// Generation API — platform repurposing and vibe changes.
// Implements: prompt building, sequential model fallback, output parsing.
// All model calls go through llm_client — no direct OpenRouter calls here.

pub mod fallback;
pub mod generator;
pub mod handlers;
pub mod parse;
pub mod platform;
pub mod prompts;
pub mod vibe;
