//! Vibe vocabulary — the tone labels a user can pick, each carrying the
//! instruction sentence the vibe-change prompt embeds for that tone.

use serde::{Deserialize, Serialize};

/// A tone label selectable per request.
///
/// Serialized with the capitalized label as the wire value ("Professional",
/// "Casual", ...), which is also how the label is quoted inside prompts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Vibe {
    Professional,
    Casual,
    Funny,
    Inspirational,
    Educational,
}

impl Vibe {
    /// The wire label, matching the serde form.
    pub fn as_str(self) -> &'static str {
        match self {
            Vibe::Professional => "Professional",
            Vibe::Casual => "Casual",
            Vibe::Funny => "Funny",
            Vibe::Inspirational => "Inspirational",
            Vibe::Educational => "Educational",
        }
    }

    /// Tone-specific steering sentence embedded into the vibe-change prompt.
    pub fn instruction(self) -> &'static str {
        match self {
            Vibe::Professional => {
                "Make it formal, polished, and business-appropriate. \
                 Use professional language and maintain a formal tone."
            }
            Vibe::Casual => {
                "Make it friendly, approachable, and conversational. \
                 Use casual language and a relaxed tone."
            }
            Vibe::Funny => {
                "Add humor and wit while keeping the core message. \
                 Use jokes, puns, or funny observations."
            }
            Vibe::Inspirational => {
                "Make it motivational and uplifting. \
                 Focus on inspiration and positive messaging."
            }
            Vibe::Educational => {
                "Focus on educational value and details. \
                 Provide helpful information and explain concepts clearly."
            }
        }
    }
}
