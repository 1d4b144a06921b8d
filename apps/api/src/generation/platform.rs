//! Platform vocabulary — the five target surfaces repurposed content can be
//! shaped for, with the length ceiling the prompts advertise per surface.

use serde::{Deserialize, Serialize};

/// A supported target platform for repurposed content.
///
/// Serialized lowercase on the wire, both in request `platforms` lists and as
/// the keys of the `repurposedContent` mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    X,
    Linkedin,
    Instagram,
    Tiktok,
    Newsletter,
}

impl Platform {
    /// Every supported platform, in the order the prompt schema lists them.
    pub const ALL: [Platform; 5] = [
        Platform::X,
        Platform::Linkedin,
        Platform::Instagram,
        Platform::Tiktok,
        Platform::Newsletter,
    ];

    /// The wire tag, matching the serde rename.
    pub fn as_str(self) -> &'static str {
        match self {
            Platform::X => "x",
            Platform::Linkedin => "linkedin",
            Platform::Instagram => "instagram",
            Platform::Tiktok => "tiktok",
            Platform::Newsletter => "newsletter",
        }
    }

    /// Character ceiling quoted to the model for this platform.
    /// These are prompt instructions only — output is not truncated here.
    pub fn char_limit(self) -> u32 {
        match self {
            Platform::X => 280,
            Platform::Linkedin => 500,
            Platform::Instagram => 2200,
            Platform::Tiktok => 200,
            Platform::Newsletter => 800,
        }
    }

    /// What a unit of content is called on this platform, for prompt copy.
    pub fn content_kind(self) -> &'static str {
        match self {
            Platform::X | Platform::Linkedin => "post",
            Platform::Instagram => "caption",
            Platform::Tiktok => "description",
            Platform::Newsletter => "section",
        }
    }
}
