/*!
 * Data model shared by the intake form, the handoff transport and the result session.
 *
 * Field names match the wire format of the script service (snake_case), so the
 * same types are used for requests, responses and the handoff payload.
 */

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::ValidationError;

/// The user's advertising brief
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Brief {
    /// Product or service niche
    pub niche: String,
    /// Key features or keywords
    pub keywords: String,
    /// Target audience
    pub audience: String,
}

/// Identifies one field of the brief form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BriefField {
    Niche,
    Keywords,
    Audience,
}

impl BriefField {
    /// All fields in form order
    pub const ALL: [BriefField; 3] = [BriefField::Niche, BriefField::Keywords, BriefField::Audience];

    /// Form label shown to the user
    pub fn label(&self) -> &'static str {
        match self {
            Self::Niche => "Product/Service Niche",
            Self::Keywords => "Key Features/Keywords",
            Self::Audience => "Target Audience",
        }
    }
}

impl fmt::Display for BriefField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Brief {
    /// Create a brief from its three fields
    pub fn new(niche: impl Into<String>, keywords: impl Into<String>, audience: impl Into<String>) -> Self {
        Self {
            niche: niche.into(),
            keywords: keywords.into(),
            audience: audience.into(),
        }
    }

    /// Value of a single field
    pub fn field(&self, field: BriefField) -> &str {
        match field {
            BriefField::Niche => &self.niche,
            BriefField::Keywords => &self.keywords,
            BriefField::Audience => &self.audience,
        }
    }

    /// Replace a single field
    pub fn set_field(&mut self, field: BriefField, value: impl Into<String>) {
        let value = value.into();
        match field {
            BriefField::Niche => self.niche = value,
            BriefField::Keywords => self.keywords = value,
            BriefField::Audience => self.audience = value,
        }
    }

    /// Check that every field is filled in; whitespace alone counts as empty.
    /// Reports the first empty field in form order.
    pub fn validate(&self) -> Result<(), ValidationError> {
        match BriefField::ALL.into_iter().find(|field| self.field(*field).trim().is_empty()) {
            Some(field) => Err(ValidationError::EmptyField(field)),
            None => Ok(()),
        }
    }

    /// Serialized form of the brief used as the opaque refinement context
    pub fn to_context(&self) -> String {
        // A struct of three strings always serializes
        serde_json::to_string(self).unwrap_or_default()
    }
}

/// One spoken line of the script
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptLine {
    pub text: String,
    pub voice_direction: String,
}

impl ScriptLine {
    pub fn new(text: impl Into<String>, voice_direction: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            voice_direction: voice_direction.into(),
        }
    }
}

/// The generated script; line order is playback order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Script {
    pub lines: Vec<ScriptLine>,
    pub estimated_duration: String,
}

/// Font choices for the ad
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Typography {
    pub headings: String,
    pub body: String,
}

/// Visual guidance generated alongside the script. Never mutated by the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtDirection {
    pub visual_style: String,
    pub color_palette: Vec<String>,
    pub typography: Typography,
    pub key_elements: Vec<String>,
    pub layout: String,
}

/// Script plus art direction, as returned by the generation service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptDocument {
    pub script: Script,
    pub art_direction: ArtDirection,
}

impl ScriptDocument {
    /// Number of script lines
    pub fn line_count(&self) -> usize {
        self.script.lines.len()
    }

    /// Line at `index`, if any
    pub fn line(&self, index: usize) -> Option<&ScriptLine> {
        self.script.lines.get(index)
    }

    /// Replace the line at `index` in place, returning the previous line.
    ///
    /// The number of lines never changes; an out-of-range index leaves the
    /// document untouched and hands the replacement back as the error.
    pub fn replace_line(&mut self, index: usize, line: ScriptLine) -> Result<ScriptLine, ScriptLine> {
        match self.script.lines.get_mut(index) {
            Some(slot) => Ok(std::mem::replace(slot, line)),
            None => Err(line),
        }
    }
}
