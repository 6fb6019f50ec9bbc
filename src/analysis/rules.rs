//! Detection Rules
//!
//! Declarative rule descriptors and the built-in rule tables.
//! A rule is a condition + weight + reason. Adding, removing or
//! reweighting a rule is a data edit; the engine never changes.

use serde::{Deserialize, Serialize};

use super::types::ImageAttributes;

// ============================================================================
// THRESHOLDS
// ============================================================================

/// Files below this size are considered unusually small
pub const SMALL_FILE_THRESHOLD: u64 = 150 * 1024;

/// Filenames shorter than this (in chars) look auto-generated
pub const GENERIC_NAME_MAX_CHARS: usize = 10;

/// Formats AI generators tend to emit
pub const AI_FAVORED_TYPES: &[&str] = &["image/webp", "image/avif"];

/// Extensions a camera or phone typically writes
pub const CAMERA_EXTENSIONS: &[&str] = &[".jpg", ".jpeg", ".png"];

/// Largest weight a single rule may carry
pub const MAX_RULE_WEIGHT: u32 = 1000;

/// Version tag of the built-in rule table
pub const DEFAULT_RULESET_VERSION: u32 = 4;

/// Version tag of the first observed rule table
pub const LEGACY_RULESET_VERSION: u32 = 1;

// ============================================================================
// RULE DESCRIPTORS
// ============================================================================

/// Predicate over image attributes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleCondition {
    /// `size_bytes < bytes`
    SizeBelow { bytes: u64 },
    /// MIME type is one of `types` (ASCII case-insensitive)
    MimeTypeIn { types: Vec<String> },
    /// Filename has fewer than `chars` characters
    NameShorterThan { chars: usize },
    /// Filename ends with none of `extensions` (case-insensitive)
    NameLacksExtension { extensions: Vec<String> },
}

impl RuleCondition {
    pub fn matches(&self, attrs: &ImageAttributes) -> bool {
        match self {
            RuleCondition::SizeBelow { bytes } => attrs.size_bytes < *bytes,
            RuleCondition::MimeTypeIn { types } => {
                let mime = attrs.mime_type.trim();
                types.iter().any(|t| t.trim().eq_ignore_ascii_case(mime))
            }
            RuleCondition::NameShorterThan { chars } => {
                attrs.original_name.chars().count() < *chars
            }
            RuleCondition::NameLacksExtension { extensions } => {
                let name = attrs.original_name.to_lowercase();
                !extensions
                    .iter()
                    .any(|ext| name.ends_with(&ext.to_lowercase()))
            }
        }
    }
}

fn default_weight() -> u32 {
    1
}

fn default_enabled() -> bool {
    true
}

/// One row of the rule table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleDefinition {
    pub id: String,
    pub condition: RuleCondition,
    pub reason: String,
    #[serde(default = "default_weight")]
    pub weight: u32,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

impl RuleDefinition {
    pub fn new(id: &str, condition: RuleCondition, reason: &str) -> Self {
        Self {
            id: id.to_string(),
            condition,
            reason: reason.to_string(),
            weight: default_weight(),
            enabled: true,
        }
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

// ============================================================================
// BUILT-IN TABLES
// ============================================================================

/// Current rule table: four rules, weight 1 each
pub fn default_rules() -> Vec<RuleDefinition> {
    vec![
        RuleDefinition::new(
            "small_file",
            RuleCondition::SizeBelow { bytes: SMALL_FILE_THRESHOLD },
            "Unusually small file size for the given image.",
        ),
        RuleDefinition::new(
            "ai_format",
            RuleCondition::MimeTypeIn { types: strings(AI_FAVORED_TYPES) },
            "Image format frequently used by AI generators.",
        ),
        RuleDefinition::new(
            "generic_filename",
            RuleCondition::NameShorterThan { chars: GENERIC_NAME_MAX_CHARS },
            "Auto-generated or generic filename detected.",
        ),
        RuleDefinition::new(
            "missing_camera_metadata",
            RuleCondition::NameLacksExtension { extensions: strings(CAMERA_EXTENSIONS) },
            "Missing typical camera metadata.",
        ),
    ]
}

/// First observed rule table: three rules, webp only
pub fn legacy_rules() -> Vec<RuleDefinition> {
    vec![
        RuleDefinition::new(
            "small_file",
            RuleCondition::SizeBelow { bytes: SMALL_FILE_THRESHOLD },
            "Unusually small file size for the given image.",
        ),
        RuleDefinition::new(
            "ai_format",
            RuleCondition::MimeTypeIn { types: strings(&["image/webp"]) },
            "Image format commonly used by AI tools.",
        ),
        RuleDefinition::new(
            "generic_filename",
            RuleCondition::NameShorterThan { chars: GENERIC_NAME_MAX_CHARS },
            "Generic or short file name detected.",
        ),
    ]
}

// ============================================================================
// TESTS
// ============================================================================
