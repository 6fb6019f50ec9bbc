//! Analysis Types
//!
//! Core types for image analysis.
//! No logic here - data structures only.

use serde::{Deserialize, Serialize};

// ============================================================================
// INPUT
// ============================================================================

/// Attributes of an uploaded image, as seen by the rule engine
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageAttributes {
    /// User-supplied filename (may be empty)
    pub original_name: String,
    /// Size of the uploaded content
    pub size_bytes: u64,
    /// Declared content type
    pub mime_type: String,
}

impl ImageAttributes {
    pub fn new(
        original_name: impl Into<String>,
        size_bytes: u64,
        mime_type: impl Into<String>,
    ) -> Self {
        Self {
            original_name: original_name.into(),
            size_bytes,
            mime_type: mime_type.into(),
        }
    }
}

// ============================================================================
// ENGINE OUTPUT
// ============================================================================

/// Outcome of a single rule against one image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleOutcome<'a> {
    pub rule_id: &'a str,
    pub triggered: bool,
    /// Present only when triggered
    pub reason: Option<&'a str>,
    pub weight: u32,
}

/// Aggregate produced by the rule engine
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Evaluation {
    /// Sum of weights of triggered rules
    pub score: u32,
    /// Sum of weights of all enabled rules
    pub max_score: u32,
    /// One reason per triggered rule, in table order
    pub reasons: Vec<String>,
    /// Ids of triggered rules, in table order
    pub triggered: Vec<String>,
}

// ============================================================================
// POLICY OUTPUT
// ============================================================================

/// Label + confidence produced by a verdict policy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    pub verdict: String,
    pub confidence: u8,
}

/// Final result handed to the caller for persistence
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub verdict: String,
    /// Always within 0..=100
    pub confidence: u8,
    pub reasons: Vec<String>,
}

impl AnalysisResult {
    pub fn from_parts(verdict: Verdict, reasons: Vec<String>) -> Self {
        Self {
            verdict: verdict.verdict,
            confidence: verdict.confidence,
            reasons,
        }
    }
}
