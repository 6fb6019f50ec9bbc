//! Analysis Module
//!
//! Heuristic detection of AI-generated images from upload metadata.
//! Deterministic and explainable: every point of score carries a reason.
//!
//! ## Structure
//! - `types`: Core types (ImageAttributes, Evaluation, AnalysisResult)
//! - `rules`: Rule descriptors and built-in tables
//! - `engine`: Score aggregation
//! - `policy`: Score-to-verdict strategies
//! - `config`: Loading and validating rules + policy
//!
//! ## Usage
//! ```ignore
//! use crate::analysis::{Detector, ImageAttributes};
//!
//! let detector = Detector::default();
//! let result = detector.analyze(&ImageAttributes::new("a.webp", 50_000, "image/webp"));
//! assert_eq!(result.verdict, "AI-Generated Image");
//! ```

pub mod types;
pub mod rules;
pub mod engine;
pub mod policy;
pub mod config;

pub use types::{AnalysisResult, Evaluation, ImageAttributes, Verdict};
pub use engine::RuleEngine;
pub use policy::{PolicyConfig, VerdictPolicy};
pub use config::{ConfigError, DetectorConfig};

/// Rule engine + verdict policy, immutable after construction
pub struct Detector {
    ruleset_version: u32,
    engine: RuleEngine,
    policy: Box<dyn VerdictPolicy>,
}

impl Default for Detector {
    fn default() -> Self {
        Self::from_config(DetectorConfig::default())
    }
}

impl std::fmt::Debug for Detector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Detector")
            .field("ruleset_version", &self.ruleset_version)
            .field("rules", &self.engine.rules().len())
            .field("policy", &self.policy.id())
            .finish()
    }
}

impl Detector {
    pub fn from_config(config: DetectorConfig) -> Self {
        Self {
            ruleset_version: config.ruleset_version,
            engine: RuleEngine::new(config.rules),
            policy: config.policy.into_policy(),
        }
    }

    pub fn ruleset_version(&self) -> u32 {
        self.ruleset_version
    }

    pub fn policy_id(&self) -> &str {
        self.policy.id()
    }

    pub fn engine(&self) -> &RuleEngine {
        &self.engine
    }

    pub fn evaluate(&self, attrs: &ImageAttributes) -> Evaluation {
        self.engine.evaluate(attrs)
    }

    pub fn decide(&self, score: u32, max_score: u32) -> Verdict {
        self.policy.decide(score, max_score)
    }

    /// Evaluate rules, then apply the policy; reasons pass through unchanged
    pub fn analyze(&self, attrs: &ImageAttributes) -> AnalysisResult {
        let evaluation = self.evaluate(attrs);
        let verdict = self.decide(evaluation.score, evaluation.max_score);

        tracing::debug!(
            score = evaluation.score,
            max_score = evaluation.max_score,
            triggered = ?evaluation.triggered,
            verdict = %verdict.verdict,
            "image analyzed"
        );

        AnalysisResult::from_parts(verdict, evaluation.reasons)
    }
}

// ============================================================================
// TESTS
// ============================================================================
