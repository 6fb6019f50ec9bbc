//! Verdict Policy
//!
//! Maps an aggregate rule score to a label and a confidence.
//! Strategies are selected by id so the scoring scheme can change
//! without touching the rule engine.
//!
//! - `tiered`: ordered thresholds with fixed confidences (default)
//! - `proportional`: binary cut, confidence derived from score / max

use serde::{Deserialize, Serialize};

use super::types::Verdict;

pub const TIERED_POLICY_ID: &str = "tiered";
pub const PROPORTIONAL_POLICY_ID: &str = "proportional";

/// Score-to-verdict strategy
pub trait VerdictPolicy: Send + Sync {
    fn id(&self) -> &str;
    fn decide(&self, score: u32, max_score: u32) -> Verdict;
}

// ============================================================================
// TIERED
// ============================================================================

/// When a tier applies
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TierThreshold {
    /// `score >= n`
    AtLeast(u32),
    /// `score / max_score >= ratio`; never matches when `max_score == 0`
    AtLeastRatio(f64),
}

impl TierThreshold {
    pub fn matches(&self, score: u32, max_score: u32) -> bool {
        match *self {
            TierThreshold::AtLeast(min) => score >= min,
            TierThreshold::AtLeastRatio(ratio) => {
                max_score > 0 && f64::from(score) / f64::from(max_score) >= ratio
            }
        }
    }
}

/// Fixed label + confidence
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outcome {
    pub label: String,
    pub confidence: u8,
}

impl Outcome {
    fn new(label: &str, confidence: u8) -> Self {
        Self { label: label.to_string(), confidence }
    }

    fn to_verdict(&self) -> Verdict {
        Verdict {
            verdict: self.label.clone(),
            confidence: self.confidence.min(100),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tier {
    pub threshold: TierThreshold,
    #[serde(flatten)]
    pub outcome: Outcome,
}

/// First matching tier wins; `floor` when none match
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TieredPolicy {
    pub tiers: Vec<Tier>,
    pub floor: Outcome,
}

impl Default for TieredPolicy {
    fn default() -> Self {
        Self {
            tiers: vec![
                Tier {
                    threshold: TierThreshold::AtLeast(3),
                    outcome: Outcome::new("AI-Generated Image", 90),
                },
                Tier {
                    threshold: TierThreshold::AtLeast(2),
                    outcome: Outcome::new("Likely AI-Generated Image", 70),
                },
            ],
            floor: Outcome::new("Likely Real Image", 95),
        }
    }
}

impl VerdictPolicy for TieredPolicy {
    fn id(&self) -> &str {
        TIERED_POLICY_ID
    }

    fn decide(&self, score: u32, max_score: u32) -> Verdict {
        self.tiers
            .iter()
            .find(|tier| tier.threshold.matches(score, max_score))
            .map(|tier| &tier.outcome)
            .unwrap_or(&self.floor)
            .to_verdict()
    }
}

// ============================================================================
// PROPORTIONAL
// ============================================================================

/// Binary cut; confidence = round(score / max * 100), inverted below the cut
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProportionalPolicy {
    pub positive_min_score: u32,
    pub positive_label: String,
    pub negative_label: String,
}

impl Default for ProportionalPolicy {
    fn default() -> Self {
        Self {
            positive_min_score: 2,
            positive_label: "AI-Generated Image".to_string(),
            negative_label: "Not AI-Generated Image".to_string(),
        }
    }
}

impl ProportionalPolicy {
    fn percentage(score: u32, max_score: u32) -> u8 {
        if max_score == 0 {
            return 0;
        }
        let pct = (f64::from(score) / f64::from(max_score) * 100.0).round();
        pct.clamp(0.0, 100.0) as u8
    }
}

impl VerdictPolicy for ProportionalPolicy {
    fn id(&self) -> &str {
        PROPORTIONAL_POLICY_ID
    }

    fn decide(&self, score: u32, max_score: u32) -> Verdict {
        let pct = Self::percentage(score, max_score);
        if score >= self.positive_min_score {
            Verdict { verdict: self.positive_label.clone(), confidence: pct }
        } else {
            Verdict { verdict: self.negative_label.clone(), confidence: 100 - pct }
        }
    }
}

// ============================================================================
// CONFIG (strategy keyed by id)
// ============================================================================

/// Serializable policy selection, tagged by `kind`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PolicyConfig {
    Tiered(TieredPolicy),
    Proportional(ProportionalPolicy),
}

impl Default for PolicyConfig {
    fn default() -> Self {
        PolicyConfig::Tiered(TieredPolicy::default())
    }
}

impl PolicyConfig {
    /// Built-in preset for a policy id
    pub fn from_id(id: &str) -> Option<Self> {
        match id.trim().to_ascii_lowercase().as_str() {
            TIERED_POLICY_ID => Some(PolicyConfig::Tiered(TieredPolicy::default())),
            PROPORTIONAL_POLICY_ID => Some(PolicyConfig::Proportional(ProportionalPolicy::default())),
            _ => None,
        }
    }

    /// Reject configurations that could emit a positive label with no
    /// triggered rule or a confidence above 100
    pub fn validate(&self) -> Result<(), String> {
        match self {
            PolicyConfig::Tiered(policy) => {
                for tier in &policy.tiers {
                    match tier.threshold {
                        TierThreshold::AtLeast(0) => {
                            return Err(format!("tier '{}' must require a score above 0", tier.outcome.label));
                        }
                        TierThreshold::AtLeastRatio(r) if !(r > 0.0 && r <= 1.0) => {
                            return Err(format!("tier '{}' ratio {} outside (0, 1]", tier.outcome.label, r));
                        }
                        _ => {}
                    }
                    if tier.outcome.confidence > 100 {
                        return Err(format!("tier '{}' confidence above 100", tier.outcome.label));
                    }
                }
                if policy.floor.confidence > 100 {
                    return Err("floor confidence above 100".to_string());
                }
                Ok(())
            }
            PolicyConfig::Proportional(policy) => {
                if policy.positive_min_score == 0 {
                    return Err("positive_min_score must be at least 1".to_string());
                }
                Ok(())
            }
        }
    }

    pub fn into_policy(self) -> Box<dyn VerdictPolicy> {
        match self {
            PolicyConfig::Tiered(p) => Box::new(p),
            PolicyConfig::Proportional(p) => Box::new(p),
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
