//! Rule Engine
//!
//! Only scoring logic - no types, no policy.
//! Input: ImageAttributes
//! Output: Evaluation (score + reasons)

use super::rules::{default_rules, RuleDefinition};
use super::types::{Evaluation, ImageAttributes, RuleOutcome};

/// Ordered, immutable rule table
#[derive(Debug, Clone)]
pub struct RuleEngine {
    rules: Vec<RuleDefinition>,
}

impl Default for RuleEngine {
    fn default() -> Self {
        Self::new(default_rules())
    }
}

impl RuleEngine {
    pub fn new(rules: Vec<RuleDefinition>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[RuleDefinition] {
        &self.rules
    }

    /// Highest score any input can reach; saturates instead of wrapping
    pub fn max_score(&self) -> u32 {
        self.enabled().fold(0u32, |total, r| total.saturating_add(r.weight))
    }

    /// Per-rule outcomes, in table order
    pub fn outcomes<'a>(
        &'a self,
        attrs: &'a ImageAttributes,
    ) -> impl Iterator<Item = RuleOutcome<'a>> + 'a {
        self.enabled().map(move |rule| {
            let triggered = rule.condition.matches(attrs);
            RuleOutcome {
                rule_id: &rule.id,
                triggered,
                reason: triggered.then_some(rule.reason.as_str()),
                weight: rule.weight,
            }
        })
    }

    /// Evaluate every enabled rule and sum the triggered weights.
    ///
    /// Rules never short-circuit each other; order only decides the
    /// order of `reasons`.
    pub fn evaluate(&self, attrs: &ImageAttributes) -> Evaluation {
        let mut evaluation = Evaluation {
            max_score: self.max_score(),
            ..Default::default()
        };

        for outcome in self.outcomes(attrs) {
            if let Some(reason) = outcome.reason {
                evaluation.score = evaluation.score.saturating_add(outcome.weight);
                evaluation.reasons.push(reason.to_string());
                evaluation.triggered.push(outcome.rule_id.to_string());
            }
        }

        evaluation
    }

    fn enabled(&self) -> impl Iterator<Item = &RuleDefinition> {
        self.rules.iter().filter(|r| r.enabled)
    }
}

// ============================================================================
// TESTS
// ============================================================================
