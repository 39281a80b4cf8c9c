use std::fmt;

use serde::{Deserialize, Serialize};

use crate::answers::AnswerSet;

/// Highest score a fully favourable answer set reaches.
pub const MAX_SCORE: u32 = 100;

const HIGH_THRESHOLD: u32 = 70;
const MEDIUM_THRESHOLD: u32 = 40;

/// Qualitative bucket derived from the numeric score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    High,
    Medium,
    Low,
}

impl Tier {
    pub fn from_score(score: u32) -> Self {
        if score >= HIGH_THRESHOLD {
            Tier::High
        } else if score >= MEDIUM_THRESHOLD {
            Tier::Medium
        } else {
            Tier::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::High => "high",
            Tier::Medium => "medium",
            Tier::Low => "low",
        }
    }

    /// Headline shown on the result banner.
    pub fn message(&self) -> &'static str {
        match self {
            Tier::High => "You May Strongly Qualify",
            Tier::Medium => "You May Qualify",
            Tier::Low => "We Should Review Your Case",
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            Tier::High => "#2E7D32",
            Tier::Medium => "#F9A825",
            Tier::Low => "#6B21A8",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of scoring a complete answer set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualificationResult {
    pub score: u32,
    pub tier: Tier,
    pub message: String,
    pub color: String,
    /// Labels of the answers that raised the score, in evaluation order.
    pub factors: Vec<String>,
}

impl QualificationResult {
    fn from_parts(score: u32, factors: Vec<String>) -> Self {
        let tier = Tier::from_score(score);
        Self {
            score,
            tier,
            message: tier.message().to_string(),
            color: tier.color().to_string(),
            factors,
        }
    }
}

/// Scores an answer set. Unrecognized or missing answers add nothing.
pub fn score(answers: &AnswerSet) -> QualificationResult {
    let mut total = 0;
    let mut factors = Vec::new();
    let mut add = |points: u32, factor: Option<&str>| {
        total += points;
        if let Some(label) = factor {
            factors.push(label.to_string());
        }
    };

    if answers.get("condition") == Some("yes") {
        add(30, Some("disabling condition"));
    }
    if answers.get("duration") == Some("yes") {
        add(25, Some("long-term condition"));
    }
    match answers.get("work_history") {
        Some("yes_recent") => add(20, Some("recent work history")),
        Some("yes_older") => add(10, Some("work history")),
        _ => {}
    }
    match answers.get("treatment") {
        Some("yes_regular") => add(15, Some("medical documentation")),
        Some("yes_some") => add(8, None),
        _ => {}
    }
    match answers.get("applied") {
        Some("denied") => add(10, Some("prior denial (appeals possible)")),
        Some("no") => add(5, None),
        _ => {}
    }

    QualificationResult::from_parts(total, factors)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tier_boundaries() {
        assert_eq!(Tier::from_score(100), Tier::High);
        assert_eq!(Tier::from_score(70), Tier::High);
        assert_eq!(Tier::from_score(69), Tier::Medium);
        assert_eq!(Tier::from_score(40), Tier::Medium);
        assert_eq!(Tier::from_score(39), Tier::Low);
        assert_eq!(Tier::from_score(0), Tier::Low);
    }

    #[test]
    fn best_case_scores_one_hundred() {
        let answers = AnswerSet::from_pairs([
            ("condition", "yes"),
            ("duration", "yes"),
            ("work_history", "yes_recent"),
            ("treatment", "yes_regular"),
            ("applied", "denied"),
        ]);
        let result = score(&answers);
        assert_eq!(result.score, MAX_SCORE);
        assert_eq!(result.tier, Tier::High);
        assert_eq!(result.message, "You May Strongly Qualify");
        assert_eq!(result.color, "#2E7D32");
        assert_eq!(
            result.factors,
            vec![
                "disabling condition",
                "long-term condition",
                "recent work history",
                "medical documentation",
                "prior denial (appeals possible)",
            ]
        );
    }

    #[test]
    fn condition_only_with_fresh_application_is_low() {
        let answers = AnswerSet::from_pairs([
            ("condition", "yes"),
            ("duration", "no"),
            ("work_history", "no"),
            ("treatment", "no"),
            ("applied", "no"),
        ]);
        let result = score(&answers);
        assert_eq!(result.score, 35);
        assert_eq!(result.tier, Tier::Low);
        assert_eq!(result.message, "We Should Review Your Case");
        assert_eq!(result.color, "#6B21A8");
        assert_eq!(result.factors, vec!["disabling condition"]);
    }

    #[test]
    fn older_history_and_some_treatment_still_high() {
        let answers = AnswerSet::from_pairs([
            ("condition", "yes"),
            ("duration", "yes"),
            ("work_history", "yes_older"),
            ("treatment", "yes_some"),
            ("applied", "pending"),
        ]);
        let result = score(&answers);
        assert_eq!(result.score, 73);
        assert_eq!(result.tier, Tier::High);
        assert_eq!(
            result.factors,
            vec!["disabling condition", "long-term condition", "work history"]
        );
    }

    #[test]
    fn medium_tier_uses_amber_banner() {
        let answers = AnswerSet::from_pairs([
            ("condition", "yes"),
            ("duration", "yes"),
            ("work_history", "no"),
            ("treatment", "no"),
            ("applied", "pending"),
        ]);
        let result = score(&answers);
        assert_eq!(result.score, 55);
        assert_eq!(result.tier, Tier::Medium);
        assert_eq!(result.message, "You May Qualify");
        assert_eq!(result.color, "#F9A825");
    }

    #[test]
    fn unrecognized_and_missing_answers_add_nothing() {
        let answers = AnswerSet::from_pairs([("condition", "YES"), ("applied", "maybe")]);
        let result = score(&answers);
        assert_eq!(result.score, 0);
        assert!(result.factors.is_empty());
        assert_eq!(score(&AnswerSet::default()).tier, Tier::Low);
    }

    #[test]
    fn tier_serializes_lowercase() {
        assert_eq!(serde_json::to_value(Tier::Medium).unwrap(), "medium");
    }
}
