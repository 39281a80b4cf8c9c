use proptest::prelude::*;

use quiz_spec::{AnswerSet, MAX_SCORE, Tier, score};

const CONDITION: &[&str] = &["yes", "no"];
const DURATION: &[&str] = &["yes", "no"];
const WORK_HISTORY: &[&str] = &["yes_recent", "yes_older", "no"];
const TREATMENT: &[&str] = &["yes_regular", "yes_some", "no"];
const APPLIED: &[&str] = &["no", "pending", "denied"];

fn answers_strategy() -> impl Strategy<Value = AnswerSet> {
    (
        prop::sample::select(CONDITION),
        prop::sample::select(DURATION),
        prop::sample::select(WORK_HISTORY),
        prop::sample::select(TREATMENT),
        prop::sample::select(APPLIED),
    )
        .prop_map(|(condition, duration, work_history, treatment, applied)| {
            AnswerSet::from_pairs([
                ("condition", condition),
                ("duration", duration),
                ("work_history", work_history),
                ("treatment", treatment),
                ("applied", applied),
            ])
        })
}

proptest! {
    #[test]
    fn score_stays_in_range_and_matches_tier(answers in answers_strategy()) {
        let result = score(&answers);
        prop_assert!(result.score <= MAX_SCORE);
        prop_assert_eq!(result.tier, Tier::from_score(result.score));
        prop_assert_eq!(result.message.as_str(), result.tier.message());
        prop_assert!(result.factors.len() <= 5);
    }

    #[test]
    fn score_is_deterministic(answers in answers_strategy()) {
        let snapshot = answers.clone();
        let first = score(&answers);
        let second = score(&answers);
        prop_assert_eq!(first, second);
        prop_assert_eq!(answers, snapshot);
    }

    #[test]
    fn arbitrary_tokens_never_panic(
        condition in "[a-z_]{0,12}",
        applied in "[a-z_]{0,12}",
    ) {
        let answers = AnswerSet::from_pairs([
            ("condition", condition.as_str()),
            ("applied", applied.as_str()),
        ]);
        let result = score(&answers);
        prop_assert!(result.score <= 40);
    }
}
