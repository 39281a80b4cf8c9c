use crate::answers::AnswerSet;
use crate::spec::{QuestionSpec, QuizSpec};

/// Answered/total counters for a quiz.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub answered: usize,
    pub total: usize,
}

impl Progress {
    pub fn of(spec: &QuizSpec, answers: &AnswerSet) -> Self {
        let answered = spec
            .questions
            .iter()
            .filter(|question| answers.contains(&question.id))
            .count();
        Self {
            answered,
            total: spec.total(),
        }
    }
}

/// First question, in quiz order, that has no answer yet.
pub fn next_question<'a>(spec: &'a QuizSpec, answers: &AnswerSet) -> Option<&'a QuestionSpec> {
    spec.questions
        .iter()
        .find(|question| !answers.contains(&question.id))
}

/// Progress bar fill for the 0-based `step`, rounded to a whole percent.
pub fn percent(step: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    let position = (step + 1).min(total);
    ((position * 100 + total / 2) / total) as u32
}

/// "Question N of M" counter for the 0-based `step`.
pub fn counter_label(step: usize, total: usize) -> String {
    format!("Question {} of {}", (step + 1).min(total), total)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percent_counts_the_current_step() {
        assert_eq!(percent(0, 5), 20);
        assert_eq!(percent(4, 5), 100);
        assert_eq!(percent(0, 3), 33);
        assert_eq!(percent(1, 3), 67);
        assert_eq!(percent(0, 0), 0);
    }

    #[test]
    fn next_question_skips_answered() {
        let spec = QuizSpec::builtin().unwrap();
        let answers = AnswerSet::from_pairs([("condition", "yes")]);
        assert_eq!(next_question(&spec, &answers).unwrap().id, "duration");
        assert_eq!(Progress::of(&spec, &answers).answered, 1);
        assert_eq!(counter_label(1, 5), "Question 2 of 5");
    }
}
