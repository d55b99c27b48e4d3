use std::collections::{BTreeSet, HashMap};

use serde_json::Value;

use crate::db::models::Question;
use crate::db::types::{QuestionType, ResultStatus};

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ScoreOutcome {
    pub(crate) score: i32,
    pub(crate) total_score: i32,
    pub(crate) percentage: f64,
    pub(crate) status: ResultStatus,
}

/// Grades a submission against the exam's answer key. Every question counts
/// toward the total whether or not it was answered; unanswered earns nothing.
pub(crate) fn score_answers(
    questions: &[Question],
    answers: &HashMap<String, Value>,
    passing_score: i32,
) -> ScoreOutcome {
    let mut earned = 0i32;
    let mut total = 0i32;

    for question in questions {
        total += question.score;
        let Some(given) = answers.get(&question.id) else {
            continue;
        };
        if answer_matches(question.question_type, &question.correct_answer, given) {
            earned += question.score;
        }
    }

    let percentage = if total > 0 { round2(f64::from(earned) / f64::from(total) * 100.0) } else { 0.0 };
    let status = if percentage >= f64::from(passing_score) {
        ResultStatus::Passed
    } else {
        ResultStatus::Failed
    };

    ScoreOutcome { score: earned, total_score: total, percentage, status }
}

/// Per-type comparison of a submitted answer against the stored key.
pub(crate) fn answer_matches(
    question_type: QuestionType,
    correct_answer: &str,
    given: &Value,
) -> bool {
    match question_type {
        QuestionType::MultipleChoice | QuestionType::TrueFalse | QuestionType::Descriptive => {
            match value_as_text(given) {
                Some(text) => text.trim() == correct_answer.trim(),
                None => false,
            }
        }
        QuestionType::Checkbox => match selections_of(given) {
            Some(selected) => selected == key_selections(correct_answer),
            None => false,
        },
        QuestionType::Rating => match (value_as_number(given), correct_answer.trim().parse::<f64>())
        {
            (Some(given_num), Ok(correct_num)) => (given_num - correct_num).abs() < f64::EPSILON,
            _ => match value_as_text(given) {
                Some(text) => text.trim() == correct_answer.trim(),
                None => false,
            },
        },
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn value_as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(num) => Some(num.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}

fn value_as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(num) => num.as_f64(),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}

/// Checkbox submissions arrive as a JSON array or a comma-joined string.
/// Order and duplicates never matter.
fn selections_of(value: &Value) -> Option<BTreeSet<String>> {
    match value {
        Value::Array(items) => {
            let mut set = BTreeSet::new();
            for item in items {
                set.insert(value_as_text(item)?.trim().to_string());
            }
            Some(set)
        }
        Value::String(text) => Some(split_selections(text)),
        _ => None,
    }
}

/// The key side is stored as text: a JSON array when authored through the
/// API, or a plain comma-joined list for hand-entered keys.
fn key_selections(correct_answer: &str) -> BTreeSet<String> {
    if let Ok(items) = serde_json::from_str::<Vec<String>>(correct_answer) {
        return items.into_iter().map(|item| item.trim().to_string()).collect();
    }
    split_selections(correct_answer)
}

fn split_selections(raw: &str) -> BTreeSet<String> {
    raw.split(',')
        .map(|item| item.trim().to_string())
        .filter(|item| !item.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::time::primitive_now_utc;
    use crate::db::types::DifficultyLevel;
    use serde_json::json;

    fn question(id: &str, question_type: QuestionType, correct: &str, score: i32) -> Question {
        let now = primitive_now_utc();
        Question {
            id: id.to_string(),
            question: format!("question {id}"),
            question_type,
            options: None,
            correct_answer: correct.to_string(),
            score,
            difficulty: DifficultyLevel::Medium,
            category: "general".to_string(),
            created_by: "user-1".to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn partial_credit_rounds_to_two_decimals() {
        let questions = vec![
            question("a", QuestionType::MultipleChoice, "x", 10),
            question("b", QuestionType::MultipleChoice, "y", 5),
        ];
        let answers = HashMap::from([
            ("a".to_string(), json!("x")),
            ("b".to_string(), json!("z")),
        ]);

        let outcome = score_answers(&questions, &answers, 60);

        assert_eq!(outcome.score, 10);
        assert_eq!(outcome.total_score, 15);
        assert_eq!(outcome.percentage, 66.67);
        assert_eq!(outcome.status, ResultStatus::Passed);
    }

    #[test]
    fn all_wrong_fails_with_zero() {
        let questions = vec![question("a", QuestionType::TrueFalse, "true", 10)];
        let answers = HashMap::from([("a".to_string(), json!("false"))]);

        let outcome = score_answers(&questions, &answers, 50);

        assert_eq!(outcome.score, 0);
        assert_eq!(outcome.percentage, 0.0);
        assert_eq!(outcome.status, ResultStatus::Failed);
    }

    #[test]
    fn unanswered_question_earns_nothing_but_counts() {
        let questions = vec![
            question("a", QuestionType::MultipleChoice, "x", 10),
            question("b", QuestionType::MultipleChoice, "y", 10),
        ];
        let answers = HashMap::from([("a".to_string(), json!("x"))]);

        let outcome = score_answers(&questions, &answers, 50);

        assert_eq!(outcome.score, 10);
        assert_eq!(outcome.total_score, 20);
        assert_eq!(outcome.percentage, 50.0);
        assert_eq!(outcome.status, ResultStatus::Passed);
    }

    #[test]
    fn empty_exam_scores_zero_percent() {
        let outcome = score_answers(&[], &HashMap::new(), 60);

        assert_eq!(outcome.total_score, 0);
        assert_eq!(outcome.percentage, 0.0);
        assert_eq!(outcome.status, ResultStatus::Failed);

        // A zero passing bar is still met by an empty exam.
        let trivially_passed = score_answers(&[], &HashMap::new(), 0);
        assert_eq!(trivially_passed.status, ResultStatus::Passed);
    }

    #[test]
    fn string_answers_compare_trimmed() {
        assert!(answer_matches(QuestionType::MultipleChoice, "Paris", &json!("  Paris ")));
        assert!(answer_matches(QuestionType::Descriptive, " full answer ", &json!("full answer")));
        assert!(!answer_matches(QuestionType::MultipleChoice, "Paris", &json!("paris")));
    }

    #[test]
    fn checkbox_is_order_insensitive_set_equality() {
        assert!(answer_matches(QuestionType::Checkbox, r#"["a","b"]"#, &json!(["b", "a"])));
        assert!(answer_matches(QuestionType::Checkbox, "a, b", &json!("b,a")));
        assert!(answer_matches(QuestionType::Checkbox, r#"["a","b"]"#, &json!(["a", "b", "a"])));
        assert!(!answer_matches(QuestionType::Checkbox, r#"["a","b"]"#, &json!(["a"])));
        assert!(!answer_matches(QuestionType::Checkbox, r#"["a"]"#, &json!(["a", "c"])));
    }

    #[test]
    fn rating_compares_numerically() {
        assert!(answer_matches(QuestionType::Rating, "4", &json!(4)));
        assert!(answer_matches(QuestionType::Rating, "4.0", &json!("4")));
        assert!(answer_matches(QuestionType::Rating, "4", &json!(4.0)));
        assert!(!answer_matches(QuestionType::Rating, "4", &json!(5)));
    }

    #[test]
    fn rating_falls_back_to_text_when_not_numeric() {
        assert!(answer_matches(QuestionType::Rating, "high", &json!("high")));
        assert!(!answer_matches(QuestionType::Rating, "high", &json!("low")));
    }

    #[test]
    fn structured_values_never_match_text_questions() {
        assert!(!answer_matches(QuestionType::MultipleChoice, "x", &json!(["x"])));
        assert!(!answer_matches(QuestionType::Descriptive, "x", &json!({"answer": "x"})));
        assert!(!answer_matches(QuestionType::Checkbox, r#"["a"]"#, &json!(7)));
    }
}
