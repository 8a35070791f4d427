use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

// Dot matches newlines so a question may span lines until the `A:` marker;
// both captures are non-greedy. Text that deviates from the convention
// simply produces no matches.
static QA_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)Q: (.*?)\nA: (.*?)\n").expect("valid QA pattern"));

/// One question/answer unit extracted from generated text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QaPair {
    /// Card front
    pub question: String,

    /// Card back
    pub answer: String,
}

/// Extracts `Q:`/`A:` pairs from response text.
///
/// A pair requires the literal `Q: <text>` followed on the next line by
/// `A: <text>` and a terminating newline. Ordering within the text is
/// preserved. Non-conforming text yields zero pairs with no diagnostic
/// beyond a debug count.
#[must_use]
pub fn extract_pairs(text: &str) -> Vec<QaPair> {
    let pairs: Vec<QaPair> = QA_PATTERN
        .captures_iter(text)
        .map(|caps| QaPair {
            question: caps[1].to_string(),
            answer: caps[2].to_string(),
        })
        .collect();

    debug!("Extracted {} QA pairs", pairs.len());
    pairs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_pair() {
        let pairs = extract_pairs("Q: What is 2+2?\nA: 4\n\n");

        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].question, "What is 2+2?");
        assert_eq!(pairs[0].answer, "4");
    }

    #[test]
    fn test_multiple_pairs_preserve_order() {
        let text = "Q: First?\nA: one\n\nQ: Second?\nA: two\n\n";
        let pairs = extract_pairs(text);

        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[0].question, "First?");
        assert_eq!(pairs[1].question, "Second?");
        assert_eq!(pairs[1].answer, "two");
    }

    #[test]
    fn test_no_markers_yields_empty() {
        let pairs = extract_pairs("Just some prose without any markers.\n");

        assert!(pairs.is_empty());
    }

    #[test]
    fn test_lowercase_markers_yield_nothing() {
        let pairs = extract_pairs("q: What?\na: That\n\n");

        assert!(pairs.is_empty());
    }

    #[test]
    fn test_answer_without_trailing_newline_dropped() {
        let pairs = extract_pairs("Q: What?\nA: no newline after this");

        assert!(pairs.is_empty());
    }

    #[test]
    fn test_extraction_is_idempotent() {
        let text = "Q: A?\nA: B\n\nQ: C?\nA: D\n\n";

        assert_eq!(extract_pairs(text), extract_pairs(text));
    }

    #[test]
    fn test_question_may_span_lines() {
        let text = "Q: What does\nthe fox say?\nA: ring-ding-ding\n\n";
        let pairs = extract_pairs(text);

        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].question, "What does\nthe fox say?");
    }

    #[test]
    fn test_surrounding_prose_ignored() {
        let text = "Here are your cards:\n\nQ: Capital of France?\nA: Paris\n\nEnjoy!\n";
        let pairs = extract_pairs(text);

        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].answer, "Paris");
    }
}
