//! Intent classification
//!
//! Questions are routed by an ordered table of keyword rules. The first
//! rule whose predicate matches wins, so a question that mentions
//! "yesterday" is a daily summary even if it also asks "why".

use super::types::Intent;

/// One row of the routing table
pub struct IntentRule {
    pub intent: Intent,
    pub matches: fn(&str) -> bool,
}

/// Routing table, evaluated top to bottom against lowercased text
pub const INTENT_RULES: &[IntentRule] = &[
    IntentRule {
        intent: Intent::DailySummary,
        matches: |t: &str| contains_any(t, &["yesterday", "today", "sales perform"]),
    },
    IntentRule {
        intent: Intent::AnomalyCheck,
        matches: |t: &str| contains_any(t, &["unusual", "weird", "anything happen"]),
    },
    IntentRule {
        intent: Intent::ChangeReason,
        matches: |t: &str| {
            t.contains("why") && contains_any(t, &["drop", "increase", "change"])
        },
    },
    IntentRule {
        intent: Intent::DriverAnalysis,
        matches: |t: &str| {
            t.contains("which") && contains_any(t, &["region", "product", "caused"])
        },
    },
];

/// Classify a question into an intent
pub fn classify_intent(question: &str) -> Intent {
    let text = question.to_lowercase();

    let intent = INTENT_RULES
        .iter()
        .find(|rule| (rule.matches)(&text))
        .map(|rule| rule.intent)
        .unwrap_or(Intent::Unsupported);

    tracing::debug!(intent = intent.as_str(), "Classified question");
    intent
}

pub(crate) fn contains_any(text: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| text.contains(n))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_daily_summary_keywords() {
        assert_eq!(classify_intent("How were sales yesterday?"), Intent::DailySummary);
        assert_eq!(classify_intent("What about TODAY"), Intent::DailySummary);
        assert_eq!(
            classify_intent("How did sales perform last week"),
            Intent::DailySummary
        );
    }

    #[test]
    fn test_anomaly_keywords() {
        assert_eq!(classify_intent("Anything unusual?"), Intent::AnomalyCheck);
        assert_eq!(classify_intent("did anything happen"), Intent::AnomalyCheck);
        assert_eq!(classify_intent("that looks weird"), Intent::AnomalyCheck);
    }

    #[test]
    fn test_change_reason_needs_both_words() {
        assert_eq!(classify_intent("Why did revenue drop?"), Intent::ChangeReason);
        assert_eq!(classify_intent("why the increase"), Intent::ChangeReason);
        assert_eq!(classify_intent("why is this"), Intent::Unsupported);
        assert_eq!(classify_intent("revenue dropped"), Intent::Unsupported);
    }

    #[test]
    fn test_driver_analysis_needs_both_words() {
        assert_eq!(
            classify_intent("Which region drove this?"),
            Intent::DriverAnalysis
        );
        assert_eq!(classify_intent("which one caused it"), Intent::DriverAnalysis);
        assert_eq!(classify_intent("which is best"), Intent::Unsupported);
    }

    #[test]
    fn test_rule_order_daily_summary_beats_change_reason() {
        // Contains rule 1 and rule 3 keywords; rule 1 must win
        assert_eq!(
            classify_intent("Why did revenue drop yesterday?"),
            Intent::DailySummary
        );
    }

    #[test]
    fn test_rule_order_anomaly_beats_driver() {
        assert_eq!(
            classify_intent("which region looks unusual"),
            Intent::AnomalyCheck
        );
    }

    #[test]
    fn test_substring_matching_is_not_tokenized() {
        // "changed" contains "change"
        assert_eq!(classify_intent("why has it changed"), Intent::ChangeReason);
    }

    #[test]
    fn test_unsupported() {
        assert_eq!(classify_intent("forecast next quarter"), Intent::Unsupported);
        assert_eq!(classify_intent(""), Intent::Unsupported);
    }
}
