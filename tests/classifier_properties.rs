//! Property tests for keyword classification

use gmail_triage::classifier::{KeywordClassifier, MatchReason};
use gmail_triage::models::Message;
use gmail_triage::rules::{KeywordRule, RuleSet};
use proptest::prelude::*;

fn two_rule_classifier() -> KeywordClassifier {
    KeywordClassifier::new(RuleSet::new(
        vec![
            KeywordRule::new("Alpha", ["alpha"]),
            KeywordRule::new("Bravo", ["bravo"]),
        ],
        None,
    ))
}

fn label_for(classifier: &KeywordClassifier, sender: &str, subject: &str) -> Option<String> {
    classifier
        .classify(&Message::new("p1", sender, subject))
        .map(|c| c.label)
}

proptest! {
    #[test]
    fn earlier_rule_always_wins(
        prefix in "[a-z ]{0,12}",
        middle in "[a-z ]{0,12}",
        suffix in "[a-z ]{0,12}",
        bravo_first in any::<bool>(),
    ) {
        let (first, second) = if bravo_first { ("bravo", "alpha") } else { ("alpha", "bravo") };
        let subject = format!("{}{}{}{}{}", prefix, first, middle, second, suffix);

        let label = label_for(&two_rule_classifier(), "someone@example.com", &subject);
        prop_assert_eq!(label.as_deref(), Some("Alpha"));
    }

    #[test]
    fn label_follows_rule_order(subject in "[a-z ]{0,40}") {
        let expected = if subject.contains("alpha") {
            Some("Alpha")
        } else if subject.contains("bravo") {
            Some("Bravo")
        } else {
            None
        };

        let label = label_for(&two_rule_classifier(), "someone@example.com", &subject);
        prop_assert_eq!(label.as_deref(), expected);
    }

    #[test]
    fn matching_ignores_case(
        sender in "[a-zA-Z@. ]{0,24}",
        subject in "[a-zA-Z ]{0,40}",
    ) {
        let classifier = KeywordClassifier::default();

        let original = label_for(&classifier, &sender, &subject);
        let upper = label_for(&classifier, &sender.to_uppercase(), &subject.to_uppercase());
        let lower = label_for(&classifier, &sender.to_lowercase(), &subject.to_lowercase());

        prop_assert_eq!(&original, &upper);
        prop_assert_eq!(&original, &lower);
    }

    #[test]
    fn spam_sender_overrides_any_subject(
        local in "[a-z]{1,10}",
        subject in "[a-zA-Z ]{0,40}",
    ) {
        let sender = format!("{}@promo.example", local);
        let classification = KeywordClassifier::default()
            .classify(&Message::new("p1", sender.as_str(), subject.as_str()))
            .expect("spam sender always classifies");

        prop_assert_eq!(classification.label.as_str(), "Spam");
        prop_assert_eq!(classification.reason, MatchReason::SpamSender("@promo".to_string()));
    }

    #[test]
    fn label_comes_from_rule_table(
        sender in "[a-z@.]{0,24}",
        subject in "[a-zA-Z ]{0,60}",
    ) {
        let rules = RuleSet::default();
        let names: Vec<String> = rules.label_names().iter().map(|s| s.to_string()).collect();
        let classifier = KeywordClassifier::new(rules);

        if let Some(label) = label_for(&classifier, &sender, &subject) {
            prop_assert!(names.contains(&label));
        }
    }
}
