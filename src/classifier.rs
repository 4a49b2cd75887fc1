//! Keyword classifier with spam precedence and first-match-wins ordering

use crate::models::Message;
use crate::rules::RuleSet;
use serde::Serialize;
use std::fmt;

/// Why a message was assigned its label
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum MatchReason {
    /// A spam sender fragment occurs in the `From` header
    SpamSender(String),
    /// A spam keyword occurs in the subject
    SpamKeyword(String),
    /// A content rule keyword occurs in the subject
    Keyword(String),
}

impl MatchReason {
    pub fn is_spam(&self) -> bool {
        matches!(self, MatchReason::SpamSender(_) | MatchReason::SpamKeyword(_))
    }
}

impl fmt::Display for MatchReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchReason::SpamSender(pattern) => write!(f, "spam sender pattern '{}'", pattern),
            MatchReason::SpamKeyword(term) => write!(f, "spam keyword '{}'", term),
            MatchReason::Keyword(term) => write!(f, "keyword '{}'", term),
        }
    }
}

/// The single label chosen for a message
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Classification {
    pub message_id: String,
    pub label: String,
    pub reason: MatchReason,
}

/// Classifies messages against an injected [`RuleSet`]
#[derive(Debug, Clone)]
pub struct KeywordClassifier {
    rules: RuleSet,
}

impl KeywordClassifier {
    pub fn new(rules: RuleSet) -> Self {
        Self { rules }
    }

    /// Pick at most one label for `message`.
    ///
    /// The spam policy is checked first (sender fragments, then subject
    /// keywords) and short-circuits everything else. Content rules are then
    /// tried in declaration order against the subject only. `None` means the
    /// message stays unlabeled.
    pub fn classify(&self, message: &Message) -> Option<Classification> {
        if let Some(spam) = self.rules.spam() {
            let reason = spam
                .find_sender_match(&message.sender)
                .map(|p| MatchReason::SpamSender(p.to_string()))
                .or_else(|| {
                    spam.find_subject_match(&message.subject)
                        .map(|k| MatchReason::SpamKeyword(k.to_string()))
                });

            if let Some(reason) = reason {
                return Some(Classification {
                    message_id: message.id.clone(),
                    label: spam.label().to_string(),
                    reason,
                });
            }
        }

        let subject = message.subject.to_lowercase();
        self.rules.rules().iter().find_map(|rule| {
            rule.find_match_lowercase(&subject).map(|term| Classification {
                message_id: message.id.clone(),
                label: rule.label().to_string(),
                reason: MatchReason::Keyword(term.to_string()),
            })
        })
    }
}

impl Default for KeywordClassifier {
    fn default() -> Self {
        Self::new(RuleSet::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NO_SENDER;
    use crate::rules::{KeywordRule, SpamRule};

    fn msg(sender: &str, subject: &str) -> Message {
        Message::new("m1", sender, subject)
    }

    fn label_of(classifier: &KeywordClassifier, sender: &str, subject: &str) -> Option<String> {
        classifier.classify(&msg(sender, subject)).map(|c| c.label)
    }

    #[test]
    fn test_first_declared_rule_wins() {
        let rules = RuleSet::new(
            vec![
                KeywordRule::new("Internships", ["internship", "intern"]),
                KeywordRule::new("Jobs", ["job", "opportunity"]),
                KeywordRule::new("Companies", ["google"]),
            ],
            None,
        );
        let classifier = KeywordClassifier::new(rules);

        let result = classifier
            .classify(&msg("hr@google.com", "Internship opportunity at Google"))
            .unwrap();
        assert_eq!(result.label, "Internships");
        assert_eq!(result.reason, MatchReason::Keyword("internship".to_string()));
    }

    #[test]
    fn test_default_table_order_prefers_jobs() {
        let classifier = KeywordClassifier::new(RuleSet::without_spam_defaults());
        assert_eq!(
            label_of(&classifier, "hr@google.com", "Internship opportunity at Google"),
            Some("Jobs".to_string())
        );
    }

    #[test]
    fn test_spam_takes_precedence_over_content_rules() {
        let classifier = KeywordClassifier::default();
        let result = classifier
            .classify(&msg("deals@promo.xyz", "You are a winner!"))
            .unwrap();
        assert_eq!(result.label, "Spam");
        assert!(result.reason.is_spam());
        assert_eq!(result.reason, MatchReason::SpamSender("@promo".to_string()));
    }

    #[test]
    fn test_spam_keyword_in_subject() {
        let classifier = KeywordClassifier::default();
        // "offer" is both a Jobs term and a spam term
        let result = classifier
            .classify(&msg("hr@company.com", "Your job offer"))
            .unwrap();
        assert_eq!(result.label, "Spam");
        assert_eq!(result.reason, MatchReason::SpamKeyword("offer".to_string()));
    }

    #[test]
    fn test_without_spam_policy_content_rules_apply() {
        let classifier = KeywordClassifier::new(RuleSet::default().without_spam());
        assert_eq!(
            label_of(&classifier, "deals@promo.xyz", "You are a winner!"),
            Some("Hackathons".to_string())
        );
    }

    #[test]
    fn test_sender_is_not_matched_against_content_rules() {
        let rules = RuleSet::new(vec![KeywordRule::new("Companies", ["google"])], None);
        let classifier = KeywordClassifier::new(rules);
        assert_eq!(label_of(&classifier, "hr@google.com", "Hello there"), None);
    }

    #[test]
    fn test_case_insensitive_matching() {
        let rules = RuleSet::new(vec![KeywordRule::new("Jobs", ["job"])], None);
        let classifier = KeywordClassifier::new(rules);
        assert_eq!(
            label_of(&classifier, "a@b.com", "JOB Opening"),
            Some("Jobs".to_string())
        );
    }

    #[test]
    fn test_no_match_leaves_message_unlabeled() {
        let classifier = KeywordClassifier::default();
        assert_eq!(label_of(&classifier, "mom@family.org", "Dinner on Sunday"), None);
    }

    #[test]
    fn test_sentinel_sender_classifies_without_error() {
        let classifier = KeywordClassifier::default();
        let message = Message::from_headers("m9", vec![("Subject", "Interview schedule")]);
        assert_eq!(message.sender, NO_SENDER);

        let result = classifier.classify(&message).unwrap();
        assert_eq!(result.label, "Interviews");
        assert_eq!(result.message_id, "m9");
    }

    #[test]
    fn test_custom_spam_label() {
        let rules = RuleSet::new(vec![], Some(SpamRule::new("Junk", ["lottery"], ["@junk"])));
        let classifier = KeywordClassifier::new(rules);
        assert_eq!(
            label_of(&classifier, "x@junk.example", "Hello"),
            Some("Junk".to_string())
        );
        assert_eq!(
            label_of(&classifier, "x@example.com", "LOTTERY results"),
            Some("Junk".to_string())
        );
    }

    #[test]
    fn test_match_reason_display() {
        assert_eq!(
            MatchReason::SpamSender(".xyz".to_string()).to_string(),
            "spam sender pattern '.xyz'"
        );
        assert_eq!(MatchReason::Keyword("job".to_string()).to_string(), "keyword 'job'");
    }
}
