//! Keyword rule tables
//!
//! A [`RuleSet`] is an immutable, explicitly ordered list of [`KeywordRule`]s plus
//! an optional [`SpamRule`] that is evaluated before all of them. Terms and
//! sender patterns are normalized to lowercase on construction so matching is
//! always case-insensitive.

/// Label applied by the spam policy unless configured otherwise
pub const DEFAULT_SPAM_LABEL: &str = "Spam";

/// Built-in content rules, in evaluation order
pub const DEFAULT_LABEL_KEYWORDS: &[(&str, &[&str])] = &[
    ("Jobs", &["job", "opportunity", "hiring", "career", "placement", "offer"]),
    ("Internships", &["internship", "training", "intern"]),
    (
        "Hackathons",
        &["hackathon", "unstop", "devpost", "solution", "submission", "winner"],
    ),
    ("Interviews", &["interview", "shortlisted", "selected", "round"]),
    ("Results", &["result", "qualified", "merit", "score", "ranking"]),
    (
        "Companies",
        &["MongoDB", "Google", "Microsoft", "Infosys", "TCS", "Wipro", "LinkedIn"],
    ),
];

/// Built-in spam subject keywords
pub const DEFAULT_SPAM_KEYWORDS: &[&str] = &[
    "win",
    "prize",
    "congratulations",
    "gift",
    "click",
    "free",
    "claim",
    "offer",
    "credit",
    "loan",
    "bonus",
    "cheap",
    "urgent",
    "guaranteed",
    "bitcoin",
    "hot deal",
];

/// Built-in spam sender fragments, matched against the whole `From` header
pub const DEFAULT_SPAM_SENDERS: &[&str] = &[
    "@loan",
    "@promo",
    ".xyz",
    "@click",
    "@maildeal",
    "@noreply.cash",
];

/// Lowercase, drop empties and duplicates, keep first-seen order
fn normalize_terms<I, S>(terms: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut normalized: Vec<String> = Vec::new();
    for term in terms {
        let term = term.as_ref().to_lowercase();
        if !term.is_empty() && !normalized.contains(&term) {
            normalized.push(term);
        }
    }
    normalized
}

fn first_contained<'a>(needles: &'a [String], haystack_lower: &str) -> Option<&'a str> {
    needles
        .iter()
        .find(|needle| haystack_lower.contains(needle.as_str()))
        .map(String::as_str)
}

/// A label together with the subject terms that select it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordRule {
    label: String,
    terms: Vec<String>,
}

impl KeywordRule {
    pub fn new<I, S>(label: impl Into<String>, terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            label: label.into(),
            terms: normalize_terms(terms),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Lowercased terms in declaration order
    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    /// Returns the first term that occurs anywhere in `text`, ignoring case
    pub fn find_match(&self, text: &str) -> Option<&str> {
        first_contained(&self.terms, &text.to_lowercase())
    }

    pub(crate) fn find_match_lowercase(&self, text_lower: &str) -> Option<&str> {
        first_contained(&self.terms, text_lower)
    }
}

/// Spam policy: subject keywords plus sender fragments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpamRule {
    keywords: KeywordRule,
    sender_patterns: Vec<String>,
}

impl SpamRule {
    pub fn new<K, KS, P, PS>(label: impl Into<String>, keywords: K, sender_patterns: P) -> Self
    where
        K: IntoIterator<Item = KS>,
        KS: AsRef<str>,
        P: IntoIterator<Item = PS>,
        PS: AsRef<str>,
    {
        Self {
            keywords: KeywordRule::new(label, keywords),
            sender_patterns: normalize_terms(sender_patterns),
        }
    }

    pub fn label(&self) -> &str {
        self.keywords.label()
    }

    pub fn keywords(&self) -> &[String] {
        self.keywords.terms()
    }

    pub fn sender_patterns(&self) -> &[String] {
        &self.sender_patterns
    }

    /// First sender pattern contained in `sender`, ignoring case
    pub fn find_sender_match(&self, sender: &str) -> Option<&str> {
        first_contained(&self.sender_patterns, &sender.to_lowercase())
    }

    /// First spam keyword contained in `subject`, ignoring case
    pub fn find_subject_match(&self, subject: &str) -> Option<&str> {
        self.keywords.find_match(subject)
    }
}

impl Default for SpamRule {
    fn default() -> Self {
        Self::new(DEFAULT_SPAM_LABEL, DEFAULT_SPAM_KEYWORDS, DEFAULT_SPAM_SENDERS)
    }
}

/// Ordered rule table injected into the classifier.
///
/// The spam rule, when present, always runs first; content rules run in the
/// order of `rules` and the first match wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleSet {
    spam: Option<SpamRule>,
    rules: Vec<KeywordRule>,
}

impl RuleSet {
    pub fn new(rules: Vec<KeywordRule>, spam: Option<SpamRule>) -> Self {
        Self { spam, rules }
    }

    /// Built-in content rules without a spam policy
    pub fn without_spam_defaults() -> Self {
        Self::new(default_keyword_rules(), None)
    }

    pub fn with_spam(mut self, spam: SpamRule) -> Self {
        self.spam = Some(spam);
        self
    }

    pub fn without_spam(mut self) -> Self {
        self.spam = None;
        self
    }

    pub fn spam(&self) -> Option<&SpamRule> {
        self.spam.as_ref()
    }

    pub fn rules(&self) -> &[KeywordRule] {
        &self.rules
    }

    /// Every label this table can apply, spam first
    pub fn label_names(&self) -> Vec<&str> {
        self.spam
            .iter()
            .map(SpamRule::label)
            .chain(self.rules.iter().map(KeywordRule::label))
            .collect()
    }
}

impl Default for RuleSet {
    fn default() -> Self {
        Self::without_spam_defaults().with_spam(SpamRule::default())
    }
}

/// The built-in content rules as owned [`KeywordRule`]s
pub fn default_keyword_rules() -> Vec<KeywordRule> {
    DEFAULT_LABEL_KEYWORDS
        .iter()
        .map(|(label, terms)| KeywordRule::new(*label, terms.iter()))
        .collect()
}
