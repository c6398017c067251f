//! Word-count and keyword heuristics backing the `llm.*` signal family
//! when no live LLM is wired in (spec §4.3 Open Question 1: the output
//! vocabulary is fixed, the mechanism is a placeholder). Grounded on
//! `methodologies/signals/llm/*.py` in the original source.

const POSITIVE_WORDS: &[&str] =
    &["love", "like", "great", "good", "excellent", "enjoy", "prefer", "appreciate"];

const NEGATIVE_WORDS: &[&str] = &[
    "hate", "dislike", "bad", "terrible", "don't", "don t", "cannot", "can't", "can t", "won't",
    "won t", "no",
];

const UNCERTAINTY_WORDS: &[&str] = &[
    "maybe", "perhaps", "possibly", "might", "could be", "not sure", "uncertain", "think",
    "guess", "probably", "somewhat", "kind of", "kinda",
];

const AMBIGUOUS_WORDS: &[&str] =
    &["thing", "something", "anything", "stuff", "whatever", "stuff like that", "and so on", "etc"];

fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// `surface` (<5 words) | `shallow` (<10) | `moderate` (<30) | `deep`
/// (>=30). Spec's four-way vocabulary refines the original's three-way
/// word-count split by splitting its `surface` bucket in two.
pub fn response_depth_label(text: &str) -> &'static str {
    let words = word_count(text);
    if words < 5 {
        "surface"
    } else if words < 10 {
        "shallow"
    } else if words < 30 {
        "moderate"
    } else {
        "deep"
    }
}

/// `positive` | `neutral` | `negative` by keyword count comparison.
pub fn sentiment_label(text: &str) -> &'static str {
    let lower = text.to_lowercase();
    let positive = POSITIVE_WORDS.iter().filter(|w| lower.contains(*w)).count();
    let negative = NEGATIVE_WORDS.iter().filter(|w| lower.contains(*w)).count();
    if positive > negative {
        "positive"
    } else if negative > positive {
        "negative"
    } else {
        "neutral"
    }
}

/// `[0, 1]`: uncertainty keyword hits normalized by response length.
pub fn uncertainty_score(text: &str) -> f64 {
    let lower = text.to_lowercase();
    let words: Vec<&str> = lower.split_whitespace().collect();
    let hits = UNCERTAINTY_WORDS
        .iter()
        .filter(|w| {
            if w.contains(' ') {
                lower.contains(*w)
            } else {
                words.contains(w)
            }
        })
        .count();
    let total = words.len().max(1) as f64;
    (hits as f64 / total).min(1.0)
}

/// `[0, 1]`: ambiguous-word density plus a short-response penalty.
pub fn ambiguity_score(text: &str) -> f64 {
    let lower = text.to_lowercase();
    let hits = AMBIGUOUS_WORDS.iter().filter(|w| lower.contains(*w)).count();
    let words = word_count(text).max(1) as f64;
    let short_penalty = if word_count(text) < 5 { 1.0 } else { 0.0 };
    ((hits as f64 / words) + short_penalty).min(1.0)
}

/// `none` | `low` | `medium` | `high`, weighted regex-free keyword match
/// (`high` patterns weigh 3x, `medium` 2x, `low` 1x).
pub fn hedging_language_label(text: &str) -> &'static str {
    const HIGH: &[&str] = &[
        "maybe", "perhaps", "possibly", "i guess", "i suppose", "i think", "not sure",
        "not certain", "don't know", "uncertain", "unsure", "it depends", "might be", "could be",
        "may be", "somewhat", "sort of", "kind of", "a little bit", "more or less", "probably",
        "likely", "presumably", "ostensibly",
    ];
    const MEDIUM: &[&str] =
        &["i believe", "i feel", "it seems", "appears to be", "generally", "typically", "usually", "normally", "rather", "quite", "fairly", "i'd say", "i reckon", "i imagine"];
    const LOW: &[&str] = &["basically", "essentially", "fundamentally", "mostly", "chiefly", "primarily"];

    let lower = text.to_lowercase();
    let count = |patterns: &[&str]| patterns.iter().filter(|p| lower.contains(*p)).count();

    let score = count(HIGH) * 3 + count(MEDIUM) * 2 + count(LOW);
    if score >= 4 {
        "high"
    } else if score >= 2 {
        "medium"
    } else if score >= 1 {
        "low"
    } else {
        "none"
    }
}

/// Causal/purposive connectives — the ones laddering interviews actually
/// turn on ("I like it *because* it's creamy", "*so that* I feel healthy").
const CAUSAL_MARKERS: &[&str] =
    &["because", "since", "so that", "as a result", "which means", "therefore", "due to", "in order to"];

/// Contrast signals a respondent qualifying or walking back a prior claim.
const CONTRASTIVE_MARKERS: &[&str] = &["but", "however", "although", "even though", "whereas"];

/// Additive connectives chain a new claim onto the previous one.
const ADDITIVE_MARKERS: &[&str] = &["also", "moreover", "in addition", "furthermore"];

/// Stage 2.5 SRL preprocessing (spec §4.8): a lightweight keyword/regex
/// scan for discourse connectives, not a real semantic-role-labeling
/// model. Returns the distinct marker strings found, in table order.
pub fn discourse_markers(text: &str) -> Vec<String> {
    let lower = text.to_lowercase();
    let mut found = Vec::new();
    for marker in CAUSAL_MARKERS.iter().chain(CONTRASTIVE_MARKERS).chain(ADDITIVE_MARKERS) {
        if lower.contains(marker) && !found.iter().any(|m: &String| m == marker) {
            found.push(marker.to_string());
        }
    }
    found
}
