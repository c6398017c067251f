use std::collections::HashSet;

use crate::normalize::label_key;

/// Character trigram set for a label, the substitute "embedding" used by
/// canonical slot discovery (spec §4.5) when no real embedding model is
/// configured. Short labels (<3 chars) degrade to the whole normalized
/// string as their single "trigram".
pub fn trigram_set(label: &str) -> HashSet<String> {
    let key = label_key(label);
    let chars: Vec<char> = key.chars().collect();
    if chars.len() < 3 {
        let mut set = HashSet::new();
        if !key.is_empty() {
            set.insert(key);
        }
        return set;
    }
    chars
        .windows(3)
        .map(|w| w.iter().collect::<String>())
        .collect()
}

/// Jaccard similarity over trigram sets, `[0, 1]`. Exact-label matches
/// always score 1.0 (the minimal "no embedding model" implementation
/// spec §4.5 requires: exact matching is a degenerate case of this
/// function, not a separate code path).
pub fn label_similarity(a: &str, b: &str) -> f64 {
    if label_key(a) == label_key(b) {
        return 1.0;
    }
    let sa = trigram_set(a);
    let sb = trigram_set(b);
    if sa.is_empty() || sb.is_empty() {
        return 0.0;
    }
    let intersection = sa.intersection(&sb).count() as f64;
    let union = sa.union(&sb).count() as f64;
    if union == 0.0 {
        0.0
    } else {
        intersection / union
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_labels_score_one() {
        assert_eq!(label_similarity("Quality", "quality"), 1.0);
    }

    #[test]
    fn near_paraphrases_score_high_but_not_one() {
        let score = label_similarity("creamy texture", "creamy textures");
        assert!(score > 0.7 && score < 1.0, "score was {score}");
    }

    #[test]
    fn unrelated_labels_score_low() {
        let score = label_similarity("creamy texture", "price point");
        assert!(score < 0.2, "score was {score}");
    }
}
