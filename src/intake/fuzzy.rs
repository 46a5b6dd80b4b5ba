//! Edit-distance matching for free-typed answers.
//!
//! Distances are counted in Unicode scalar values, so Thai vowel and tone
//! marks each count as one character. Callers normalize text before
//! matching; nothing here folds case.

/// Default accepted distance for every close-match check.
pub const DEFAULT_THRESHOLD: usize = 2;

/// Levenshtein distance: insert, delete and substitute each cost 1.
pub fn levenshtein(a: &str, b: &str) -> usize {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();

    if a_chars.is_empty() {
        return b_chars.len();
    }
    if b_chars.is_empty() {
        return a_chars.len();
    }

    // Two rolling rows of the DP matrix.
    let mut prev: Vec<usize> = (0..=b_chars.len()).collect();
    let mut curr = vec![0; b_chars.len() + 1];

    for (i, ca) in a_chars.iter().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b_chars.iter().enumerate() {
            let cost = usize::from(ca != cb);
            curr[j + 1] = (prev[j + 1] + 1) // deletion
                .min(curr[j] + 1) // insertion
                .min(prev[j] + cost); // substitution
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b_chars.len()]
}

/// True iff `input` is within `threshold` edits of any candidate.
pub fn is_close_match(input: &str, candidates: &[&str], threshold: usize) -> bool {
    candidates
        .iter()
        .any(|candidate| levenshtein(input, candidate) <= threshold)
}

/// Edits tolerated against `candidate`: one per three characters, capped
/// at `threshold`. Keywords shorter than three characters match exactly or
/// not at all.
pub fn scaled_threshold(candidate: &str, threshold: usize) -> usize {
    (candidate.chars().count() / 3).min(threshold)
}

/// Like [`is_close_match`], but each candidate uses its own
/// [`scaled_threshold`].
pub fn is_close_match_scaled(input: &str, candidates: &[&str], threshold: usize) -> bool {
    candidates.iter().any(|candidate| {
        levenshtein(input, candidate) <= scaled_threshold(candidate, threshold)
    })
}

/// The single nearest candidate and its distance. Ties go to the earlier
/// candidate.
pub fn nearest<'a>(input: &str, candidates: &[&'a str]) -> Option<(&'a str, usize)> {
    candidates
        .iter()
        .map(|candidate| (*candidate, levenshtein(input, candidate)))
        .min_by_key(|(_, distance)| *distance)
}

/// The nearest candidate, accepted only within `threshold`.
pub fn closest_match<'a>(input: &str, candidates: &[&'a str], threshold: usize) -> Option<&'a str> {
    nearest(input, candidates)
        .filter(|(_, distance)| *distance <= threshold)
        .map(|(candidate, _)| candidate)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn levenshtein_basics() {
        assert_eq!(levenshtein("reset", "reset"), 0);
        assert_eq!(levenshtein("rest", "reset"), 1);
        assert_eq!(levenshtein("kitten", "sitting"), 3);
        assert_eq!(levenshtein("", "abc"), 3);
        assert_eq!(levenshtein("abc", ""), 3);
    }

    #[test]
    fn levenshtein_is_symmetric() {
        for (a, b) in [("done", "none"), ("flaw", "lawn"), ("ภูเก็ต", "ภูเกต")] {
            assert_eq!(levenshtein(a, b), levenshtein(b, a));
        }
    }

    #[test]
    fn levenshtein_counts_thai_marks_as_characters() {
        // Dropping the tone mark is a single deletion.
        assert_eq!(levenshtein("ภูเก็ต", "ภูเกต"), 1);
        assert_eq!(levenshtein("กรุงเทพ", "กรงเทพ"), 1);
    }

    #[test]
    fn close_match_within_threshold() {
        assert!(is_close_match("rest", &["reset"], DEFAULT_THRESHOLD));
        assert!(is_close_match("rset", &["reset"], DEFAULT_THRESHOLD));
        assert!(!is_close_match("xyz", &["reset"], DEFAULT_THRESHOLD));
    }

    #[test]
    fn close_match_any_candidate() {
        assert!(is_close_match("stat", &["reset", "start"], DEFAULT_THRESHOLD));
        assert!(!is_close_match("stat", &[], DEFAULT_THRESHOLD));
    }

    #[test]
    fn scaled_threshold_shrinks_for_short_keywords() {
        assert_eq!(scaled_threshold("no", DEFAULT_THRESHOLD), 0);
        assert_eq!(scaled_threshold("มี", DEFAULT_THRESHOLD), 0);
        assert_eq!(scaled_threshold("yes", DEFAULT_THRESHOLD), 1);
        assert_eq!(scaled_threshold("ไม่มี", DEFAULT_THRESHOLD), 1);
        assert_eq!(scaled_threshold("สูบบุหรี่", DEFAULT_THRESHOLD), 2);
    }

    #[test]
    fn scaled_match_rejects_short_noise() {
        for input in ["x", "ok", "55", "ไม่"] {
            assert!(
                !is_close_match_scaled(input, &["yes", "มี", "no", "ไม่มี"], DEFAULT_THRESHOLD),
                "{input:?} should not match"
            );
        }
        assert!(is_close_match_scaled("yess", &["yes"], DEFAULT_THRESHOLD));
        assert!(is_close_match_scaled("ไมมี", &["ไม่มี"], DEFAULT_THRESHOLD));
    }

    #[test]
    fn nearest_prefers_minimum_distance() {
        let candidates = ["bangkok", "phuket", "chiang mai"];
        assert_eq!(nearest("phuket", &candidates), Some(("phuket", 0)));
        assert_eq!(nearest("bankok", &candidates), Some(("bangkok", 1)));
        assert_eq!(nearest("x", &[]), None);
    }

    #[test]
    fn closest_match_respects_threshold() {
        let candidates = ["bangkok", "phuket"];
        assert_eq!(closest_match("bangkk", &candidates, 2), Some("bangkok"));
        assert_eq!(closest_match("tokyo", &candidates, 2), None);
    }
}
