use std::cmp::Ordering;

/// Compare two strings case-insensitively, with the empty string sorting
/// after every non-empty one.
pub fn compare_tier(a: &str, b: &str) -> Ordering {
    match (a.is_empty(), b.is_empty()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => a
            .chars()
            .flat_map(char::to_lowercase)
            .cmp(b.chars().flat_map(char::to_lowercase)),
    }
}

/// Compare tier by tier, the first difference deciding.
pub fn compare_tiers(a: &[&str], b: &[&str]) -> Ordering {
    a.iter()
        .zip(b)
        .map(|(a, b)| compare_tier(a, b))
        .find(|o| o.is_ne())
        .unwrap_or_else(|| a.len().cmp(&b.len()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_sorts_last() {
        assert_eq!(compare_tier("", "a"), Ordering::Greater);
        assert_eq!(compare_tier("z", ""), Ordering::Less);
        assert_eq!(compare_tier("", ""), Ordering::Equal);
    }

    #[test]
    fn test_case_is_ignored() {
        assert_eq!(compare_tier("Api", "api"), Ordering::Equal);
        assert_eq!(compare_tier("beta", "Alpha"), Ordering::Greater);
    }

    #[test]
    fn test_first_differing_tier_decides() {
        assert_eq!(compare_tiers(&["a", "z"], &["b", "a"]), Ordering::Less);
        assert_eq!(compare_tiers(&["a", "", "x"], &["a", "prod", "x"]), Ordering::Greater);
    }

    #[test]
    fn test_ties_keep_input_order() {
        let mut items = vec![("A", 1), ("a", 2), ("", 3), ("A", 4)];
        items.sort_by(|a, b| compare_tiers(&[a.0], &[b.0]));
        assert_eq!(items, vec![("A", 1), ("a", 2), ("A", 4), ("", 3)]);
    }
}
