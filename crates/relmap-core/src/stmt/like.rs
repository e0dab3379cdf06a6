/// Matches `value` against a SQL `LIKE` pattern, where `%` matches any
/// sequence of characters and `_` matches exactly one.
pub fn like(value: &str, pattern: &str, case_insensitive: bool) -> bool {
    let (value, pattern): (Vec<char>, Vec<char>) = if case_insensitive {
        (
            value.to_lowercase().chars().collect(),
            pattern.to_lowercase().chars().collect(),
        )
    } else {
        (value.chars().collect(), pattern.chars().collect())
    };

    // Iterative matcher with single-star backtracking
    let (mut v, mut p) = (0, 0);
    let mut star: Option<(usize, usize)> = None;

    while v < value.len() {
        match pattern.get(p) {
            Some('%') => {
                star = Some((p, v));
                p += 1;
            }
            Some('_') => {
                v += 1;
                p += 1;
            }
            Some(c) if *c == value[v] => {
                v += 1;
                p += 1;
            }
            _ => match star {
                Some((star_p, star_v)) => {
                    p = star_p + 1;
                    v = star_v + 1;
                    star = Some((star_p, star_v + 1));
                }
                None => return false,
            },
        }
    }

    pattern[p..].iter().all(|c| *c == '%')
}

#[cfg(test)]
mod tests {
    use super::like;

    #[test]
    fn literal() {
        assert!(like("Smith", "Smith", false));
        assert!(!like("Smith", "smith", false));
        assert!(like("Smith", "smith", true));
    }

    #[test]
    fn wildcards() {
        assert!(like("Smith", "Sm%", false));
        assert!(like("Smith", "%ith", false));
        assert!(like("Smith", "%mi%", false));
        assert!(like("Smith", "S_ith", false));
        assert!(like("", "%", false));
        assert!(!like("Smith", "S_th", false));
        assert!(!like("Smith", "%x%", false));
    }

    #[test]
    fn backtracks_over_repeated_prefix() {
        assert!(like("aaab", "%ab", false));
        assert!(like("abcabd", "%abd", false));
        assert!(!like("abcabc", "%abd", false));
    }
}
