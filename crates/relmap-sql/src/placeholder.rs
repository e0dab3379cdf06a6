//! Scanning and rewriting of backend-neutral `?` placeholders.
//!
//! Question marks inside quoted string literals and quoted identifiers are
//! not placeholders.

/// Native placeholder syntax of a backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flavor {
    /// `$1, $2, ...`
    Postgresql,

    /// `?1, ?2, ...`
    Sqlite,
}

/// Number of `?` placeholders in `sql`.
pub fn count(sql: &str) -> usize {
    positions(sql).len()
}

/// Rewrites every `?` placeholder into the numbered syntax of `flavor`.
pub fn rewrite(sql: &str, flavor: Flavor) -> String {
    let mut dst = String::with_capacity(sql.len() + 8);
    let mut last = 0;

    for (n, pos) in positions(sql).into_iter().enumerate() {
        dst.push_str(&sql[last..pos]);

        match flavor {
            Flavor::Postgresql => dst.push('$'),
            Flavor::Sqlite => dst.push('?'),
        }

        dst.push_str(&(n + 1).to_string());
        last = pos + 1;
    }

    dst.push_str(&sql[last..]);
    dst
}

/// Byte offsets of the placeholders in `sql`.
fn positions(sql: &str) -> Vec<usize> {
    let mut positions = vec![];
    let mut quote: Option<char> = None;

    for (i, c) in sql.char_indices() {
        match quote {
            // A doubled quote closes and reopens the literal in one step
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None if c == '\'' || c == '"' => quote = Some(c),
            None if c == '?' => positions.push(i),
            None => {}
        }
    }

    positions
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_placeholders() {
        assert_eq!(count("SELECT 1"), 0);
        assert_eq!(count("SELECT * FROM t WHERE a = ? AND b = ?"), 2);
    }

    #[test]
    fn ignores_quoted_question_marks() {
        assert_eq!(count("SELECT '?' FROM \"a?\" WHERE x = ?"), 1);
        assert_eq!(count("SELECT 'it''s ?' WHERE x = ?"), 1);
    }

    #[test]
    fn rewrites_per_flavor() {
        let sql = "UPDATE t SET a = ?, b = '?' WHERE k = ?";

        assert_eq!(
            rewrite(sql, Flavor::Postgresql),
            "UPDATE t SET a = $1, b = '?' WHERE k = $2"
        );
        assert_eq!(
            rewrite(sql, Flavor::Sqlite),
            "UPDATE t SET a = ?1, b = '?' WHERE k = ?2"
        );
    }
}
