//! SQL statement extraction from raw provider text
//!
//! Provider responses often wrap the statement in commentary or markdown
//! framing. Extraction scans whole lines first and only then looks for a
//! statement embedded mid-text.

/// Statement keywords a resolved query is allowed to begin with.
pub const SQL_KEYWORDS: &[&str] = &[
    "SELECT", "INSERT", "UPDATE", "DELETE", "CREATE", "ALTER", "DROP", "TRUNCATE", "GRANT",
    "REVOKE", "WITH",
];

/// Leading allow-listed keyword of `text`, if any. The keyword must end at
/// a word boundary so `SELECTED ...` does not qualify.
pub fn leading_keyword(text: &str) -> Option<&'static str> {
    let trimmed = text.trim_start();
    for kw in SQL_KEYWORDS {
        let Some(head) = trimmed.get(..kw.len()) else {
            continue;
        };
        if head.eq_ignore_ascii_case(kw) {
            match trimmed[kw.len()..].chars().next() {
                None => return Some(kw),
                Some(c) if !c.is_alphanumeric() && c != '_' => return Some(kw),
                _ => {}
            }
        }
    }
    None
}

/// Whether `sql` starts with an allow-listed statement keyword.
pub fn starts_with_allowed_keyword(sql: &str) -> bool {
    leading_keyword(sql).is_some()
}

/// Scan raw provider text for the first syntactically plausible SQL
/// statement. Returns the statement normalized with a trailing semicolon,
/// or `None` when nothing in the text qualifies.
pub fn extract_sql(text: &str) -> Option<String> {
    // First pass: a whole line beginning with an allow-listed keyword.
    for line in text.lines() {
        let trimmed = line.trim();
        if leading_keyword(trimmed).is_some() {
            return Some(terminate(trimmed));
        }
    }

    // Second pass: a statement embedded anywhere, keyword to first semicolon.
    embedded_statement(text).map(|s| terminate(s.trim()))
}

fn terminate(sql: &str) -> String {
    if sql.ends_with(';') {
        sql.to_string()
    } else {
        format!("{};", sql)
    }
}

fn embedded_statement(text: &str) -> Option<&str> {
    for (idx, _) in text.char_indices() {
        if idx > 0 {
            // Keyword must start at a word boundary.
            let prev = text[..idx].chars().next_back().unwrap_or(' ');
            if prev.is_alphanumeric() || prev == '_' {
                continue;
            }
        }
        if leading_keyword(&text[idx..]).is_some() {
            if let Some(end) = text[idx..].find(';') {
                return Some(&text[idx..idx + end + 1]);
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_qualifying_line() {
        let text = "Claro, aquí tienes la consulta:\nSELECT COUNT(*) FROM employees\nEspero que sirva.";
        assert_eq!(
            extract_sql(text).as_deref(),
            Some("SELECT COUNT(*) FROM employees;")
        );
    }

    #[test]
    fn test_keeps_existing_semicolon() {
        assert_eq!(
            extract_sql("SELECT * FROM contacts;").as_deref(),
            Some("SELECT * FROM contacts;")
        );
    }

    #[test]
    fn test_case_insensitive_keyword() {
        assert_eq!(
            extract_sql("select id from items").as_deref(),
            Some("select id from items;")
        );
    }

    #[test]
    fn test_markdown_fenced_statement() {
        let text = "```sql\nSELECT name FROM employees;\n```";
        assert_eq!(
            extract_sql(text).as_deref(),
            Some("SELECT name FROM employees;")
        );
    }

    #[test]
    fn test_embedded_statement() {
        let text = "La consulta es SELECT * FROM documents WHERE type = 'invoice'; y nada más.";
        assert_eq!(
            extract_sql(text).as_deref(),
            Some("SELECT * FROM documents WHERE type = 'invoice';")
        );
    }

    #[test]
    fn test_no_keyword_is_rejected() {
        assert_eq!(extract_sql("No puedo generar esa consulta."), None);
    }

    #[test]
    fn test_keyword_prefix_of_word_is_rejected() {
        assert_eq!(extract_sql("SELECTED items were removed."), None);
        assert!(!starts_with_allowed_keyword("WITHDRAWAL complete"));
    }

    #[test]
    fn test_with_statement_is_allowed() {
        assert!(starts_with_allowed_keyword(
            "WITH t AS (SELECT 1) SELECT * FROM t;"
        ));
    }
}
