//! Pattern helpers for the listing search and the related-posts lookup.

/// Builds an ILIKE pattern matching `term` anywhere in a column. `%`, `_` and the
/// escape character itself are matched literally.
pub fn contains_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for ch in term.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

/// Turns a post title into an alternation of its whitespace-separated words, for use
/// with Postgres' case-insensitive `~*` operator. Returns `None` for a blank title.
///
/// Each word is escaped, so a title like "C++ (basics)" cannot produce an invalid
/// expression.
pub fn title_keyword_pattern(title: &str) -> Option<String> {
    let words: Vec<String> = title.split_whitespace().map(regex::escape).collect();

    if words.is_empty() {
        None
    } else {
        Some(words.join("|"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contains_pattern_wraps_term() {
        assert_eq!(contains_pattern("rust"), "%rust%");
    }

    #[test]
    fn contains_pattern_escapes_wildcards() {
        assert_eq!(contains_pattern("100%_done\\"), "%100\\%\\_done\\\\%");
    }

    #[test]
    fn keyword_pattern_joins_words() {
        assert_eq!(
            title_keyword_pattern("Go   Basics\tfor all").as_deref(),
            Some("Go|Basics|for|all")
        );
    }

    #[test]
    fn keyword_pattern_escapes_metacharacters() {
        assert_eq!(
            title_keyword_pattern("C++ (basics)").as_deref(),
            Some(r"C\+\+|\(basics\)")
        );
    }

    #[test]
    fn keyword_pattern_blank_title() {
        assert_eq!(title_keyword_pattern("   "), None);
        assert_eq!(title_keyword_pattern(""), None);
    }

    #[test]
    fn keyword_pattern_is_a_valid_regex() {
        let pattern = title_keyword_pattern("What is [this]? $5 deal").unwrap();
        let re = regex::RegexBuilder::new(&pattern)
            .case_insensitive(true)
            .build()
            .unwrap();
        assert!(re.is_match("THIS deal is great"));
        assert!(!re.is_match("nothing matches"));
    }
}
