//! Search form state and LIKE pattern construction for list views.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::database::queries::search_key;

/// The search box of a list view, pre-filled with the submitted term.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchForm {
    pub initial: BTreeMap<&'static str, String>,
}

impl SearchForm {
    pub fn new(field: &'static str, term: &str) -> Self {
        let mut initial = BTreeMap::new();
        initial.insert(field, term.to_string());
        Self { initial }
    }
}

/// Case-insensitive substring pattern for `LIKE ? ESCAPE '\'` against a
/// folded `*_key` column.
///
/// Wildcards in the user's term match literally. An empty term yields `%%`,
/// which matches every row.
pub fn contains_pattern(term: &str) -> String {
    let folded = search_key(term);
    let mut pattern = String::with_capacity(folded.len() + 2);
    pattern.push('%');
    for ch in folded.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wraps_term_in_wildcards() {
        assert_eq!(contains_pattern("andr"), "%andr%");
        assert_eq!(contains_pattern("Andr"), "%andr%");
        assert_eq!(contains_pattern(""), "%%");
    }

    #[test]
    fn escapes_like_metacharacters() {
        assert_eq!(contains_pattern("50%"), "%50\\%%");
        assert_eq!(contains_pattern("a_b"), "%a\\_b%");
        assert_eq!(contains_pattern("x\\y"), "%x\\\\y%");
    }

    #[test]
    fn folds_non_ascii_case() {
        assert_eq!(contains_pattern("ŠKODA"), "%škoda%");
        assert_eq!(contains_pattern("Ölbach"), "%ölbach%");
    }

    #[test]
    fn search_form_echoes_term() {
        let form = SearchForm::new("name", "BMW");
        assert_eq!(form.initial["name"], "BMW");
        let json = serde_json::to_value(&form).unwrap();
        assert_eq!(json["initial"]["name"], "BMW");
    }
}
