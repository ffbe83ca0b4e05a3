//! Text matching shared by the repository search methods.
//!
//! SQLite's `LOWER` and `LIKE` only fold ASCII letters, so candidate rows are
//! fetched with the structured filters applied in SQL and the text match runs
//! here, with both sides lowercased the same way.

/// A trimmed, lowercased search needle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchTerm {
    needle: String,
}

impl SearchTerm {
    pub fn new(query: &str) -> Self {
        Self {
            needle: query.trim().to_lowercase(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.needle.is_empty()
    }

    /// True when any field contains the needle. An empty needle matches everything.
    pub fn matches_any<'a, I>(&self, fields: I) -> bool
    where
        I: IntoIterator<Item = &'a str>,
    {
        self.is_empty()
            || fields
                .into_iter()
                .any(|field| field.to_lowercase().contains(&self.needle))
    }
}

/// One page of search hits together with the number of hits overall.
#[derive(Debug, Clone)]
pub struct SearchPage<T> {
    pub items: Vec<T>,
    pub total: i64,
}

impl<T> SearchPage<T> {
    pub(crate) fn from_hits(hits: Vec<T>, limit: i64, offset: i64) -> Self {
        let total = i64::try_from(hits.len()).unwrap_or(i64::MAX);
        let skip = usize::try_from(offset.max(0)).unwrap_or(usize::MAX);
        let take = usize::try_from(limit.max(0)).unwrap_or(usize::MAX);
        Self {
            items: hits.into_iter().skip(skip).take(take).collect(),
            total,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn folds_non_ascii_letters_on_both_sides() {
        let term = SearchTerm::new("  ÉLODIE ");
        assert!(term.matches_any(["Élodie Martin"]));
        assert!(SearchTerm::new("élodie").matches_any(["ÉLODIE"]));
        assert!(SearchTerm::new("ÇA").matches_any(["", "ça va"]));
        assert!(!term.matches_any(["Elodie"]));
    }

    #[test]
    fn wildcard_characters_are_literal() {
        let term = SearchTerm::new("100%");
        assert!(!term.matches_any(["1000 stitches"]));
        assert!(term.matches_any(["give 100% effort"]));
        assert!(!SearchTerm::new("a_c").matches_any(["abc"]));
    }

    #[test]
    fn empty_needle_matches_everything() {
        assert!(SearchTerm::new("   ").matches_any(std::iter::empty()));
    }

    #[test]
    fn pages_keep_the_overall_total() {
        let page = SearchPage::from_hits((1..=25).collect::<Vec<_>>(), 10, 20);
        assert_eq!(page.items, vec![21, 22, 23, 24, 25]);
        assert_eq!(page.total, 25);

        let past_end = SearchPage::from_hits(vec![1, 2], 10, 10);
        assert!(past_end.items.is_empty());
        assert_eq!(past_end.total, 2);
    }
}
