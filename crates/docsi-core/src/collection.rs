//! In-memory lookup over one documentation build.
//!
//! This mirrors what a client-side search widget does with the fragment
//! array: case-insensitive keyword matching over titles and text, with no
//! index structure beyond the array itself. The persistent tantivy index
//! in [`crate::index`] is the ranked alternative.

use crate::{Category, Fragment, SearchIndexDocument};
use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;
use serde::Serialize;
use std::collections::BTreeMap;

/// Restricts which fragments a lookup considers.
#[derive(Debug, Clone, Default)]
pub struct Filter {
    /// Only fragments of this role.
    pub category: Option<Category>,
    /// Exact page title.
    pub page: Option<String>,
}

impl Filter {
    fn accepts(&self, fragment: &Fragment) -> bool {
        self.category.is_none_or(|c| c == fragment.category)
            && self.page.as_deref().is_none_or(|p| p == fragment.page)
    }
}

/// A fragment matched by [`Collection::lookup`].
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Match<'a> {
    /// Position in the original array.
    pub ordinal: usize,
    /// The matched fragment.
    pub fragment: &'a Fragment,
    /// Number of query terms found in the title.
    pub title_hits: usize,
}

/// One page of a build, as listed by [`Collection::pages`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageSummary {
    /// Page title.
    pub page: String,
    /// Location path of the first fragment seen for the page.
    pub path: String,
    /// Fragments carrying this page title.
    pub fragments: usize,
}

/// Ordered fragments of one build, with lowercase copies for matching.
pub struct Collection {
    fragments: Vec<Fragment>,
    folded: Vec<(String, String)>,
}

impl Collection {
    /// Take ownership of a build's fragments.
    #[must_use]
    pub fn new(document: SearchIndexDocument) -> Self {
        let folded = document
            .docs
            .iter()
            .map(|f| (f.title.to_lowercase(), f.text.to_lowercase()))
            .collect();
        Self {
            fragments: document.docs,
            folded,
        }
    }

    /// Fragments in document order.
    #[must_use]
    pub fn fragments(&self) -> &[Fragment] {
        &self.fragments
    }

    /// Number of fragments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    /// Whether the build has no fragments.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    /// Keyword lookup: every whitespace-separated term must appear in the
    /// title or the text. Title matches sort first; otherwise array order
    /// is kept.
    #[must_use]
    pub fn lookup(&self, query: &str, filter: &Filter) -> Vec<Match<'_>> {
        let terms: Vec<String> = query.split_whitespace().map(str::to_lowercase).collect();
        if terms.is_empty() {
            return Vec::new();
        }

        let mut matches: Vec<Match<'_>> = self
            .fragments
            .iter()
            .zip(&self.folded)
            .enumerate()
            .filter(|(_, (fragment, _))| filter.accepts(fragment))
            .filter_map(|(ordinal, (fragment, (title, text)))| {
                let mut title_hits = 0;
                for term in &terms {
                    if title.contains(term.as_str()) {
                        title_hits += 1;
                    } else if !text.contains(term.as_str()) {
                        return None;
                    }
                }
                Some(Match {
                    ordinal,
                    fragment,
                    title_hits,
                })
            })
            .collect();

        matches.sort_by(|a, b| b.title_hits.cmp(&a.title_hits));
        matches
    }

    /// Distinct page titles in first-seen order.
    #[must_use]
    pub fn pages(&self) -> Vec<PageSummary> {
        let mut pages: Vec<PageSummary> = Vec::new();
        for fragment in &self.fragments {
            if let Some(existing) = pages.iter_mut().find(|p| p.page == fragment.page) {
                existing.fragments += 1;
            } else {
                pages.push(PageSummary {
                    page: fragment.page.clone(),
                    path: fragment.path().to_string(),
                    fragments: 1,
                });
            }
        }
        pages
    }

    /// Fragments at `location`. A location without `#` also matches every
    /// anchor on that page.
    #[must_use]
    pub fn by_location(&self, location: &str) -> Vec<&Fragment> {
        let whole_page = !location.contains('#');
        self.fragments
            .iter()
            .filter(|f| f.location == location || (whole_page && f.path() == location))
            .collect()
    }

    /// Page titles that look like `name`, best first.
    #[must_use]
    pub fn suggest_pages(&self, name: &str, limit: usize) -> Vec<String> {
        let matcher = SkimMatcherV2::default().ignore_case();
        let mut scored: Vec<(i64, String)> = self
            .pages()
            .into_iter()
            .filter_map(|p| matcher.fuzzy_match(&p.page, name).map(|s| (s, p.page)))
            .collect();
        scored.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.cmp(&b.1)));
        scored.into_iter().take(limit).map(|(_, page)| page).collect()
    }

    /// Fragment count per category, every category present.
    #[must_use]
    pub fn stats(&self) -> BTreeMap<Category, usize> {
        let mut counts: BTreeMap<Category, usize> =
            Category::ALL.into_iter().map(|c| (c, 0)).collect();
        for fragment in &self.fragments {
            *counts.entry(fragment.category).or_default() += 1;
        }
        counts
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::codec;

    fn fixture() -> Collection {
        let parsed = codec::parse(include_str!("../tests/fixtures/search_index.js"))
            .expect("fixture parses");
        Collection::new(parsed.document)
    }

    #[test]
    fn test_lookup_requires_every_term() {
        let collection = fixture();
        let hits = collection.lookup("creep law", &Filter::default());
        assert!(!hits.is_empty());
        for hit in &hits {
            let haystack =
                format!("{} {}", hit.fragment.title, hit.fragment.text).to_lowercase();
            assert!(haystack.contains("creep") && haystack.contains("law"));
        }
    }

    #[test]
    fn test_lookup_ranks_title_hits_first_then_array_order() {
        let collection = fixture();
        let hits = collection.lookup("density", &Filter::default());
        assert!(hits.len() > 2);

        let first_text_only = hits
            .iter()
            .position(|h| h.title_hits == 0)
            .unwrap_or(hits.len());
        assert!(hits[..first_text_only].iter().all(|h| h.title_hits > 0));
        assert!(hits[first_text_only..].iter().all(|h| h.title_hits == 0));

        for window in hits.windows(2) {
            if window[0].title_hits == window[1].title_hits {
                assert!(window[0].ordinal < window[1].ordinal);
            }
        }
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let collection = fixture();
        let lower = collection.lookup("linearviscous", &Filter::default());
        let mixed = collection.lookup("LinearViscous", &Filter::default());
        assert!(!lower.is_empty());
        assert_eq!(
            lower.iter().map(|h| h.ordinal).collect::<Vec<_>>(),
            mixed.iter().map(|h| h.ordinal).collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_lookup_empty_query() {
        let collection = fixture();
        assert!(collection.lookup("", &Filter::default()).is_empty());
        assert!(collection.lookup("   \t", &Filter::default()).is_empty());
    }

    #[test]
    fn test_lookup_with_filters() {
        let collection = fixture();
        let only_types = Filter {
            category: Some(Category::Type),
            page: None,
        };
        let hits = collection.lookup("GeoParams", &only_types);
        assert_eq!(hits.len(), 6);
        assert!(hits.iter().all(|h| h.fragment.category == Category::Type));

        let plotting = Filter {
            category: None,
            page: Some("Plotting".into()),
        };
        let hits = collection.lookup("plot", &plotting);
        assert!(!hits.is_empty());
        assert!(hits.iter().all(|h| h.fragment.page == "Plotting"));
    }

    #[test]
    fn test_pages_in_first_seen_order() {
        let pages = fixture().pages();
        let names: Vec<_> = pages.iter().map(|p| p.page.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "Plotting",
                "Nondimensionalization",
                "Material Parameters",
                "Contributing",
                "List of functions",
                "Home"
            ]
        );
        assert_eq!(pages.iter().map(|p| p.fragments).sum::<usize>(), 70);
        assert_eq!(pages[0].path, "man/plotting/");
    }

    #[test]
    fn test_by_location_exact_and_whole_page() {
        let collection = fixture();
        let exact = collection.by_location("man/plotting/#Plot-CreepLaws");
        assert_eq!(exact.len(), 1);
        assert_eq!(exact[0].title, "Plot CreepLaws");

        let page = collection.by_location("man/plotting/");
        assert_eq!(page.len(), 5);

        let home = collection.by_location("");
        assert_eq!(home.len(), 4);
        assert!(collection.by_location("man/missing/").is_empty());
    }

    #[test]
    fn test_suggest_pages_for_typos() {
        let suggestions = fixture().suggest_pages("nondim", 3);
        assert_eq!(suggestions.first().map(String::as_str), Some("Nondimensionalization"));
        assert!(fixture().suggest_pages("zzzz", 3).is_empty());
    }

    #[test]
    fn test_stats_sum_to_len() {
        let collection = fixture();
        let stats = collection.stats();
        assert_eq!(stats.values().sum::<usize>(), collection.len());
        assert_eq!(stats[&Category::Function], 14);
    }
}
