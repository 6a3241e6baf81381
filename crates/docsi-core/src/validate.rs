//! Structural lint over a decoded search index.
//!
//! Decoding already guarantees the five string fields and a known
//! category. The checks here look for records a search widget would still
//! render poorly: empty titles, headings that cannot be linked to, and so
//! on. Nothing here rejects a document outright; only decoding errors
//! merged in by the caller make a [`Report`] fail.

use crate::{Category, Diagnostic, SearchIndexDocument, Severity};
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};

/// Lint findings plus a summary of what the document contains.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    /// Findings, decoding errors first.
    pub diagnostics: Vec<Diagnostic>,
    /// Fragments in the document.
    pub fragments: usize,
    /// Count per category.
    pub categories: BTreeMap<Category, usize>,
    /// Distinct page titles.
    pub pages: usize,
    /// Distinct location strings.
    pub distinct_locations: usize,
}

impl Report {
    /// False when any diagnostic is an error.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        !self.diagnostics.iter().any(|d| d.severity == Severity::Error)
    }

    /// Diagnostics at exactly `severity`.
    #[must_use]
    pub fn count(&self, severity: Severity) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == severity)
            .count()
    }

    /// Fold decoding diagnostics in ahead of the lint findings.
    pub fn merge_decode_diagnostics(&mut self, mut decoded: Vec<Diagnostic>) {
        decoded.append(&mut self.diagnostics);
        self.diagnostics = decoded;
    }
}

/// Lint `document` and summarize its contents.
pub fn validate(document: &SearchIndexDocument) -> Report {
    let mut report = Report {
        fragments: document.len(),
        categories: Category::ALL.into_iter().map(|c| (c, 0)).collect(),
        ..Report::default()
    };

    let mut pages = HashSet::new();
    let mut locations = HashSet::new();

    for (i, fragment) in document.docs.iter().enumerate() {
        *report.categories.entry(fragment.category).or_default() += 1;
        pages.insert(fragment.page.as_str());
        locations.insert(fragment.location.as_str());

        let at = Some(i);
        if fragment.title.is_empty() {
            report.diagnostics.push(Diagnostic::warn(at, "title is empty"));
        }
        if fragment.page.is_empty() {
            report.diagnostics.push(Diagnostic::warn(at, "page is empty"));
        }
        if fragment.location.chars().any(char::is_whitespace) {
            report.diagnostics.push(Diagnostic::warn(
                at,
                format!("location `{}` contains whitespace", fragment.location),
            ));
        }
        if fragment.category == Category::Section {
            if fragment.anchor().is_none_or(str::is_empty) {
                report.diagnostics.push(Diagnostic::warn(
                    at,
                    format!("section `{}` has no anchor to link to", fragment.title),
                ));
            }
            if !fragment.text.is_empty() {
                report.diagnostics.push(Diagnostic::info(
                    at,
                    format!("section `{}` carries body text", fragment.title),
                ));
            }
        }
    }

    report.pages = pages.len();
    report.distinct_locations = locations.len();
    report
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::{Fragment, codec};

    fn fragment(location: &str, title: &str, text: &str, category: Category) -> Fragment {
        Fragment {
            location: location.into(),
            page: "Material Parameters".into(),
            title: title.into(),
            text: text.into(),
            category,
        }
    }

    #[test]
    fn test_generator_fixture_is_clean() {
        let parsed = codec::parse(include_str!("../tests/fixtures/search_index.js"))
            .expect("fixture parses");
        let report = validate(&parsed.document);

        assert!(report.is_ok());
        assert!(report.diagnostics.is_empty(), "{:?}", report.diagnostics);
        assert_eq!(report.fragments, 70);
        assert_eq!(report.pages, 6);
        assert_eq!(report.distinct_locations, 43);
        assert_eq!(report.categories[&Category::Page], 33);
        assert_eq!(report.categories[&Category::Section], 17);
        assert_eq!(report.categories[&Category::Function], 14);
        assert_eq!(report.categories[&Category::Type], 6);
    }

    #[test]
    fn test_lint_findings() {
        let document = SearchIndexDocument::new(vec![
            fragment("man/materialparameters/", "", "body", Category::Page),
            fragment("man/materialparameters/", "Density", "", Category::Section),
            fragment("man/materialparameters/#Density", "Density", "x", Category::Section),
            fragment("man/material parameters/", "Gravity", "g", Category::Page),
        ]);
        let report = validate(&document);

        assert!(report.is_ok(), "lint findings never fail a report");
        assert_eq!(report.count(Severity::Warn), 3);
        assert_eq!(report.count(Severity::Info), 1);

        let records: Vec<_> = report.diagnostics.iter().map(|d| d.record).collect();
        assert_eq!(records, vec![Some(0), Some(1), Some(2), Some(3)]);
    }

    #[test]
    fn test_categories_always_listed() {
        let report = validate(&SearchIndexDocument::default());
        assert_eq!(report.categories.len(), 4);
        assert!(report.categories.values().all(|&n| n == 0));
    }

    #[test]
    fn test_decode_errors_fail_the_report() {
        let mut report = validate(&SearchIndexDocument::default());
        report.merge_decode_diagnostics(vec![Diagnostic::error(Some(2), "missing field `page`")]);
        assert!(!report.is_ok());
        assert_eq!(report.diagnostics[0].record, Some(2));
    }
}
