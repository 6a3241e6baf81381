//! Compare two builds of the same documentation.
//!
//! Records carry no identity of their own, so a fragment is matched by
//! its `(location, title, category)` key. Keys may repeat; repeated keys
//! pair up in document order.

use crate::{Category, Fragment, SearchIndexDocument};
use serde::Serialize;
use std::collections::{HashMap, VecDeque};

/// A fragment present in both builds whose page or text changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Changed {
    /// As it was in the old build.
    pub before: Fragment,
    /// As it is in the new build.
    pub after: Fragment,
}

/// Everything that differs between two builds.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BuildDiff {
    /// In new-build order.
    pub added: Vec<Fragment>,
    /// In old-build order.
    pub removed: Vec<Fragment>,
    /// In new-build order.
    pub changed: Vec<Changed>,
    /// Fragments identical in both builds.
    pub unchanged: usize,
}

impl BuildDiff {
    /// No fragment was added, removed or changed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.changed.is_empty()
    }
}

type Key<'a> = (&'a str, &'a str, Category);

fn key(fragment: &Fragment) -> Key<'_> {
    (&fragment.location, &fragment.title, fragment.category)
}

/// Match `old` against `new` fragment by fragment.
#[must_use]
pub fn diff(old: &SearchIndexDocument, new: &SearchIndexDocument) -> BuildDiff {
    let mut pending: HashMap<Key<'_>, VecDeque<usize>> = HashMap::new();
    for (i, fragment) in old.docs.iter().enumerate() {
        pending.entry(key(fragment)).or_default().push_back(i);
    }

    let mut matched = vec![false; old.docs.len()];
    let mut result = BuildDiff::default();

    for fragment in &new.docs {
        let Some(i) = pending
            .get_mut(&key(fragment))
            .and_then(VecDeque::pop_front)
        else {
            result.added.push(fragment.clone());
            continue;
        };
        matched[i] = true;

        let before = &old.docs[i];
        if before.text == fragment.text && before.page == fragment.page {
            result.unchanged += 1;
        } else {
            result.changed.push(Changed {
                before: before.clone(),
                after: fragment.clone(),
            });
        }
    }

    result.removed = old
        .docs
        .iter()
        .zip(&matched)
        .filter(|(_, seen)| !**seen)
        .map(|(fragment, _)| fragment.clone())
        .collect();

    result
}
