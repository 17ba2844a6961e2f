//! # Reference Parsing
//!
//! A `$ref` string has the form `<id>#<path>`. The `id` (everything up to
//! and including the first `#`) names a registered document; an empty `id`
//! means the root document. The `path` is a `/`-delimited walk through
//! object keys, JSON-Pointer style.
//!
//! A string with no `#` is an id-only reference whose path is empty.
//!
//! Only object keys are traversed: reaching a non-object (including an
//! array) before the path is exhausted means the target does not exist.

use std::borrow::Cow;

use serde_json::Value;

/// The path half of a reference, either raw or already split.
///
/// Both forms walk identically: segment `0` is the empty string before the
/// leading `/` and is skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefPath<'r> {
    Raw(&'r str),
    Segments(Vec<Cow<'r, str>>),
}

impl<'r> RefPath<'r> {
    /// The path as segments, including the leading empty segment.
    pub fn segments(&self) -> Vec<Cow<'r, str>> {
        match self {
            Self::Raw(raw) => raw.split('/').map(Cow::Borrowed).collect(),
            Self::Segments(segments) => segments.clone(),
        }
    }

    /// Walk `document` along this path.
    ///
    /// Returns `None` if a segment is missing or the walk meets a non-object
    /// before the last segment.
    pub fn walk<'v>(&self, document: &'v Value) -> Option<&'v Value> {
        let mut fragment = document;
        for segment in self.segments().iter().skip(1) {
            let key = unescape(segment);
            fragment = fragment.as_object()?.get(&*key)?;
        }
        Some(fragment)
    }
}

/// A parsed `$ref` string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference<'r> {
    /// Document identifier including its trailing `#`, or empty for the root
    /// document. For id-only references (no `#`) this is the whole string.
    pub id: &'r str,
    pub path: RefPath<'r>,
}

impl<'r> Reference<'r> {
    pub fn parse(reference: &'r str) -> Self {
        match reference.find('#') {
            Some(hash) => Self {
                id: &reference[..=hash],
                path: RefPath::Raw(&reference[hash + 1..]),
            },
            None => Self {
                id: reference,
                path: RefPath::Raw(""),
            },
        }
    }

    /// True when the reference points into the root document.
    pub fn is_local(&self) -> bool {
        self.id.is_empty() || self.id == "#"
    }

    /// Registry keys to try, in order: the id itself, then its fallback form
    /// (trailing `#` stripped, or appended for id-only references).
    pub fn registry_keys(&self) -> [Cow<'r, str>; 2] {
        let fallback = match self.id.strip_suffix('#') {
            Some(stripped) => Cow::Borrowed(stripped),
            None => Cow::Owned(format!("{}#", self.id)),
        };
        [Cow::Borrowed(self.id), fallback]
    }
}

/// Undo JSON Pointer escaping (`~1` → `/`, `~0` → `~`).
fn unescape(segment: &str) -> Cow<'_, str> {
    if segment.contains('~') {
        Cow::Owned(segment.replace("~1", "/").replace("~0", "~"))
    } else {
        Cow::Borrowed(segment)
    }
}
