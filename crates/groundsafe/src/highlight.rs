//! Search-term highlighting for card text.
//!
//! Text is split on every case-insensitive occurrence of the search query.
//! The query is always matched literally, so characters such as `(`, `.` or
//! `*` carry no pattern meaning.

use regex::{Regex, RegexBuilder};
use serde::Serialize;
use tracing::trace;

/// A piece of highlighted text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "text", rename_all = "snake_case")]
pub enum Segment {
    /// Text outside any match.
    Plain(String),
    /// Text matching the query, with the casing of the source text.
    Match(String),
}

impl Segment {
    /// The text of this segment.
    #[must_use]
    pub fn text(&self) -> &str {
        match self {
            Self::Plain(text) | Self::Match(text) => text,
        }
    }

    /// Whether this segment should be emphasized.
    #[must_use]
    pub fn is_match(&self) -> bool {
        matches!(self, Self::Match(_))
    }
}

/// Text split into plain and matching segments.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Highlighted {
    segments: Vec<Segment>,
}

impl Highlighted {
    /// Text with no emphasis at all.
    #[must_use]
    pub fn plain(text: &str) -> Self {
        let segments = if text.is_empty() {
            Vec::new()
        } else {
            vec![Segment::Plain(text.to_string())]
        };
        Self { segments }
    }

    /// The ordered segments.
    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Number of emphasized segments.
    #[must_use]
    pub fn match_count(&self) -> usize {
        self.segments.iter().filter(|s| s.is_match()).count()
    }

    /// Whether any segment is emphasized.
    #[must_use]
    pub fn has_matches(&self) -> bool {
        self.segments.iter().any(Segment::is_match)
    }

    /// The original text, with emphasis removed.
    #[must_use]
    pub fn to_plain_string(&self) -> String {
        self.segments.iter().map(Segment::text).collect()
    }
}

/// A compiled search query.
///
/// Build one per render pass and apply it to every text field of a card.
#[derive(Debug, Clone)]
pub struct Highlighter {
    regex: Option<Regex>,
}

impl Highlighter {
    /// Compile a highlighter for the given query.
    ///
    /// An empty or whitespace-only query produces a highlighter that leaves
    /// all text untouched. Otherwise the query is used verbatim, surrounding
    /// whitespace included.
    #[must_use]
    pub fn new(query: &str) -> Self {
        if query.trim().is_empty() {
            return Self { regex: None };
        }

        // Escaped literals only fail on the size limit. Such a query
        // highlights nothing.
        let regex = RegexBuilder::new(&regex::escape(query))
            .case_insensitive(true)
            .build()
            .map_err(|e| {
                tracing::warn!(error = %e, "Search query could not be compiled");
            })
            .ok();
        Self { regex }
    }

    /// Whether this highlighter emphasizes anything.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.regex.is_some()
    }

    /// Whether `text` contains the query. Always `false` when inactive.
    #[must_use]
    pub fn is_match(&self, text: &str) -> bool {
        self.regex.as_ref().is_some_and(|regex| regex.is_match(text))
    }

    /// Split text into plain and matching segments.
    #[must_use]
    pub fn apply(&self, text: &str) -> Highlighted {
        let Some(regex) = &self.regex else {
            return Highlighted::plain(text);
        };

        let mut segments = Vec::new();
        let mut last = 0;
        for m in regex.find_iter(text) {
            if m.start() > last {
                segments.push(Segment::Plain(text[last..m.start()].to_string()));
            }
            segments.push(Segment::Match(m.as_str().to_string()));
            last = m.end();
        }
        if last < text.len() {
            segments.push(Segment::Plain(text[last..].to_string()));
        }

        trace!(segments = segments.len(), "Highlighted text");
        Highlighted { segments }
    }
}

/// Highlight a single piece of text.
#[must_use]
pub fn highlight(text: &str, query: &str) -> Highlighted {
    Highlighter::new(query).apply(text)
}
