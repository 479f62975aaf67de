//! Store paths: ordered sequences of non-empty key segments.

use std::fmt;

/// A parsed store path.
///
/// Splitting on `/` drops empty segments, so leading, trailing, and doubled
/// slashes are all tolerated: `"/items//1/"` addresses the same node as
/// `"items/1"`. The empty path addresses the tree root.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StorePath {
    segments: Vec<String>,
}

impl StorePath {
    /// Parse a slash-delimited path. Never fails; empty segments are dropped.
    pub fn parse(raw: &str) -> Self {
        Self {
            segments: raw
                .split('/')
                .filter(|s| !s.is_empty())
                .map(str::to_owned)
                .collect(),
        }
    }

    /// Whether this path addresses the tree root (no segments).
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// The path's segments, in order.
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Split into (all-but-last, last). `None` for the root path.
    pub fn split_last(&self) -> Option<(&[String], &str)> {
        let (last, parents) = self.segments.split_last()?;
        Some((parents, last))
    }

    /// A new path with `segment` appended.
    #[must_use]
    pub fn child(&self, segment: &str) -> Self {
        let mut segments = self.segments.clone();
        segments.push(segment.to_owned());
        Self { segments }
    }
}

impl fmt::Display for StorePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join("/"))
    }
}

impl From<&str> for StorePath {
    fn from(raw: &str) -> Self {
        Self::parse(raw)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
