//! Media-listing pattern matching.
//!
//! A media listing is any text (an HTML directory index, an RSS feed, a plain
//! file list) that names recording files. It is never parsed as a document:
//! an operator-supplied regex with two capture groups pulls out
//! `(filename, talk id)` pairs, and the loader decides which pairs belong to
//! known talks.

use recordings_shared::{RecordingsError, Result, TalkId};
use regex::{CaptureMatches, Regex};

/// Minimum number of capture groups a filename pattern must declare.
const REQUIRED_GROUPS: usize = 2;

// ---------------------------------------------------------------------------
// FilenamePattern
// ---------------------------------------------------------------------------

/// A compiled filename pattern: group 1 is the filename, group 2 the talk id.
#[derive(Debug, Clone)]
pub struct FilenamePattern {
    regex: Regex,
}

impl FilenamePattern {
    /// Compile `pattern`, rejecting regexes with fewer than two capture groups.
    pub fn new(pattern: &str) -> Result<Self> {
        let regex =
            Regex::new(pattern).map_err(|e| RecordingsError::pattern(pattern, e.to_string()))?;

        // captures_len() counts the implicit whole-match group.
        let groups = regex.captures_len() - 1;
        if groups < REQUIRED_GROUPS {
            return Err(RecordingsError::pattern(
                pattern,
                format!("expected two capture groups (filename, talk id), found {groups}"),
            ));
        }

        Ok(Self { regex })
    }

    /// The pattern source.
    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }

    /// Lazily scan `text` for non-overlapping matches.
    pub fn scan<'p, 't>(&'p self, text: &'t str) -> Matches<'p, 't> {
        Matches {
            inner: self.regex.captures_iter(text),
        }
    }
}

/// Scan `text` with `pattern`. Zero matches is an empty iterator, not an error.
pub fn scan<'p, 't>(text: &'t str, pattern: &'p FilenamePattern) -> Matches<'p, 't> {
    pattern.scan(text)
}

// ---------------------------------------------------------------------------
// Matches
// ---------------------------------------------------------------------------

/// One `(filename, talk id)` pair found in a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MediaMatch<'t> {
    pub filename: &'t str,
    /// Captured talk id, unparsed. The pattern may capture non-numeric text.
    pub talk_id: &'t str,
}

impl MediaMatch<'_> {
    /// The talk id as an integer, or `None` when the capture is not numeric.
    pub fn parsed_talk_id(&self) -> Option<TalkId> {
        self.talk_id.trim().parse().ok()
    }
}

/// Iterator over the pairs found by [`FilenamePattern::scan`].
pub struct Matches<'p, 't> {
    inner: CaptureMatches<'p, 't>,
}

impl<'t> Iterator for Matches<'_, 't> {
    type Item = MediaMatch<'t>;

    fn next(&mut self) -> Option<Self::Item> {
        // A match where either group did not participate carries no pair.
        for caps in self.inner.by_ref() {
            if let (Some(filename), Some(talk_id)) = (caps.get(1), caps.get(2)) {
                return Some(MediaMatch {
                    filename: filename.as_str(),
                    talk_id: talk_id.as_str(),
                });
            }
        }
        None
    }
}

// ---------------------------------------------------------------------------
// File references
// ---------------------------------------------------------------------------

/// Join a listing locator and a filename with exactly one `/` between them.
pub fn join_file_reference(listing: &str, filename: &str) -> String {
    let base = listing.trim_end_matches('/');
    let name = filename.trim_start_matches('/');
    if base.is_empty() {
        return name.to_string();
    }
    format!("{base}/{name}")
}
