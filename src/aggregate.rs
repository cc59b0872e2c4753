//! Turns raw index hits into the deduplicated result list.
//!
//! # Algorithm
//!
//! 1. Walk hits in the order the index returned them (relevance order).
//! 2. Skip any hit whose `href` has already been kept. A missing href is the
//!    empty string and dedups like any other key.
//! 3. Build a [`SearchResult`]: title defaults to `"Untitled"`, description is
//!    the first `description_chars` characters of the chunk text followed by
//!    `"..."`, always.
//! 4. Stop once `top_k` results are kept.
//!
//! Results are never re-sorted; the index's ordering is trusted as-is.

use std::collections::HashSet;

use crate::models::{SearchHit, SearchResult};

/// Title used when a hit has none.
pub const UNTITLED: &str = "Untitled";

/// Appended to every description, whether or not the text was cut.
pub const ELLIPSIS: &str = "...";

/// Output of [`aggregate`].
#[derive(Debug, Clone, PartialEq)]
pub struct Aggregated {
    pub results: Vec<SearchResult>,
    /// `"Found N relevant pages"` when there are results, otherwise `None`.
    pub answer: Option<String>,
}

pub fn aggregate(hits: &[SearchHit], top_k: usize, description_chars: usize) -> Aggregated {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut results = Vec::with_capacity(top_k.min(hits.len()));

    for hit in hits {
        if results.len() >= top_k {
            break;
        }

        let href = hit.payload.href.as_deref().unwrap_or("");
        if !seen.insert(href) {
            continue;
        }

        results.push(to_result(hit, href, description_chars));
    }

    let answer = if results.is_empty() {
        None
    } else {
        Some(found_message(results.len()))
    };

    Aggregated { results, answer }
}

fn to_result(hit: &SearchHit, href: &str, description_chars: usize) -> SearchResult {
    let title = match hit.payload.title.as_deref() {
        Some(t) if !t.is_empty() => t.to_string(),
        _ => UNTITLED.to_string(),
    };

    SearchResult {
        title,
        description: describe(hit.payload.text.as_deref().unwrap_or(""), description_chars),
        href: href.to_string(),
        category: hit.payload.category.clone(),
        score: hit.score,
    }
}

/// Fixed-width cut to `max_chars` characters plus [`ELLIPSIS`].
///
/// No word-boundary handling. Cuts on `char` boundaries, never mid code point.
pub fn describe(text: &str, max_chars: usize) -> String {
    let end = text
        .char_indices()
        .nth(max_chars)
        .map(|(i, _)| i)
        .unwrap_or(text.len());

    let mut description = String::with_capacity(end + ELLIPSIS.len());
    description.push_str(&text[..end]);
    description.push_str(ELLIPSIS);
    description
}

pub fn found_message(count: usize) -> String {
    format!("Found {} relevant pages", count)
}
