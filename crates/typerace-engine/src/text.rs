//! Paragraph sources: where the text to type comes from.
//!
//! The engine only needs "a string of words". The [`ParagraphSource`]
//! trait is the seam: the server plugs in an HTTP fetcher, tests plug in
//! a fixed string, and [`lorem_paragraph`] is the local fallback that can
//! never fail.

use std::future::Future;

use rand::Rng;

/// Produces the text for one round.
///
/// The contract is infallible: implementations must always yield a
/// non-empty paragraph, falling back to [`lorem_paragraph`] rather than
/// surfacing an error. `Clone` because each room actor owns its copy.
pub trait ParagraphSource: Clone + Send + Sync + 'static {
    /// Fetches (or generates) a paragraph.
    fn fetch(&self) -> impl Future<Output = String> + Send;
}

// ---------------------------------------------------------------------------
// Local fallback generator
// ---------------------------------------------------------------------------

/// The word bag for the fallback generator.
const LOREM_WORDS: &[&str] = &[
    "lorem", "ipsum", "dolor", "sit", "amet", "consectetur", "adipiscing",
    "elit", "sed", "do", "eiusmod", "tempor", "incididunt", "ut", "labore",
    "et", "dolore", "magna", "aliqua", "enim", "ad", "minim", "veniam",
    "quis", "nostrud", "exercitation", "ullamco", "laboris", "nisi",
    "aliquip", "ex", "ea", "commodo", "consequat", "duis", "aute", "irure",
    "in", "reprehenderit", "voluptate", "velit", "esse", "cillum", "fugiat",
    "nulla", "pariatur", "excepteur", "sint", "occaecat", "cupidatat",
];

/// Number of words in a generated paragraph.
const PARAGRAPH_WORDS: usize = 50;

/// Generates a pseudo-random lowercase paragraph by sampling the word bag
/// with replacement. Never fails, never returns an empty string.
pub fn lorem_paragraph() -> String {
    let mut rng = rand::rng();
    let mut words = Vec::with_capacity(PARAGRAPH_WORDS);
    for _ in 0..PARAGRAPH_WORDS {
        words.push(LOREM_WORDS[rng.random_range(0..LOREM_WORDS.len())]);
    }
    words.join(" ")
}

// ---------------------------------------------------------------------------
// Sources
// ---------------------------------------------------------------------------

/// A source that always generates locally. What the server degrades to
/// when no fetcher is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoremParagraphs;

impl ParagraphSource for LoremParagraphs {
    async fn fetch(&self) -> String {
        lorem_paragraph()
    }
}

/// A source that returns the same paragraph every round. For tests and
/// demos where the text must be known in advance.
#[derive(Debug, Clone)]
pub struct FixedParagraph(pub String);

impl FixedParagraph {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }
}

impl ParagraphSource for FixedParagraph {
    async fn fetch(&self) -> String {
        self.0.clone()
    }
}
