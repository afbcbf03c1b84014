//! Basic graph pattern tokenizer.
//!
//! Splits a stripped WHERE block on `.`, `;` and `,` and expands the
//! predicate-object list abbreviations:
//!
//! - three tokens: full `s p o`, sets the current subject and predicate
//! - two tokens: `p o` after `;`, reuses the current subject
//! - one token: `o` after `,`, reuses the current subject and predicate
//!
//! Segments with any other token count are skipped. Quoted literals and
//! `<...>` IRIs are kept whole; stray braces left by stripped group clauses
//! count as whitespace. Blank-node property lists and collections are not
//! supported.

use serde::Serialize;

/// A triple of raw, unclassified tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RawTriple {
    pub subject: String,
    pub predicate: String,
    pub object: String,
}

impl RawTriple {
    pub fn new(
        subject: impl Into<String>,
        predicate: impl Into<String>,
        object: impl Into<String>,
    ) -> Self {
        Self {
            subject: subject.into(),
            predicate: predicate.into(),
            object: object.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LexState {
    Plain,
    Quoted { quote: char, escaped: bool },
    Iri,
}

/// Character-level splitter behind [`segment_tokens`].
struct Lexer {
    state: LexState,
    /// Off after an unterminated literal; quote characters are then plain
    quotes: bool,
    word: String,
    tokens: Vec<String>,
    segments: Vec<Vec<String>>,
}

impl Lexer {
    fn new() -> Self {
        Self {
            state: LexState::Plain,
            quotes: true,
            word: String::new(),
            tokens: Vec::new(),
            segments: Vec::new(),
        }
    }

    fn flush_word(&mut self) {
        if !self.word.is_empty() {
            self.tokens.push(std::mem::take(&mut self.word));
        }
    }

    fn flush_segment(&mut self) {
        self.flush_word();
        if !self.tokens.is_empty() {
            self.segments.push(std::mem::take(&mut self.tokens));
        }
    }

    fn push(&mut self, c: char) {
        match self.state {
            LexState::Quoted { quote, escaped } => {
                self.word.push(c);
                self.state = if escaped {
                    LexState::Quoted {
                        quote,
                        escaped: false,
                    }
                } else if c == '\\' {
                    LexState::Quoted {
                        quote,
                        escaped: true,
                    }
                } else if c == quote {
                    LexState::Plain
                } else {
                    self.state
                };
            }
            LexState::Iri => {
                if c.is_whitespace() {
                    // Not an IRI after all (e.g. a comparison operator).
                    self.flush_word();
                    self.state = LexState::Plain;
                } else {
                    self.word.push(c);
                    if c == '>' {
                        self.state = LexState::Plain;
                    }
                }
            }
            LexState::Plain => match c {
                '"' | '\'' if self.quotes => {
                    self.word.push(c);
                    self.state = LexState::Quoted {
                        quote: c,
                        escaped: false,
                    };
                }
                '<' => {
                    self.word.push(c);
                    self.state = LexState::Iri;
                }
                '.' | ';' | ',' => self.flush_segment(),
                '{' | '}' => self.flush_word(),
                c if c.is_whitespace() => self.flush_word(),
                c => self.word.push(c),
            },
        }
    }

    fn finish(mut self) -> Vec<Vec<String>> {
        if let LexState::Quoted { .. } = self.state {
            // A stray apostrophe swallowed the rest of the block; split it
            // again with quoting off.
            tracing::trace!("unterminated literal, re-splitting without quotes");
            let pending = std::mem::take(&mut self.word);
            self.state = LexState::Plain;
            self.quotes = false;
            for c in pending.chars() {
                self.push(c);
            }
        }
        self.flush_segment();
        self.segments
    }
}

/// Split a block into delimiter-separated segments of whitespace-separated
/// tokens. Empty segments are dropped.
pub fn segment_tokens(block: &str) -> Vec<Vec<String>> {
    let mut lexer = Lexer::new();
    for c in block.chars() {
        lexer.push(c);
    }
    lexer.finish()
}

/// Tokenize a stripped WHERE block into raw triples, in order of appearance.
pub fn tokenize_bgp(block: &str) -> Vec<RawTriple> {
    let mut triples = Vec::new();
    let mut current_subject: Option<String> = None;
    let mut current_predicate: Option<String> = None;

    for segment in segment_tokens(block) {
        match segment.as_slice() {
            [subject, predicate, object] => {
                current_subject = Some(subject.clone());
                current_predicate = Some(predicate.clone());
                triples.push(RawTriple::new(subject, predicate, object));
            }
            [predicate, object] => {
                let Some(subject) = current_subject.as_ref() else {
                    tracing::trace!(?segment, "skipping predicate list without subject");
                    continue;
                };
                triples.push(RawTriple::new(subject, predicate, object));
                current_predicate = Some(predicate.clone());
            }
            [object] => {
                let (Some(subject), Some(predicate)) =
                    (current_subject.as_ref(), current_predicate.as_ref())
                else {
                    tracing::trace!(?segment, "skipping object list without context");
                    continue;
                };
                triples.push(RawTriple::new(subject, predicate, object));
            }
            _ => {
                tracing::trace!(tokens = segment.len(), "skipping unrecognised segment");
            }
        }
    }

    triples
}
