//! WHERE-block extraction and clause stripping.
//!
//! This is a textual scan, not a SPARQL parser. The block is located by a
//! brace-depth state machine so nested groups stay inside the block, and
//! non-triple clauses are then elided up to the next opening brace.

use once_cell::sync::Lazy;
use regex::Regex;

static WHERE_OPEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bWHERE\s*\{").expect("WHERE pattern is valid"));

// The leading group keeps the character before the keyword so that names
// such as `?optionalTeam` or `:filterRule` are left alone.
static NON_TRIPLE_CLAUSE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)(^|[^\w?$:])(FILTER|OPTIONAL|GROUP\s+BY|ORDER\s+BY|BIND|VALUES|GRAPH)\b[^{]*",
    )
    .expect("clause pattern is valid")
});

/// Scanner state while walking the query text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanState {
    OutsideBlock,
    /// Inside the pattern block at the given brace depth (>= 1)
    InsideBlock(usize),
}

impl ScanState {
    /// Advance the scanner by one character.
    pub fn step(self, c: char) -> ScanState {
        match self {
            ScanState::OutsideBlock => {
                if c == '{' {
                    ScanState::InsideBlock(1)
                } else {
                    ScanState::OutsideBlock
                }
            }
            ScanState::InsideBlock(depth) => match c {
                '{' => ScanState::InsideBlock(depth + 1),
                '}' if depth <= 1 => ScanState::OutsideBlock,
                '}' => ScanState::InsideBlock(depth - 1),
                _ => self,
            },
        }
    }
}

/// Drop `#` comments up to the end of their line. A `#` inside a quoted
/// literal or an `<...>` IRI is kept.
pub fn strip_comments(query: &str) -> String {
    let mut out = String::with_capacity(query.len());

    for line in query.split_inclusive('\n') {
        let mut quote: Option<char> = None;
        let mut escaped = false;
        let mut in_iri = false;
        let mut cut = line.len();

        for (i, c) in line.char_indices() {
            if let Some(q) = quote {
                if escaped {
                    escaped = false;
                } else if c == '\\' {
                    escaped = true;
                } else if c == q {
                    quote = None;
                }
                continue;
            }
            if in_iri {
                in_iri = !(c == '>' || c.is_whitespace());
                continue;
            }
            match c {
                '#' => {
                    cut = i;
                    break;
                }
                '<' => in_iri = true,
                '"' | '\'' => quote = Some(c),
                _ => {}
            }
        }

        out.push_str(&line[..cut]);
        if cut < line.len() && line.ends_with('\n') {
            out.push('\n');
        }
    }

    out
}

/// Extract the content of the `WHERE { ... }` block.
///
/// Comments are removed first. Returns an empty string when the query has
/// no pattern block. An unterminated block yields everything after the
/// opening brace.
pub fn extract_where_block(query: &str) -> String {
    let normalized = strip_comments(query).replace(['\n', '\r'], " ");

    let Some(open) = WHERE_OPEN.find(&normalized) else {
        return String::new();
    };

    let mut state = ScanState::InsideBlock(1);
    let mut block = String::new();

    for c in normalized[open.end()..].chars() {
        state = state.step(c);
        if state == ScanState::OutsideBlock {
            break;
        }
        block.push(c);
    }

    block.trim().to_string()
}

/// Remove filter, optional, grouping, ordering, binding, value-list and
/// named-graph clauses from a block, up to (not into) the next `{`.
pub fn strip_non_triple_clauses(block: &str) -> String {
    NON_TRIPLE_CLAUSE.replace_all(block, "$1").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_state_transitions() {
        let state = ScanState::OutsideBlock.step('x');
        assert_eq!(state, ScanState::OutsideBlock);

        let state = state.step('{');
        assert_eq!(state, ScanState::InsideBlock(1));

        let state = state.step('{').step('a');
        assert_eq!(state, ScanState::InsideBlock(2));

        let state = state.step('}');
        assert_eq!(state, ScanState::InsideBlock(1));

        assert_eq!(state.step('}'), ScanState::OutsideBlock);
    }

    #[test]
    fn test_extract_simple_block() {
        let query = "SELECT ?p WHERE { ?p a :Player . }";
        assert_eq!(extract_where_block(query), "?p a :Player .");
    }

    #[test]
    fn test_extract_is_case_insensitive_and_multiline() {
        let query = "select ?p\nwhere\n{\n  ?p a :Player .\n}";
        assert_eq!(extract_where_block(query), "?p a :Player .");
    }

    #[test]
    fn test_extract_keeps_nested_groups() {
        let query = "SELECT * WHERE { ?p a :Player . OPTIONAL { ?p :age ?a } } LIMIT 5";
        assert_eq!(
            extract_where_block(query),
            "?p a :Player . OPTIONAL { ?p :age ?a }"
        );
    }

    #[test]
    fn test_comments_are_dropped_before_joining_lines() {
        let query = "SELECT * WHERE {\n # find the player's team\n ?p a :Player .\n ?p :playsFor ?t . # done\n}";
        assert_eq!(extract_where_block(query), "?p a :Player .  ?p :playsFor ?t .");
    }

    #[test]
    fn test_hash_inside_iri_or_literal_is_kept() {
        let text = "?p a <http://ex.org/onto#Player> ; :tag \"#1\" # trailing\n";
        assert_eq!(
            strip_comments(text),
            "?p a <http://ex.org/onto#Player> ; :tag \"#1\" \n"
        );
        assert_eq!(strip_comments("# only a comment"), "");
    }

    #[test]
    fn test_extract_without_where_is_empty() {
        assert_eq!(extract_where_block("ASK { ?s ?p ?o }"), "");
        assert_eq!(extract_where_block("Sorry, I cannot help with that."), "");
        assert_eq!(extract_where_block(""), "");
    }

    #[test]
    fn test_extract_unterminated_returns_accumulated() {
        let query = "SELECT * WHERE { ?p a :Player . { ?p :age ?a ";
        assert_eq!(extract_where_block(query), "?p a :Player . { ?p :age ?a");
    }

    #[test]
    fn test_strip_filter_up_to_end() {
        let stripped = strip_non_triple_clauses("?p :age ?a . FILTER(?a > 30)");
        assert_eq!(stripped.trim(), "?p :age ?a .");
    }

    #[test]
    fn test_strip_optional_keeps_group_content() {
        let stripped = strip_non_triple_clauses("?p a :Player . OPTIONAL { ?p :age ?a }");
        assert_eq!(stripped, "?p a :Player . { ?p :age ?a }");
    }

    #[test]
    fn test_strip_leaves_names_containing_keywords() {
        let block = "?p :hasOptionalRole ?optionalRole . ?p :filterRule ?values";
        assert_eq!(strip_non_triple_clauses(block), block);
    }

    #[test]
    fn test_strip_multiword_keywords() {
        let stripped = strip_non_triple_clauses("?p a :Player . order  by ?p");
        assert_eq!(stripped.trim(), "?p a :Player .");
    }
}
