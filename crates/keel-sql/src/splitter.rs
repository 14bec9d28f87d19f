//! Split a migration script into individually executable statements.
//!
//! Many drivers refuse to run more than one statement per call, so scripts
//! are cut on top-level `;` tokens. Splitting works on the token stream from
//! sqlparser's tokenizer, which means semicolons inside string literals,
//! quoted identifiers, comments, and dollar-quoted bodies are never split on.
//! Each returned statement is the exact source text, trimmed, without its
//! terminator.

use crate::error::{SqlError, SqlResult};
use sqlparser::dialect::Dialect;
use sqlparser::keywords::Keyword;
use sqlparser::tokenizer::{Location, Token, Tokenizer};

/// Maps tokenizer locations (1-based line/column, in chars) to byte offsets.
struct LineIndex<'a> {
    text: &'a str,
    line_starts: Vec<usize>,
}

impl<'a> LineIndex<'a> {
    fn new(text: &'a str) -> Self {
        let mut line_starts = vec![0];
        line_starts.extend(text.match_indices('\n').map(|(i, _)| i + 1));
        Self { text, line_starts }
    }

    fn byte_offset(&self, location: Location) -> usize {
        let Some(&line_start) = self
            .line_starts
            .get((location.line as usize).saturating_sub(1))
        else {
            return self.text.len();
        };
        let column = (location.column as usize).saturating_sub(1);
        self.text[line_start..]
            .char_indices()
            .nth(column)
            .map(|(i, _)| line_start + i)
            .unwrap_or(self.text.len())
    }
}

/// Split `script` into statements using `dialect`'s tokenizer rules.
///
/// Segments holding only whitespace or comments are dropped, so an empty
/// script yields no statements. `CASE ... END` expressions and
/// `CREATE TRIGGER ... BEGIN ... END` bodies are kept whole.
pub fn split_statements(dialect: &dyn Dialect, script: &str) -> SqlResult<Vec<String>> {
    let tokens = Tokenizer::new(dialect, script)
        .tokenize_with_location()
        .map_err(|e| SqlError::TokenizeError {
            message: e.message,
            line: e.location.line,
            column: e.location.column,
        })?;

    let index = LineIndex::new(script);
    let mut statements = Vec::new();
    let mut start = 0;
    let mut has_content = false;
    let mut in_trigger = false;
    let mut depth = 0usize;

    for tok in &tokens {
        match &tok.token {
            Token::Whitespace(_) => {}
            Token::EOF => break,
            Token::SemiColon if depth == 0 => {
                let end = index.byte_offset(tok.span.start);
                if has_content {
                    push_statement(&mut statements, &script[start..end]);
                }
                start = end + 1;
                has_content = false;
                in_trigger = false;
            }
            Token::Word(word) if word.quote_style.is_none() => {
                has_content = true;
                match word.keyword {
                    Keyword::TRIGGER => in_trigger = true,
                    Keyword::BEGIN if in_trigger => depth += 1,
                    Keyword::CASE => depth += 1,
                    Keyword::END => depth = depth.saturating_sub(1),
                    _ => {}
                }
            }
            _ => has_content = true,
        }
    }

    if has_content && start < script.len() {
        push_statement(&mut statements, &script[start..]);
    }

    Ok(statements)
}

fn push_statement(statements: &mut Vec<String>, text: &str) {
    let text = text.trim();
    if !text.is_empty() {
        statements.push(text.to_string());
    }
}

#[cfg(test)]
#[path = "splitter_test.rs"]
mod tests;
