//! Splits a source line into words.
//!
//! A word is a maximal run of characters other than blanks, `=` and
//! `/`.  The `=` character only separates an argument keyword from
//! its value (as in `count=3`) and is otherwise discarded.  A comment
//! begins with `//` and runs to the end of the line.  A `/` which is
//! not part of `//` is a syntax error.
use logos::Logos;

use super::diagnostics::CompileError;
use super::types::LineNumber;

#[cfg(test)]
mod tests;

/// The tokens of a single source line.
#[derive(Debug, PartialEq, Eq, Logos, Clone)]
#[logos(skip r"[ \t\r]+")]
pub(crate) enum Token {
    /// Needs to win over `Solidus`; Logos prefers the longest match.
    #[regex("//[^\n]*")]
    Comment,

    /// Solidus is often called "slash" but people often confuse slash
    /// and backslash.  So we don't call it either.
    #[token("/")]
    Solidus,

    #[token("=")]
    Equals,

    #[regex(r"[^ \t\r\n=/]+", |lex| lex.slice().to_string())]
    Word(String),
}

/// A word of source text, and the (1-based, counted in characters)
/// column at which it starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Word {
    pub(crate) text: String,
    pub(crate) column: usize,
}

impl Word {
    pub(crate) fn as_str(&self) -> &str {
        self.text.as_str()
    }

    pub(crate) fn starts_with_digit(&self) -> bool {
        self.text.starts_with(|ch: char| ch.is_ascii_digit())
    }
}

fn column_of(text: &str, byte_offset: usize) -> usize {
    text[..byte_offset].chars().count() + 1
}

/// Read the words of one line of source.  A blank line, or a line
/// holding only a comment, yields no words.
pub(crate) fn read_words(line: LineNumber, text: &str) -> Result<Vec<Word>, CompileError> {
    let mut words: Vec<Word> = Vec::new();
    let mut lexer = Token::lexer(text);
    while let Some(item) = lexer.next() {
        let column = column_of(text, lexer.span().start);
        match item {
            Ok(Token::Word(w)) => {
                words.push(Word { text: w, column });
            }
            Ok(Token::Equals) => (),
            Ok(Token::Comment) => {
                break;
            }
            Ok(Token::Solidus) => {
                return Err(CompileError::SyntaxError {
                    line,
                    column: Some(column),
                    msg: "a single '/' is not allowed here (comments begin with '//')"
                        .to_string(),
                });
            }
            Err(()) => {
                return Err(CompileError::SyntaxError {
                    line,
                    column: Some(column),
                    msg: format!("unexpected character sequence '{}'", lexer.slice()),
                });
            }
        }
    }
    Ok(words)
}
