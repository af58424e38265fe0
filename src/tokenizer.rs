//! Splits console command lines into statements and words.
//!
//! Statements end at `;` or a newline. A word is either plain text, a
//! `"quoted"` string, a nested `[block]` kept verbatim, or a nested
//! `(expression)` that the console evaluates before dispatch. `//` at the
//! start of a word comments out the rest of the line.

use crate::error::TokenizeError;

/// One word of a statement, borrowed from the source line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Word<'a> {
    Plain(&'a str),
    Quoted(&'a str),
    Block(&'a str),
    Expr(&'a str),
}

impl<'a> Word<'a> {
    pub fn text(self) -> &'a str {
        match self {
            Word::Plain(text) | Word::Quoted(text) | Word::Block(text) | Word::Expr(text) => text,
        }
    }
}

/// Iterator over the statements of a command line.
///
/// After a [`TokenizeError`] the iterator is exhausted: the rest of the line
/// is not executed.
#[derive(Debug, Clone)]
pub struct Statements<'a> {
    source: &'a str,
    pos: usize,
    failed: bool,
}

impl<'a> Statements<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            pos: 0,
            failed: false,
        }
    }

    fn peek(&self) -> Option<u8> {
        self.source.as_bytes().get(self.pos).copied()
    }

    fn skip_blanks(&mut self) {
        while matches!(self.peek(), Some(b' ' | b'\t' | b'\r')) {
            self.pos += 1;
        }
    }

    fn skip_comment(&mut self) {
        let rest = &self.source[self.pos..];
        self.pos += rest.find('\n').unwrap_or(rest.len());
    }

    fn quoted(&mut self) -> Word<'a> {
        self.pos += 1;
        let start = self.pos;
        while !matches!(self.peek(), None | Some(b'"' | b'\n')) {
            self.pos += 1;
        }
        let word = Word::Quoted(&self.source[start..self.pos]);
        if self.peek() == Some(b'"') {
            self.pos += 1;
        }
        word
    }

    fn nested(&mut self, left: u8, right: u8) -> Result<&'a str, TokenizeError> {
        self.pos += 1;
        let start = self.pos;
        let mut depth = 1usize;
        while let Some(byte) = self.peek() {
            self.pos += 1;
            if byte == left {
                depth += 1;
            } else if byte == right {
                depth -= 1;
                if depth == 0 {
                    return Ok(&self.source[start..self.pos - 1]);
                }
            }
        }
        Err(TokenizeError::MissingDelimiter(char::from(right)))
    }

    fn plain(&mut self) -> Word<'a> {
        let start = self.pos;
        while !matches!(
            self.peek(),
            None | Some(b' ' | b'\t' | b'\r' | b'\n' | b';' | b'"' | b'[' | b'(')
        ) {
            self.pos += 1;
        }
        Word::Plain(&self.source[start..self.pos])
    }

    fn statement(&mut self) -> Result<Vec<Word<'a>>, TokenizeError> {
        let mut words = Vec::new();
        loop {
            self.skip_blanks();
            match self.peek() {
                None => break,
                Some(b';' | b'\n') => {
                    self.pos += 1;
                    break;
                }
                Some(b'/') if self.source[self.pos..].starts_with("//") => self.skip_comment(),
                Some(b'"') => words.push(self.quoted()),
                Some(b'[') => words.push(Word::Block(self.nested(b'[', b']')?)),
                Some(b'(') => words.push(Word::Expr(self.nested(b'(', b')')?)),
                Some(_) => words.push(self.plain()),
            }
        }
        Ok(words)
    }
}

impl<'a> Iterator for Statements<'a> {
    type Item = Result<Vec<Word<'a>>, TokenizeError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.pos >= self.source.len() {
            return None;
        }
        let result = self.statement();
        if result.is_err() {
            self.failed = true;
        }
        Some(result)
    }
}

/// Convenience wrapper collecting every statement of `source`.
pub fn split_statements(source: &str) -> Result<Vec<Vec<Word<'_>>>, TokenizeError> {
    Statements::new(source).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(source: &str) -> Vec<Vec<&str>> {
        split_statements(source)
            .unwrap()
            .into_iter()
            .map(|words| words.into_iter().map(Word::text).collect())
            .collect()
    }

    #[test]
    fn splits_on_semicolons_and_newlines() {
        assert_eq!(
            texts("echo a; echo b\nfov 90"),
            vec![vec!["echo", "a"], vec!["echo", "b"], vec!["fov", "90"]]
        );
    }

    #[test]
    fn blocks_keep_nested_text_and_separators() {
        let statements = split_statements("alias go [echo [a; b]; fire]").unwrap();
        assert_eq!(
            statements,
            vec![vec![
                Word::Plain("alias"),
                Word::Plain("go"),
                Word::Block("echo [a; b]; fire"),
            ]]
        );
    }

    #[test]
    fn expressions_and_quotes_are_distinguished() {
        let statements = split_statements(r#"echo "two words" (+ 1 (* 2 3))"#).unwrap();
        assert_eq!(
            statements,
            vec![vec![
                Word::Plain("echo"),
                Word::Quoted("two words"),
                Word::Expr("+ 1 (* 2 3)"),
            ]]
        );
    }

    #[test]
    fn comments_run_to_end_of_line() {
        assert_eq!(
            texts("fov 90 // wide\nfire"),
            vec![vec!["fov", "90"], vec!["fire"]]
        );
    }

    #[test]
    fn unterminated_block_stops_the_line() {
        let mut statements = Statements::new("echo ok; echo [oops; fire");
        assert_eq!(
            statements.next(),
            Some(Ok(vec![Word::Plain("echo"), Word::Plain("ok")]))
        );
        assert_eq!(
            statements.next(),
            Some(Err(TokenizeError::MissingDelimiter(']')))
        );
        assert_eq!(statements.next(), None);
    }

    #[test]
    fn unterminated_quote_ends_at_newline() {
        assert_eq!(
            texts("echo \"open\nfire"),
            vec![vec!["echo", "open"], vec!["fire"]]
        );
    }

    #[test]
    fn empty_statements_are_yielded_empty() {
        assert_eq!(texts(";;echo"), vec![vec![], vec![], vec!["echo"]]);
        assert!(texts("").is_empty());
    }
}
