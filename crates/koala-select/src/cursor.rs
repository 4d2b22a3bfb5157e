//! Character cursor shared by the tokenizer and the compound parser.

use crate::error::{Result, SelectorError};

/// [§ 4.3.9 ident code point](https://www.w3.org/TR/css-syntax-3/#ident-code-point)
///
/// ASCII letters, digits, `_`, `-`, and anything from U+00C0 up.
pub(crate) const fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-' || c >= '\u{c0}'
}

/// Byte-position cursor over one selector source string.
///
/// Errors carry the whole source so messages name the selector the caller
/// wrote, not the fragment being scanned.
pub(crate) struct Cursor<'s> {
    source: &'s str,
    pos: usize,
}

impl<'s> Cursor<'s> {
    pub(crate) const fn new(source: &'s str) -> Self {
        Self { source, pos: 0 }
    }

    pub(crate) fn peek(&self) -> Option<char> {
        self.source[self.pos..].chars().next()
    }

    pub(crate) fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    pub(crate) fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.pos += expected.len_utf8();
            true
        } else {
            false
        }
    }

    pub(crate) fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            let _ = self.bump();
        }
    }

    pub(crate) const fn pos(&self) -> usize {
        self.pos
    }

    pub(crate) fn slice(&self, start: usize) -> &'s str {
        &self.source[start..self.pos]
    }

    pub(crate) fn remaining(&self) -> &'s str {
        &self.source[self.pos..]
    }

    pub(crate) fn unrecognized(&self) -> SelectorError {
        SelectorError::Unrecognized(self.source.to_string())
    }

    pub(crate) fn unterminated(&self) -> SelectorError {
        SelectorError::Unterminated(self.source.to_string())
    }

    /// Consume an identifier, resolving backslash escapes. May be empty.
    pub(crate) fn ident(&mut self) -> Result<String> {
        let mut ident = String::new();
        while let Some(c) = self.peek() {
            if c == '\\' {
                let _ = self.bump();
                ident.push(self.bump().ok_or_else(|| self.unterminated())?);
            } else if is_ident_char(c) {
                ident.push(c);
                let _ = self.bump();
            } else {
                break;
            }
        }
        Ok(ident)
    }

    /// Consume a quoted string whose opening `quote` was already consumed,
    /// returning its unescaped content.
    pub(crate) fn quoted(&mut self, quote: char) -> Result<String> {
        let mut text = String::new();
        loop {
            match self.bump() {
                None => return Err(self.unterminated()),
                Some('\\') => text.push(self.bump().ok_or_else(|| self.unterminated())?),
                Some(c) if c == quote => return Ok(text),
                Some(c) => text.push(c),
            }
        }
    }

    /// Consume a bracketed group whose opener was already consumed, up to and
    /// including `close`. Nested groups, quoted strings, and escapes are
    /// opaque.
    /// Returns the raw content between the brackets.
    pub(crate) fn group(&mut self, close: char) -> Result<&'s str> {
        let start = self.pos;
        self.skip_group(close)?;
        Ok(&self.source[start..self.pos - close.len_utf8()])
    }

    /// Inside `[...]` every quote opens a string. Inside `(...)` only a quote
    /// that starts the argument does; later quotes are plain text, as in
    /// `:contains(don't)`.
    fn skip_group(&mut self, close: char) -> Result<()> {
        if close == ')' {
            self.skip_whitespace();
            if let Some(quote @ ('"' | '\'')) = self.peek() {
                let _ = self.bump();
                let _ = self.quoted(quote)?;
            }
        }
        loop {
            match self.bump() {
                None => return Err(self.unterminated()),
                Some('\\') => {
                    let _ = self.bump().ok_or_else(|| self.unterminated())?;
                }
                Some(quote @ ('"' | '\'')) if close == ']' => {
                    let _ = self.quoted(quote)?;
                }
                Some('(') => self.skip_group(')')?,
                Some('[') => self.skip_group(']')?,
                Some(c) if c == close => return Ok(()),
                Some(')' | ']') => return Err(self.unrecognized()),
                Some(_) => {}
            }
        }
    }
}
