//! Selector tokenizer.
//!
//! [§ 4 Selector syntax](https://www.w3.org/TR/selectors-4/#syntax)
//!
//! Splits one selector into compound blocks and the combinators between
//! them, stopping at the first top-level comma. Bracketed attribute tests,
//! parenthesized pseudo-class arguments, quoted strings, and escaped
//! characters are opaque to combinator and comma detection, at any nesting
//! depth.

use std::fmt;

use strum_macros::{Display, IntoStaticStr};

use crate::compound::{Compound, Predicate};
use crate::cursor::Cursor;
use crate::error::{Result, SelectorError};

/// [§ 16 Combinators](https://www.w3.org/TR/selectors-4/#combinators)
///
/// "A combinator is punctuation that represents a particular kind of
/// relationship between the selectors on either side."
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, IntoStaticStr)]
pub enum Combinator {
    /// [§ 16.1 Descendant combinator](https://www.w3.org/TR/selectors-4/#descendant-combinators)
    ///
    /// Whitespace between two blocks.
    #[strum(serialize = "")]
    Descendant,
    /// [§ 16.2 Child combinator](https://www.w3.org/TR/selectors-4/#child-combinators) `>`
    #[strum(serialize = ">")]
    Child,
    /// [§ 16.3 Next-sibling combinator](https://www.w3.org/TR/selectors-4/#adjacent-sibling-combinators) `+`
    #[strum(serialize = "+")]
    Adjacent,
    /// [§ 16.4 Subsequent-sibling combinator](https://www.w3.org/TR/selectors-4/#general-sibling-combinators) `~`
    #[strum(serialize = "~")]
    General,
}

impl Combinator {
    const fn from_char(c: char) -> Option<Self> {
        match c {
            '>' => Some(Self::Child),
            '+' => Some(Self::Adjacent),
            '~' => Some(Self::General),
            _ => None,
        }
    }

    /// The written form; empty for the descendant combinator.
    #[must_use]
    pub fn symbol(self) -> &'static str {
        self.into()
    }

    /// Whether this combinator relates siblings rather than ancestors.
    #[must_use]
    pub const fn is_sibling(self) -> bool {
        matches!(self, Self::Adjacent | Self::General)
    }
}

/// One element of a tokenized selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Part {
    /// A combinator-free block.
    Compound(Compound),
    /// An explicit `>`, `+`, or `~`. Descendant relationships are implied by
    /// two adjacent compounds and never appear here.
    Combinator(Combinator),
}

impl Part {
    /// The text this part was scanned from.
    #[must_use]
    pub fn source(&self) -> &str {
        match self {
            Self::Compound(compound) => compound.source(),
            Self::Combinator(combinator) => combinator.symbol(),
        }
    }
}

/// One tokenized selector plus whatever followed its top-level comma.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunks {
    /// Blocks and explicit combinators in source order.
    pub parts: Vec<Part>,
    /// Text after the first top-level comma, trimmed.
    pub rest: Option<String>,
}

impl Chunks {
    /// Whether any block uses a positional pseudo-class, nested arguments
    /// included.
    #[must_use]
    pub fn has_positional(&self) -> bool {
        self.parts.iter().any(|part| match part {
            Part::Compound(compound) => compound.has_positional(),
            Part::Combinator(_) => false,
        })
    }
}

impl fmt::Display for Chunks {
    /// The consumed selector with single spaces between parts.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, part) in self.parts.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            f.write_str(part.source())?;
        }
        Ok(())
    }
}

/// Tokenize the first selector of a (possibly comma-separated) list.
///
/// Blank input yields no parts. Compound blocks are parsed as they are
/// scanned, so every syntax error surfaces here.
///
/// # Errors
///
/// Returns a [`SelectorError`] when a block fails to parse, a bracket,
/// parenthesis, quote, or escape is left open, a closing bracket has no
/// opener, a branch of the list is empty, the selector ends in a combinator,
/// or two combinators are adjacent.
///
/// ```
/// use koala_select::{Combinator, Part, tokenize};
///
/// let chunks = tokenize("ul > li:nth-child(2n+1) a, p").unwrap();
/// assert_eq!(chunks.parts.len(), 4);
/// assert_eq!(chunks.parts[1], Part::Combinator(Combinator::Child));
/// assert_eq!(chunks.rest.as_deref(), Some("p"));
/// ```
pub fn tokenize(selector: &str) -> Result<Chunks> {
    let mut cursor = Cursor::new(selector);
    let mut parts = Vec::new();
    let mut rest = None;

    loop {
        cursor.skip_whitespace();
        let Some(c) = cursor.peek() else {
            break;
        };

        if c == ',' {
            let _ = cursor.bump();
            let remainder = cursor.remaining().trim();
            if parts.is_empty() || remainder.is_empty() {
                return Err(SelectorError::Unrecognized(selector.to_string()));
            }
            rest = Some(remainder.to_string());
            break;
        }

        if let Some(combinator) = Combinator::from_char(c) {
            let _ = cursor.bump();
            if matches!(parts.last(), Some(Part::Combinator(_))) {
                return Err(SelectorError::Unrecognized(selector.to_string()));
            }
            parts.push(Part::Combinator(combinator));
            continue;
        }

        let block = scan_block(&mut cursor)?;
        parts.push(Part::Compound(Compound::parse(block)?));
    }

    if matches!(parts.last(), Some(Part::Combinator(_))) {
        return Err(SelectorError::Unrecognized(selector.to_string()));
    }

    Ok(Chunks { parts, rest })
}

/// Scan one block: everything up to whitespace, a combinator, or a comma
/// that is not inside brackets, parentheses, or an escape.
fn scan_block<'s>(cursor: &mut Cursor<'s>) -> Result<&'s str> {
    let start = cursor.pos();
    while let Some(c) = cursor.peek() {
        if c.is_whitespace() || c == ',' || Combinator::from_char(c).is_some() {
            break;
        }
        let _ = cursor.bump();
        match c {
            '\\' => {
                let _ = cursor.bump().ok_or_else(|| cursor.unterminated())?;
            }
            '[' => {
                let _ = cursor.group(']')?;
            }
            '(' => {
                let _ = cursor.group(')')?;
            }
            ']' | ')' => return Err(cursor.unrecognized()),
            _ => {}
        }
    }
    Ok(cursor.slice(start))
}

/// A comma-separated selector list, every branch tokenized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorList {
    source: String,
    branches: Vec<Chunks>,
}

impl SelectorList {
    /// Tokenize every branch of `selector`.
    ///
    /// # Errors
    ///
    /// Returns the first branch's [`SelectorError`], or
    /// [`SelectorError::Unrecognized`] for a blank selector.
    pub fn parse(selector: &str) -> Result<Self> {
        let mut branches = Vec::new();
        let mut next = Some(selector.to_string());

        while let Some(text) = next {
            let chunks = tokenize(&text)?;
            if chunks.parts.is_empty() {
                return Err(SelectorError::Unrecognized(selector.to_string()));
            }
            next = chunks.rest.clone();
            branches.push(chunks);
        }

        Ok(Self {
            source: selector.trim().to_string(),
            branches,
        })
    }

    /// The list text as written, trimmed.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Every branch in source order.
    #[must_use]
    pub fn branches(&self) -> &[Chunks] {
        &self.branches
    }

    /// The lone predicate of a list that is exactly one block holding one
    /// non-tag, non-positional predicate, such as `.a` or `[href]`.
    pub(crate) fn single_predicate(&self) -> Option<&Predicate> {
        let [branch] = self.branches.as_slice() else {
            return None;
        };
        let [Part::Compound(compound)] = branch.parts.as_slice() else {
            return None;
        };
        match compound.predicates() {
            [predicate]
                if !predicate.is_positional()
                    && !matches!(predicate, Predicate::Tag(_) | Predicate::Universal) =>
            {
                Some(predicate)
            }
            _ => None,
        }
    }
}
