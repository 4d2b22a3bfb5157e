//! Compound selectors and the predicates they are made of.
//!
//! A compound is one combinator-free block such as
//! `input.big[type=radio]:not(:checked)`. The parser turns it into a list of
//! typed [`Predicate`]s once; matching never looks at the text again.
//!
//! Grammar per block: an optional tag name (or `*`) followed by any number of
//! `#id`, `.class`, `[attribute]`, `:pseudo`, and `:pseudo(argument)` parts.

use std::fmt;

use strum_macros::{Display, EnumString};

use crate::cursor::Cursor;
use crate::error::{Result, SelectorError};
use crate::tokenizer::{Chunks, SelectorList};

/// One condition a node must satisfy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    /// [§ 5.2 Universal selector](https://www.w3.org/TR/selectors-4/#universal-selector)
    ///
    /// `*`: any element.
    Universal,

    /// [§ 5.1 Type selector](https://www.w3.org/TR/selectors-4/#type-selectors)
    ///
    /// Case-insensitive in HTML documents, exact in XML documents.
    Tag(String),

    /// [§ 6.7 ID selector](https://www.w3.org/TR/selectors-4/#id-selectors)
    Id(String),

    /// [§ 6.6 Class selector](https://www.w3.org/TR/selectors-4/#class-html)
    Class(String),

    /// [§ 6.4 Attribute selectors](https://www.w3.org/TR/selectors-4/#attribute-selectors)
    Attribute(AttributeSelector),

    /// Element position among its element siblings.
    Child(ChildPosition),

    /// Named state or content tests such as `:checked` or `:has(p)`.
    Pseudo(PseudoClass),

    /// Index within the candidate list being filtered, not within the tree.
    Position(Position),
}

impl Predicate {
    /// Whether this predicate depends on the order of the candidate list.
    #[must_use]
    pub const fn is_positional(&self) -> bool {
        matches!(self, Self::Position(_))
    }

    /// Whether this predicate, or any selector nested in its `:not()` or
    /// `:has()` argument, is positional.
    #[must_use]
    pub fn has_positional(&self) -> bool {
        match self {
            Self::Position(_) => true,
            Self::Pseudo(PseudoClass::Not(list) | PseudoClass::Has(list)) => {
                list.branches().iter().any(Chunks::has_positional)
            }
            _ => false,
        }
    }

    /// Whether this predicate only looks at the node's own tag, id, class,
    /// or attributes.
    #[must_use]
    pub const fn is_plain(&self) -> bool {
        matches!(
            self,
            Self::Universal | Self::Tag(_) | Self::Id(_) | Self::Class(_) | Self::Attribute(_)
        )
    }
}

/// An attribute test: `[name]` or `[name op value]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeSelector {
    /// Attribute name, escapes resolved.
    pub name: String,
    /// `None` for a bare presence test.
    pub operator: Option<AttrOperator>,
    /// Operand, escapes and quotes resolved. Empty for presence tests.
    pub value: String,
}

/// Attribute comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum AttrOperator {
    /// `=`: exact match.
    #[strum(serialize = "=")]
    Equals,
    /// `!=`: different value, or attribute absent.
    #[strum(serialize = "!=")]
    NotEquals,
    /// `~=`: one of the whitespace-separated words.
    #[strum(serialize = "~=")]
    Includes,
    /// `|=`: exact, or followed by `-`.
    #[strum(serialize = "|=")]
    DashMatch,
    /// `^=`: prefix.
    #[strum(serialize = "^=")]
    Prefix,
    /// `$=`: suffix.
    #[strum(serialize = "$=")]
    Suffix,
    /// `*=`: substring.
    #[strum(serialize = "*=")]
    Substring,
}

impl AttrOperator {
    /// The operator whose first character is `c` (the `=` that follows is
    /// consumed separately).
    const fn from_prefix(c: char) -> Option<Self> {
        match c {
            '!' => Some(Self::NotEquals),
            '~' => Some(Self::Includes),
            '|' => Some(Self::DashMatch),
            '^' => Some(Self::Prefix),
            '$' => Some(Self::Suffix),
            '*' => Some(Self::Substring),
            _ => None,
        }
    }
}

/// [§ 14.4 Child-indexed pseudo-classes](https://www.w3.org/TR/selectors-4/#child-index)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildPosition {
    /// `:first-child`
    First,
    /// `:last-child`
    Last,
    /// `:only-child`
    Only,
    /// `:nth-child(an+b)`
    Nth(NthStep),
}

/// The `an+b` form of an `:nth-child` argument.
///
/// A 1-based position `p` matches when `p - offset` is a non-negative
/// multiple of `step`, or, when `step` is zero, when `p == offset`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NthStep {
    /// `a`
    pub step: i64,
    /// `b`
    pub offset: i64,
}

impl NthStep {
    /// Normalize `even`, `odd`, an integer, or `an+b` (whitespace anywhere,
    /// optional leading `+`). Returns `None` for anything else.
    ///
    /// ```
    /// use koala_select::NthStep;
    ///
    /// assert_eq!(NthStep::parse("odd"), NthStep::parse("2n+1"));
    /// assert_eq!(NthStep::parse("3"), NthStep::parse("0n+3"));
    /// assert_eq!(NthStep::parse("-n + 6"), Some(NthStep { step: -1, offset: 6 }));
    /// assert_eq!(NthStep::parse("2n+"), None);
    /// ```
    #[must_use]
    pub fn parse(argument: &str) -> Option<Self> {
        let compact: String = argument.chars().filter(|c| !c.is_whitespace()).collect();
        let text = compact.strip_prefix('+').unwrap_or(&compact);

        match text {
            "even" => return Some(Self { step: 2, offset: 0 }),
            "odd" => return Some(Self { step: 2, offset: 1 }),
            _ => {}
        }

        let (negative, unsigned) = match text.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, text),
        };
        let sign = if negative { -1 } else { 1 };

        let Some((coefficient, constant)) = unsigned.split_once('n') else {
            let value: i64 = digits(unsigned)?;
            return Some(Self {
                step: 0,
                offset: sign * value,
            });
        };

        let step = if coefficient.is_empty() {
            1
        } else {
            digits(coefficient)?
        };
        let offset = match constant.as_bytes().first() {
            None => 0,
            Some(b'+') => digits(&constant[1..])?,
            Some(b'-') => -digits(&constant[1..])?,
            Some(_) => return None,
        };
        Some(Self {
            step: sign * step,
            offset,
        })
    }

    /// Whether the 1-based element position matches.
    ///
    /// Any `i64` step and offset are accepted; the difference is taken in
    /// 128 bits so extreme offsets simply never match.
    #[must_use]
    pub fn matches(self, position: i64) -> bool {
        if self.step == 1 && self.offset == 0 {
            return true;
        }
        let diff = i128::from(position) - i128::from(self.offset);
        let step = i128::from(self.step);
        if step == 0 {
            diff == 0
        } else {
            diff % step == 0 && diff / step >= 0
        }
    }
}

/// A non-empty run of ASCII digits.
fn digits(text: &str) -> Option<i64> {
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    text.parse().ok()
}

/// Named pseudo-classes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PseudoClass {
    /// Form control that is not disabled and not a hidden input.
    Enabled,
    /// Form control carrying `disabled`.
    Disabled,
    /// `input` carrying `checked`.
    Checked,
    /// `option` carrying `selected`.
    Selected,
    /// Has at least one child node of any kind.
    Parent,
    /// Has no child nodes.
    Empty,
    /// Tag name contains `h` followed by a digit.
    Header,
    /// `input` with no `type` or `type="text"`.
    Text,
    /// `input[type=radio]`
    Radio,
    /// `input[type=checkbox]`
    Checkbox,
    /// `input[type=file]`
    File,
    /// `input[type=password]`
    Password,
    /// `input` or `button` of type `submit` (a `button`'s default type).
    Submit,
    /// `input[type=image]`
    Image,
    /// `input` or `button` of type `reset`.
    Reset,
    /// `button` element or `input[type=button]`.
    Button,
    /// `input`, `select`, `textarea`, or `button`.
    Input,
    /// The document's active element.
    Focus,
    /// Text content contains the argument.
    Contains(String),
    /// At least one descendant matches the argument.
    Has(SelectorList),
    /// The node does not match the argument.
    Not(SelectorList),
}

/// [jQuery positional filters](https://api.jquery.com/category/selectors/jquery-selector-extensions/)
///
/// Indices are 0-based over the candidate list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Position {
    /// `:first`
    First,
    /// `:last`
    Last,
    /// `:even` (0-based, so the 1st, 3rd, ...)
    Even,
    /// `:odd`
    Odd,
    /// `:eq(n)` and its alias `:nth(n)`
    Eq(usize),
    /// `:lt(n)`
    Lt(usize),
    /// `:gt(n)`
    Gt(usize),
}

impl Position {
    /// Whether the candidate at `index` of a list of `len` passes.
    #[must_use]
    pub const fn matches(self, index: usize, len: usize) -> bool {
        match self {
            Self::First => index == 0,
            Self::Last => index + 1 == len,
            Self::Even => index % 2 == 0,
            Self::Odd => index % 2 == 1,
            Self::Eq(n) => index == n,
            Self::Lt(n) => index < n,
            Self::Gt(n) => index > n,
        }
    }
}

/// Every pseudo-class name the parser accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, Display)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
enum PseudoName {
    FirstChild,
    LastChild,
    OnlyChild,
    NthChild,
    First,
    Last,
    Even,
    Odd,
    Eq,
    Nth,
    Lt,
    Gt,
    Enabled,
    Disabled,
    Checked,
    Selected,
    Parent,
    Empty,
    Header,
    Text,
    Radio,
    Checkbox,
    File,
    Password,
    Submit,
    Image,
    Reset,
    Button,
    Input,
    Focus,
    Contains,
    Has,
    Not,
}

/// [§ 4.2 Compound selectors](https://www.w3.org/TR/selectors-4/#compound)
///
/// "A compound selector is a sequence of simple selectors that are not
/// separated by a combinator."
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Compound {
    source: String,
    predicates: Vec<Predicate>,
}

impl Compound {
    /// Parse one block.
    ///
    /// # Errors
    ///
    /// Returns a [`SelectorError`] for unknown syntax, unknown pseudo-class
    /// names, missing or unexpected pseudo-class arguments, and unterminated
    /// brackets, quotes, or escapes.
    pub fn parse(source: &str) -> Result<Self> {
        let mut cursor = Cursor::new(source);
        let mut predicates = Vec::new();

        if cursor.eat('*') {
            predicates.push(Predicate::Universal);
        } else {
            let tag = cursor.ident()?;
            if !tag.is_empty() {
                predicates.push(Predicate::Tag(tag));
            }
        }

        while let Some(c) = cursor.bump() {
            let predicate = match c {
                '#' => Predicate::Id(required_ident(&mut cursor)?),
                '.' => Predicate::Class(required_ident(&mut cursor)?),
                '[' => Predicate::Attribute(parse_attribute(&mut cursor)?),
                ':' => parse_pseudo(&mut cursor)?,
                _ => return Err(cursor.unrecognized()),
            };
            predicates.push(predicate);
        }

        if predicates.is_empty() {
            return Err(cursor.unrecognized());
        }

        Ok(Self {
            source: source.to_string(),
            predicates,
        })
    }

    /// A compound built from already-parsed predicates.
    pub(crate) fn from_predicates(predicates: Vec<Predicate>) -> Self {
        let source = predicates
            .iter()
            .map(ToString::to_string)
            .collect::<String>();
        Self { source, predicates }
    }

    /// The block text as written.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// The parsed predicates in source order.
    #[must_use]
    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }

    /// The first `#id` in the block.
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.predicates.iter().find_map(|p| match p {
            Predicate::Id(id) => Some(id.as_str()),
            _ => None,
        })
    }

    /// Whether any predicate is positional (`:first`, `:eq(2)`, ...),
    /// including inside nested `:not()` and `:has()` arguments.
    #[must_use]
    pub fn has_positional(&self) -> bool {
        self.predicates.iter().any(Predicate::has_positional)
    }

    /// The tag name when the block is nothing but a plain word tag such as
    /// `div` or `h1`. Such blocks are compared by name without filtering.
    #[must_use]
    pub fn bare_tag(&self) -> Option<&str> {
        match self.predicates.as_slice() {
            [Predicate::Tag(tag)]
                if tag.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_') =>
            {
                Some(tag)
            }
            _ => None,
        }
    }

    /// The predicates left once the one at `consumed` has been answered by
    /// an index lookup.
    pub(crate) fn residual(&self, consumed: Option<usize>) -> Vec<&Predicate> {
        self.predicates
            .iter()
            .enumerate()
            .filter(|&(i, _)| Some(i) != consumed)
            .map(|(_, predicate)| predicate)
            .collect()
    }

    /// Split into the node-local part and the pseudo-class part. The local
    /// part falls back to `*` so it can still be looked up.
    pub(crate) fn split_pseudo(&self) -> (Self, Vec<&Predicate>) {
        let local: Vec<Predicate> = self
            .predicates
            .iter()
            .filter(|p| p.is_plain())
            .cloned()
            .collect();
        let later = self.predicates.iter().filter(|p| !p.is_plain()).collect();
        let base = if local.is_empty() {
            Self::from_predicates(vec![Predicate::Universal])
        } else {
            Self::from_predicates(local)
        };
        (base, later)
    }
}

impl fmt::Display for Compound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Universal => f.write_str("*"),
            Self::Tag(tag) => f.write_str(tag),
            Self::Id(id) => write!(f, "#{id}"),
            Self::Class(class) => write!(f, ".{class}"),
            Self::Attribute(attr) => match attr.operator {
                Some(op) => write!(f, "[{}{op}\"{}\"]", attr.name, attr.value),
                None => write!(f, "[{}]", attr.name),
            },
            Self::Child(child) => match child {
                ChildPosition::First => f.write_str(":first-child"),
                ChildPosition::Last => f.write_str(":last-child"),
                ChildPosition::Only => f.write_str(":only-child"),
                ChildPosition::Nth(nth) => write!(f, ":nth-child({}n{:+})", nth.step, nth.offset),
            },
            Self::Pseudo(pseudo) => match pseudo {
                PseudoClass::Contains(text) => write!(f, ":contains({text})"),
                PseudoClass::Has(list) => write!(f, ":has({})", list.source()),
                PseudoClass::Not(list) => write!(f, ":not({})", list.source()),
                other => write!(f, ":{}", pseudo_keyword(other)),
            },
            Self::Position(position) => match position {
                Position::First => f.write_str(":first"),
                Position::Last => f.write_str(":last"),
                Position::Even => f.write_str(":even"),
                Position::Odd => f.write_str(":odd"),
                Position::Eq(n) => write!(f, ":eq({n})"),
                Position::Lt(n) => write!(f, ":lt({n})"),
                Position::Gt(n) => write!(f, ":gt({n})"),
            },
        }
    }
}

const fn pseudo_keyword(pseudo: &PseudoClass) -> &'static str {
    match pseudo {
        PseudoClass::Enabled => "enabled",
        PseudoClass::Disabled => "disabled",
        PseudoClass::Checked => "checked",
        PseudoClass::Selected => "selected",
        PseudoClass::Parent => "parent",
        PseudoClass::Empty => "empty",
        PseudoClass::Header => "header",
        PseudoClass::Text => "text",
        PseudoClass::Radio => "radio",
        PseudoClass::Checkbox => "checkbox",
        PseudoClass::File => "file",
        PseudoClass::Password => "password",
        PseudoClass::Submit => "submit",
        PseudoClass::Image => "image",
        PseudoClass::Reset => "reset",
        PseudoClass::Button => "button",
        PseudoClass::Input => "input",
        PseudoClass::Focus => "focus",
        PseudoClass::Contains(_) => "contains",
        PseudoClass::Has(_) => "has",
        PseudoClass::Not(_) => "not",
    }
}

fn required_ident(cursor: &mut Cursor<'_>) -> Result<String> {
    let ident = cursor.ident()?;
    if ident.is_empty() {
        return Err(cursor.unrecognized());
    }
    Ok(ident)
}

/// [§ 6.4 Attribute selectors](https://www.w3.org/TR/selectors-4/#attribute-selectors)
///
/// Parses after the opening `[` through the closing `]`.
fn parse_attribute(cursor: &mut Cursor<'_>) -> Result<AttributeSelector> {
    cursor.skip_whitespace();
    let name = required_ident(cursor)?;
    cursor.skip_whitespace();

    if cursor.eat(']') {
        return Ok(AttributeSelector {
            name,
            operator: None,
            value: String::new(),
        });
    }

    let operator = match cursor.bump() {
        None => return Err(cursor.unterminated()),
        Some('=') => AttrOperator::Equals,
        Some(c) => {
            let op = AttrOperator::from_prefix(c).ok_or_else(|| cursor.unrecognized())?;
            if !cursor.eat('=') {
                return Err(cursor.unrecognized());
            }
            op
        }
    };

    cursor.skip_whitespace();
    let value = match cursor.peek() {
        Some(quote @ ('"' | '\'')) => {
            let _ = cursor.bump();
            cursor.quoted(quote)?
        }
        _ => {
            let hash = cursor.eat('#');
            let word = cursor.ident()?;
            if hash { format!("#{word}") } else { word }
        }
    };

    cursor.skip_whitespace();
    match cursor.bump() {
        Some(']') => Ok(AttributeSelector {
            name,
            operator: Some(operator),
            value,
        }),
        None => Err(cursor.unterminated()),
        Some(_) => Err(cursor.unrecognized()),
    }
}

/// [§ 4 Pseudo-classes](https://www.w3.org/TR/selectors-4/#pseudo-classes)
///
/// Parses after the `:` through the closing `)` of an argument, if any.
fn parse_pseudo(cursor: &mut Cursor<'_>) -> Result<Predicate> {
    let name = required_ident(cursor)?;
    let argument = if cursor.eat('(') {
        Some(cursor.group(')')?)
    } else {
        None
    };

    let kind: PseudoName = name
        .parse()
        .map_err(|_| SelectorError::UnknownPseudoClass(name.clone()))?;

    let no_argument = |predicate: Predicate| match argument {
        Some(_) => Err(SelectorError::UnexpectedArgument(kind.to_string())),
        None => Ok(predicate),
    };
    let required = || argument.ok_or_else(|| SelectorError::MissingArgument(kind.to_string()));

    match kind {
        PseudoName::FirstChild => no_argument(Predicate::Child(ChildPosition::First)),
        PseudoName::LastChild => no_argument(Predicate::Child(ChildPosition::Last)),
        PseudoName::OnlyChild => no_argument(Predicate::Child(ChildPosition::Only)),
        PseudoName::NthChild => {
            let nth = NthStep::parse(required()?).ok_or_else(|| cursor.unrecognized())?;
            Ok(Predicate::Child(ChildPosition::Nth(nth)))
        }

        PseudoName::First => no_argument(Predicate::Position(Position::First)),
        PseudoName::Last => no_argument(Predicate::Position(Position::Last)),
        PseudoName::Even => no_argument(Predicate::Position(Position::Even)),
        PseudoName::Odd => no_argument(Predicate::Position(Position::Odd)),
        PseudoName::Eq | PseudoName::Nth | PseudoName::Lt | PseudoName::Gt => {
            let index: usize = required()?
                .trim()
                .parse()
                .map_err(|_| cursor.unrecognized())?;
            let position = match kind {
                PseudoName::Lt => Position::Lt(index),
                PseudoName::Gt => Position::Gt(index),
                _ => Position::Eq(index),
            };
            Ok(Predicate::Position(position))
        }

        PseudoName::Enabled => no_argument(Predicate::Pseudo(PseudoClass::Enabled)),
        PseudoName::Disabled => no_argument(Predicate::Pseudo(PseudoClass::Disabled)),
        PseudoName::Checked => no_argument(Predicate::Pseudo(PseudoClass::Checked)),
        PseudoName::Selected => no_argument(Predicate::Pseudo(PseudoClass::Selected)),
        PseudoName::Parent => no_argument(Predicate::Pseudo(PseudoClass::Parent)),
        PseudoName::Empty => no_argument(Predicate::Pseudo(PseudoClass::Empty)),
        PseudoName::Header => no_argument(Predicate::Pseudo(PseudoClass::Header)),
        PseudoName::Text => no_argument(Predicate::Pseudo(PseudoClass::Text)),
        PseudoName::Radio => no_argument(Predicate::Pseudo(PseudoClass::Radio)),
        PseudoName::Checkbox => no_argument(Predicate::Pseudo(PseudoClass::Checkbox)),
        PseudoName::File => no_argument(Predicate::Pseudo(PseudoClass::File)),
        PseudoName::Password => no_argument(Predicate::Pseudo(PseudoClass::Password)),
        PseudoName::Submit => no_argument(Predicate::Pseudo(PseudoClass::Submit)),
        PseudoName::Image => no_argument(Predicate::Pseudo(PseudoClass::Image)),
        PseudoName::Reset => no_argument(Predicate::Pseudo(PseudoClass::Reset)),
        PseudoName::Button => no_argument(Predicate::Pseudo(PseudoClass::Button)),
        PseudoName::Input => no_argument(Predicate::Pseudo(PseudoClass::Input)),
        PseudoName::Focus => no_argument(Predicate::Pseudo(PseudoClass::Focus)),

        PseudoName::Contains => Ok(Predicate::Pseudo(PseudoClass::Contains(
            unquote(required()?).to_string(),
        ))),
        PseudoName::Has => Ok(Predicate::Pseudo(PseudoClass::Has(SelectorList::parse(
            unquote(required()?),
        )?))),
        PseudoName::Not => Ok(Predicate::Pseudo(PseudoClass::Not(SelectorList::parse(
            unquote(required()?),
        )?))),
    }
}

/// Strip one pair of matching quotes around a pseudo-class argument.
fn unquote(argument: &str) -> &str {
    let trimmed = argument.trim();
    for quote in ['"', '\''] {
        if trimmed.len() >= 2 && trimmed.starts_with(quote) && trimmed.ends_with(quote) {
            return &trimmed[1..trimmed.len() - 1];
        }
    }
    argument
}
