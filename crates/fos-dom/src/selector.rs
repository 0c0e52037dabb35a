//! Selector matching
//!
//! The compound-selector subset of Selectors Level 4 that `querySelectorAll`
//! and `closest` need here: type and universal selectors, `#id`, `.class`,
//! all attribute matchers, `:not(<compound>)`, and comma-separated lists.
//! Combinators are rejected.

use std::borrow::Cow;

use crate::ElementData;

/// Selector parse errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SelectorError {
    #[error("empty selector")]
    Empty,

    #[error("unexpected '{ch}' at offset {pos}")]
    UnexpectedChar { pos: usize, ch: char },

    #[error("unexpected end of selector")]
    UnexpectedEnd,

    #[error("unsupported pseudo-class :{0}")]
    UnsupportedPseudo(String),
}

/// Comma-separated list of compound selectors
#[derive(Debug, Clone, PartialEq)]
pub struct SelectorList {
    selectors: Vec<CompoundSelector>,
}

/// Compound selector, e.g. `input:not([type="hidden"])`
#[derive(Debug, Clone, PartialEq)]
pub struct CompoundSelector {
    /// Lowercase tag name, `None` for universal
    pub tag: Option<String>,
    pub conditions: Vec<Condition>,
}

/// A simple selector applied on top of the type selector
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    Id(String),
    Class(String),
    Attribute(AttributeSelector),
    Not(Box<CompoundSelector>),
}

/// Attribute selector
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeSelector {
    pub name: String,
    pub matcher: Option<AttributeMatcher>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AttributeMatcher {
    /// [attr=value] - exact match
    Exact(String),
    /// [attr~=value] - whitespace-separated list contains
    Contains(String),
    /// [attr|=value] - exact or prefix with hyphen
    DashMatch(String),
    /// [attr^=value] - starts with
    Prefix(String),
    /// [attr$=value] - ends with
    Suffix(String),
    /// [attr*=value] - contains substring
    Substring(String),
}

/// HTML attributes whose values match selectors ASCII case-insensitively
const CASE_INSENSITIVE_ATTRIBUTES: &[&str] = &[
    "accept", "accept-charset", "align", "alink", "axis", "bgcolor", "charset", "checked",
    "clear", "codetype", "color", "compact", "declare", "defer", "dir", "direction", "disabled",
    "enctype", "face", "frame", "hreflang", "http-equiv", "lang", "language", "link", "media",
    "method", "multiple", "nohref", "noresize", "noshade", "nowrap", "readonly", "rel", "rev",
    "rules", "scope", "scrolling", "selected", "shape", "target", "text", "type", "valign",
    "valuetype", "vlink",
];

impl AttributeSelector {
    /// Check if an attribute value matches
    pub fn matches(&self, value: Option<&str>) -> bool {
        let Some(val) = value else {
            return false;
        };
        let Some(matcher) = &self.matcher else {
            return true;
        };
        let fold = CASE_INSENSITIVE_ATTRIBUTES.contains(&self.name.as_str());
        let folded = fold_case(val, fold);
        let val: &str = &folded;
        match matcher {
            AttributeMatcher::Exact(expected) => val == fold_case(expected, fold),
            AttributeMatcher::Contains(expected) => {
                let expected = fold_case(expected, fold);
                val.split_whitespace().any(|w| w == expected)
            }
            AttributeMatcher::DashMatch(expected) => {
                let expected = fold_case(expected, fold);
                val == expected || val.strip_prefix(&*expected).is_some_and(|rest| rest.starts_with('-'))
            }
            AttributeMatcher::Prefix(expected) => !expected.is_empty() && val.starts_with(&*fold_case(expected, fold)),
            AttributeMatcher::Suffix(expected) => !expected.is_empty() && val.ends_with(&*fold_case(expected, fold)),
            AttributeMatcher::Substring(expected) => !expected.is_empty() && val.contains(&*fold_case(expected, fold)),
        }
    }
}

fn fold_case(value: &str, fold: bool) -> Cow<'_, str> {
    if fold {
        Cow::Owned(value.to_ascii_lowercase())
    } else {
        Cow::Borrowed(value)
    }
}

impl CompoundSelector {
    pub fn matches(&self, elem: &ElementData) -> bool {
        if let Some(tag) = &self.tag {
            if !elem.name.eq_ignore_ascii_case(tag) {
                return false;
            }
        }
        self.conditions.iter().all(|condition| match condition {
            Condition::Id(id) => elem.id() == Some(id.as_str()),
            Condition::Class(class) => elem.has_class(class),
            Condition::Attribute(attr) => attr.matches(elem.get_attr(&attr.name)),
            Condition::Not(inner) => !inner.matches(elem),
        })
    }
}

impl SelectorList {
    /// Parse a selector list
    pub fn parse(input: &str) -> Result<Self, SelectorError> {
        let mut parser = Parser { input, pos: 0 };
        let mut selectors = Vec::new();
        loop {
            parser.skip_whitespace();
            selectors.push(parser.compound()?);
            parser.skip_whitespace();
            match parser.peek() {
                None => break,
                Some(',') => parser.bump(),
                Some(ch) => return Err(SelectorError::UnexpectedChar { pos: parser.pos, ch }),
            }
        }
        Ok(Self { selectors })
    }

    /// True if any selector in the list matches
    pub fn matches(&self, elem: &ElementData) -> bool {
        self.selectors.iter().any(|s| s.matches(elem))
    }

    pub fn selectors(&self) -> &[CompoundSelector] {
        &self.selectors
    }
}

impl std::str::FromStr for SelectorList {
    type Err = SelectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

struct Parser<'a> {
    input: &'a str,
    pos: usize,
}

impl Parser<'_> {
    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn bump(&mut self) {
        if let Some(ch) = self.peek() {
            self.pos += ch.len_utf8();
        }
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.bump();
        }
    }

    fn expect(&mut self, expected: char) -> Result<(), SelectorError> {
        match self.peek() {
            Some(ch) if ch == expected => {
                self.bump();
                Ok(())
            }
            Some(ch) => Err(SelectorError::UnexpectedChar { pos: self.pos, ch }),
            None => Err(SelectorError::UnexpectedEnd),
        }
    }

    fn ident(&mut self) -> Result<&str, SelectorError> {
        let start = self.pos;
        while self
            .peek()
            .is_some_and(|c| c.is_alphanumeric() || c == '-' || c == '_')
        {
            self.bump();
        }
        if start == self.pos {
            return match self.peek() {
                Some(ch) => Err(SelectorError::UnexpectedChar { pos: self.pos, ch }),
                None => Err(SelectorError::UnexpectedEnd),
            };
        }
        Ok(&self.input[start..self.pos])
    }

    fn compound(&mut self) -> Result<CompoundSelector, SelectorError> {
        let mut universal = false;
        let tag = match self.peek() {
            Some('*') => {
                self.bump();
                universal = true;
                None
            }
            Some(c) if c.is_alphabetic() => Some(self.ident()?.to_ascii_lowercase()),
            _ => None,
        };

        let mut conditions = Vec::new();
        loop {
            match self.peek() {
                Some('[') => conditions.push(Condition::Attribute(self.attribute()?)),
                Some('.') => {
                    self.bump();
                    conditions.push(Condition::Class(self.ident()?.to_string()));
                }
                Some('#') => {
                    self.bump();
                    conditions.push(Condition::Id(self.ident()?.to_string()));
                }
                Some(':') => {
                    self.bump();
                    let name = self.ident()?.to_ascii_lowercase();
                    if name != "not" {
                        return Err(SelectorError::UnsupportedPseudo(name));
                    }
                    self.expect('(')?;
                    self.skip_whitespace();
                    let inner = self.compound()?;
                    self.skip_whitespace();
                    self.expect(')')?;
                    conditions.push(Condition::Not(Box::new(inner)));
                }
                _ => break,
            }
        }

        if tag.is_none() && !universal && conditions.is_empty() {
            return match self.peek() {
                Some(ch) => Err(SelectorError::UnexpectedChar { pos: self.pos, ch }),
                None => Err(SelectorError::Empty),
            };
        }
        Ok(CompoundSelector { tag, conditions })
    }

    fn attribute(&mut self) -> Result<AttributeSelector, SelectorError> {
        self.expect('[')?;
        self.skip_whitespace();
        let name = self.ident()?.to_ascii_lowercase();
        self.skip_whitespace();

        if self.peek() == Some(']') {
            self.bump();
            return Ok(AttributeSelector { name, matcher: None });
        }

        let op = match self.peek() {
            Some('=') => '=',
            Some(op @ ('~' | '|' | '^' | '$' | '*')) => {
                self.bump();
                op
            }
            Some(ch) => return Err(SelectorError::UnexpectedChar { pos: self.pos, ch }),
            None => return Err(SelectorError::UnexpectedEnd),
        };
        self.expect('=')?;
        self.skip_whitespace();
        let value = self.attribute_value()?;
        self.skip_whitespace();
        self.expect(']')?;

        let matcher = match op {
            '~' => AttributeMatcher::Contains(value),
            '|' => AttributeMatcher::DashMatch(value),
            '^' => AttributeMatcher::Prefix(value),
            '$' => AttributeMatcher::Suffix(value),
            '*' => AttributeMatcher::Substring(value),
            _ => AttributeMatcher::Exact(value),
        };
        Ok(AttributeSelector { name, matcher: Some(matcher) })
    }

    fn attribute_value(&mut self) -> Result<String, SelectorError> {
        match self.peek() {
            Some(quote @ ('"' | '\'')) => {
                self.bump();
                let start = self.pos;
                loop {
                    match self.peek() {
                        Some(ch) if ch == quote => break,
                        Some(_) => self.bump(),
                        None => return Err(SelectorError::UnexpectedEnd),
                    }
                }
                let value = self.input[start..self.pos].to_string();
                self.bump();
                Ok(value)
            }
            _ => Ok(self.ident()?.to_string()),
        }
    }
}
