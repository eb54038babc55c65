//! Element Query and Methods
//!
//! querySelectorAll, closest, matches over a CSS selector subset:
//! type/universal, `#id`, `.class`, attribute selectors
//! (`[a]`, `[a=v]`, `[a*=v]`, `[a^=v]`, `[a$=v]`, `[a~=v]`), `:not(...)`,
//! the descendant combinator and comma-separated lists.

use std::str::FromStr;

use crate::{DomTree, NodeId};

/// Selector parse errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SelectorError {
    #[error("empty selector")]
    Empty,
    #[error("unexpected {found:?} at offset {offset}")]
    Unexpected { found: char, offset: usize },
    #[error("unexpected end of selector")]
    UnexpectedEnd,
    #[error("unsupported pseudo-class :{0}")]
    UnsupportedPseudo(String),
}

/// Element query trait
pub trait ElementQuery {
    /// First descendant of `root` matching `selector`
    fn query_selector(&self, root: NodeId, selector: &str) -> Result<Option<NodeId>, SelectorError>;

    /// All descendants of `root` matching `selector`, in document order
    fn query_selector_all(&self, root: NodeId, selector: &str) -> Result<Vec<NodeId>, SelectorError>;

    /// Same as `query_selector_all` with a pre-parsed selector
    fn select(&self, root: NodeId, selector: &SelectorList) -> Vec<NodeId>;

    /// Get elements by tag name
    fn get_elements_by_tag_name(&self, root: NodeId, tag: &str) -> Vec<NodeId>;

    /// The element itself or its nearest ancestor matching `selector`
    fn closest(&self, element: NodeId, selector: &SelectorList) -> Option<NodeId>;

    /// Check if element matches selector
    fn matches(&self, element: NodeId, selector: &str) -> Result<bool, SelectorError>;
}

impl ElementQuery for DomTree {
    fn query_selector(&self, root: NodeId, selector: &str) -> Result<Option<NodeId>, SelectorError> {
        let selector = SelectorList::parse(selector)?;
        Ok(self.descendants(root)
            .map(|(id, _)| id)
            .find(|&id| selector.matches(self, id)))
    }

    fn query_selector_all(&self, root: NodeId, selector: &str) -> Result<Vec<NodeId>, SelectorError> {
        let selector = SelectorList::parse(selector)?;
        Ok(self.select(root, &selector))
    }

    fn select(&self, root: NodeId, selector: &SelectorList) -> Vec<NodeId> {
        self.descendants(root)
            .map(|(id, _)| id)
            .filter(|&id| selector.matches(self, id))
            .collect()
    }

    fn get_elements_by_tag_name(&self, root: NodeId, tag: &str) -> Vec<NodeId> {
        self.descendants(root)
            .map(|(id, _)| id)
            .filter(|&id| self.is_tag(id, tag))
            .collect()
    }

    fn closest(&self, element: NodeId, selector: &SelectorList) -> Option<NodeId> {
        std::iter::once(element)
            .chain(self.ancestors(element))
            .find(|&id| selector.matches(self, id))
    }

    fn matches(&self, element: NodeId, selector: &str) -> Result<bool, SelectorError> {
        Ok(SelectorList::parse(selector)?.matches(self, element))
    }
}

/// Comma-separated selector list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorList {
    selectors: Vec<ComplexSelector>,
}

/// Compound selectors joined by descendant combinators, left to right
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComplexSelector {
    compounds: Vec<CompoundSelector>,
}

/// Optional type selector plus simple selectors, e.g. `ul.dropdown-menu[role]`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompoundSelector {
    /// Lower-case tag; `None` for `*` or an implicit universal
    pub tag: Option<String>,
    pub simple: Vec<SimpleSelector>,
}

/// Simple selector for matching
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimpleSelector {
    Id(String),
    Class(String),
    Attr(AttrSelector),
    Not(Box<CompoundSelector>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttrSelector {
    pub name: String,
    pub op: AttrOp,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttrOp {
    Exists,
    Equals(String),
    Contains(String),
    Prefix(String),
    Suffix(String),
    Includes(String),
}

impl SelectorList {
    /// Parse a selector list
    pub fn parse(s: &str) -> Result<Self, SelectorError> {
        let mut cursor = Cursor::new(s);
        cursor.skip_ws();
        if cursor.at_end() {
            return Err(SelectorError::Empty);
        }

        let mut selectors = Vec::new();
        loop {
            cursor.skip_ws();
            selectors.push(parse_complex(&mut cursor)?);
            cursor.skip_ws();
            match cursor.peek() {
                None => break,
                Some(',') => {
                    cursor.bump();
                }
                Some(found) => {
                    return Err(SelectorError::Unexpected { found, offset: cursor.pos });
                }
            }
        }
        Ok(Self { selectors })
    }

    /// Does any selector in the list match the element?
    pub fn matches(&self, tree: &DomTree, id: NodeId) -> bool {
        self.selectors.iter().any(|s| s.matches(tree, id))
    }

    pub fn len(&self) -> usize {
        self.selectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selectors.is_empty()
    }
}

impl FromStr for SelectorList {
    type Err = SelectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl ComplexSelector {
    pub fn matches(&self, tree: &DomTree, id: NodeId) -> bool {
        let Some((last, rest)) = self.compounds.split_last() else {
            return false;
        };
        if !last.matches(tree, id) {
            return false;
        }
        // Descendant-only chains: the nearest matching ancestor is always
        // the best candidate, so no backtracking is needed.
        let mut current = id;
        for compound in rest.iter().rev() {
            match tree.ancestors(current).find(|&a| compound.matches(tree, a)) {
                Some(ancestor) => current = ancestor,
                None => return false,
            }
        }
        true
    }
}

impl CompoundSelector {
    pub fn matches(&self, tree: &DomTree, id: NodeId) -> bool {
        let Some(tag) = tree.tag_name(id) else {
            return false;
        };
        if let Some(expected) = &self.tag {
            if !expected.eq_ignore_ascii_case(tag) {
                return false;
            }
        }
        self.simple.iter().all(|s| s.matches(tree, id))
    }
}

impl SimpleSelector {
    pub fn matches(&self, tree: &DomTree, id: NodeId) -> bool {
        match self {
            Self::Id(expected) => tree.attribute(id, "id") == Some(expected.as_str()),
            Self::Class(class) => tree.has_class(id, class),
            Self::Attr(attr) => attr.matches(tree.attribute(id, &attr.name)),
            Self::Not(inner) => !inner.matches(tree, id),
        }
    }
}

impl AttrSelector {
    pub fn matches(&self, value: Option<&str>) -> bool {
        let Some(value) = value else {
            return false;
        };
        match &self.op {
            AttrOp::Exists => true,
            AttrOp::Equals(v) => value == v,
            AttrOp::Contains(v) => !v.is_empty() && value.contains(v.as_str()),
            AttrOp::Prefix(v) => !v.is_empty() && value.starts_with(v.as_str()),
            AttrOp::Suffix(v) => !v.is_empty() && value.ends_with(v.as_str()),
            AttrOp::Includes(v) => value.split_ascii_whitespace().any(|t| t == v),
        }
    }
}

// ---- parser -------------------------------------------------------------

struct Cursor {
    chars: Vec<char>,
    pos: usize,
}

impl Cursor {
    fn new(s: &str) -> Self {
        Self { chars: s.chars().collect(), pos: 0 }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        Some(c)
    }

    fn at_end(&self) -> bool {
        self.pos >= self.chars.len()
    }

    /// Skip whitespace, reporting whether any was consumed
    fn skip_ws(&mut self) -> bool {
        let start = self.pos;
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
        self.pos > start
    }

    fn unexpected(&self) -> SelectorError {
        match self.peek() {
            Some(found) => SelectorError::Unexpected { found, offset: self.pos },
            None => SelectorError::UnexpectedEnd,
        }
    }

    fn expect(&mut self, c: char) -> Result<(), SelectorError> {
        if self.peek() == Some(c) {
            self.pos += 1;
            Ok(())
        } else {
            Err(self.unexpected())
        }
    }

    fn ident(&mut self) -> Result<String, SelectorError> {
        let start = self.pos;
        while self.peek().is_some_and(|c| c.is_alphanumeric() || c == '-' || c == '_') {
            self.pos += 1;
        }
        if self.pos == start {
            return Err(self.unexpected());
        }
        Ok(self.chars[start..self.pos].iter().collect())
    }

    /// Quoted string or bare identifier
    fn value(&mut self) -> Result<String, SelectorError> {
        match self.peek() {
            Some(quote @ ('"' | '\'')) => {
                self.pos += 1;
                let start = self.pos;
                while self.peek().is_some_and(|c| c != quote) {
                    self.pos += 1;
                }
                let value = self.chars[start..self.pos].iter().collect();
                self.expect(quote)?;
                Ok(value)
            }
            _ => self.ident(),
        }
    }
}

fn parse_complex(cursor: &mut Cursor) -> Result<ComplexSelector, SelectorError> {
    let mut compounds = vec![parse_compound(cursor)?];
    loop {
        let had_ws = cursor.skip_ws();
        match cursor.peek() {
            None | Some(',') => break,
            Some(_) if had_ws => compounds.push(parse_compound(cursor)?),
            Some(found) => return Err(SelectorError::Unexpected { found, offset: cursor.pos }),
        }
    }
    Ok(ComplexSelector { compounds })
}

fn parse_compound(cursor: &mut Cursor) -> Result<CompoundSelector, SelectorError> {
    let start = cursor.pos;
    let mut compound = CompoundSelector::default();

    match cursor.peek() {
        Some('*') => {
            cursor.bump();
        }
        Some(c) if c.is_alphabetic() => {
            compound.tag = Some(cursor.ident()?.to_ascii_lowercase());
        }
        _ => {}
    }

    loop {
        match cursor.peek() {
            Some('#') => {
                cursor.bump();
                compound.simple.push(SimpleSelector::Id(cursor.ident()?));
            }
            Some('.') => {
                cursor.bump();
                compound.simple.push(SimpleSelector::Class(cursor.ident()?));
            }
            Some('[') => {
                cursor.bump();
                compound.simple.push(SimpleSelector::Attr(parse_attr(cursor)?));
            }
            Some(':') => {
                cursor.bump();
                let name = cursor.ident()?;
                if !name.eq_ignore_ascii_case("not") {
                    return Err(SelectorError::UnsupportedPseudo(name));
                }
                cursor.expect('(')?;
                cursor.skip_ws();
                let inner = parse_compound(cursor)?;
                cursor.skip_ws();
                cursor.expect(')')?;
                compound.simple.push(SimpleSelector::Not(Box::new(inner)));
            }
            _ => break,
        }
    }

    if cursor.pos == start {
        return Err(cursor.unexpected());
    }
    Ok(compound)
}

fn parse_attr(cursor: &mut Cursor) -> Result<AttrSelector, SelectorError> {
    cursor.skip_ws();
    let name = cursor.ident()?.to_ascii_lowercase();
    cursor.skip_ws();

    let kind = match cursor.peek() {
        Some(']') => None,
        Some('=') => {
            cursor.bump();
            Some('=')
        }
        Some(c @ ('*' | '^' | '$' | '~')) => {
            cursor.bump();
            cursor.expect('=')?;
            Some(c)
        }
        _ => return Err(cursor.unexpected()),
    };

    let op = match kind {
        None => AttrOp::Exists,
        Some(kind) => {
            cursor.skip_ws();
            let value = cursor.value()?;
            cursor.skip_ws();
            match kind {
                '*' => AttrOp::Contains(value),
                '^' => AttrOp::Prefix(value),
                '$' => AttrOp::Suffix(value),
                '~' => AttrOp::Includes(value),
                _ => AttrOp::Equals(value),
            }
        }
    };
    cursor.expect(']')?;
    Ok(AttrSelector { name, op })
}
