//! String Interner - Deduplicate strings to save memory
//!
//! Tag names ("a", "button", "td") and attribute names ("tabindex",
//! "title", "scope") repeat on nearly every element. They are stored once
//! and referenced by a 4-byte ID.

use std::collections::HashMap;

/// Interned string ID - just 4 bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(transparent)]
pub struct InternedString(pub u32);

impl InternedString {
    /// Empty string
    pub const EMPTY: InternedString = InternedString(0);
}

/// String interner for deduplicating strings
///
/// All strings live in a single contiguous buffer; each entry records
/// its `(start, len)` span so embedded NULs survive.
pub struct StringInterner {
    buffer: String,
    map: HashMap<Box<str>, u32>,
    spans: Vec<(u32, u32)>,
}

impl StringInterner {
    /// Create a new string interner with common HTML strings pre-interned
    pub fn new() -> Self {
        let mut interner = Self {
            buffer: String::with_capacity(2048),
            map: HashMap::with_capacity(128),
            spans: Vec::with_capacity(128),
        };

        // Index 0 is always the empty string
        interner.intern("");

        const COMMON_TAGS: &[&str] = &[
            "html", "head", "body", "div", "span", "p", "a", "img",
            "ul", "ol", "li", "table", "tr", "td", "th", "thead", "tbody",
            "form", "input", "button", "select", "option", "textarea",
            "nav", "main", "section", "title", "script", "style",
        ];

        // Attributes every compliance rule touches
        const COMMON_ATTRS: &[&str] = &[
            "id", "class", "style", "href", "src", "alt", "title", "name",
            "type", "value", "disabled", "enabled", "tabindex", "scope",
            "target", "onclick", "role", "data-original-title",
        ];

        for tag in COMMON_TAGS {
            interner.intern(tag);
        }
        for attr in COMMON_ATTRS {
            interner.intern(attr);
        }

        interner
    }

    /// Intern a string, returning its ID
    /// If the string is already interned, returns the existing ID
    pub fn intern(&mut self, s: &str) -> InternedString {
        if let Some(&idx) = self.map.get(s) {
            return InternedString(idx);
        }

        let idx = self.spans.len() as u32;
        let start = self.buffer.len() as u32;
        self.buffer.push_str(s);
        self.spans.push((start, s.len() as u32));
        self.map.insert(s.into(), idx);

        InternedString(idx)
    }

    /// Look up a string without interning it
    pub fn lookup(&self, s: &str) -> Option<InternedString> {
        self.map.get(s).map(|&idx| InternedString(idx))
    }

    /// Get the string for an interned ID
    #[inline]
    pub fn get(&self, id: InternedString) -> &str {
        match self.spans.get(id.0 as usize) {
            Some(&(start, len)) => &self.buffer[start as usize..(start + len) as usize],
            None => "",
        }
    }

    /// Number of interned strings
    pub fn len(&self) -> usize {
        self.spans.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }
}

impl Default for StringInterner {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for StringInterner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StringInterner")
            .field("len", &self.spans.len())
            .field("bytes", &self.buffer.len())
            .finish()
    }
}
