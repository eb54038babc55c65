//! Rule registry
//!
//! Every rule owns one bit of a `u32`. Rules are declared once, in run
//! order, and sets of rules are plain bitmasks.

use std::fmt;
use std::ops::{BitAnd, BitOr, BitOrAssign, Sub};
use std::str::FromStr;

use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Error parsing a rule spec string such as `"A_BlankTarget|TD_MissingScope"`
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RuleParseError {
    #[error("empty rule spec")]
    Empty,

    #[error("unknown rule: {0}")]
    UnknownRule(String),
}

/// A compliance rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Rule {
    ABlankTarget,
    AMissingTabindex,
    AMissingTitle,
    ButtonMissingTabindex,
    ButtonMissingTitle,
    DataToggleRestoreTitle,
    DatePickerAddFix,
    DisabledInputRemoveTabindex,
    DropDownAddFix,
    ImgMissingTabindex,
    TdMissingScope,
    ThMissingScope,
}

impl Rule {
    /// Every rule in run order. New rules go at the end.
    pub const ALL: [Rule; 12] = [
        Rule::ABlankTarget,
        Rule::AMissingTabindex,
        Rule::AMissingTitle,
        Rule::ButtonMissingTabindex,
        Rule::ButtonMissingTitle,
        Rule::DataToggleRestoreTitle,
        Rule::DatePickerAddFix,
        Rule::DisabledInputRemoveTabindex,
        Rule::DropDownAddFix,
        Rule::ImgMissingTabindex,
        Rule::TdMissingScope,
        Rule::ThMissingScope,
    ];

    /// The rule's bit
    #[inline]
    pub const fn bit(self) -> u32 {
        1 << self as u32
    }

    /// Canonical name, as accepted by `FromStr`
    pub const fn name(self) -> &'static str {
        match self {
            Self::ABlankTarget => "A_BlankTarget",
            Self::AMissingTabindex => "A_MissingTabindex",
            Self::AMissingTitle => "A_MissingTitle",
            Self::ButtonMissingTabindex => "Button_MissingTabindex",
            Self::ButtonMissingTitle => "Button_MissingTitle",
            Self::DataToggleRestoreTitle => "DataToggle_RestoreTitle",
            Self::DatePickerAddFix => "DatePicker_AddFix",
            Self::DisabledInputRemoveTabindex => "DisabledInput_RemoveTabindex",
            Self::DropDownAddFix => "DropDown_AddFix",
            Self::ImgMissingTabindex => "Img_MissingTabindex",
            Self::TdMissingScope => "TD_MissingScope",
            Self::ThMissingScope => "TH_MissingScope",
        }
    }

    /// Look up a rule by its canonical (case-sensitive) name
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|r| r.name() == name)
    }

    /// Selector for the elements the rule inspects
    pub const fn selector(self) -> &'static str {
        match self {
            Self::ABlankTarget => "a[target=_blank], a[onclick*=\"window.open\"]",
            Self::AMissingTabindex => "a:not([tabindex])",
            Self::AMissingTitle => "a:not([title])",
            Self::ButtonMissingTabindex => "button:not([tabindex])",
            Self::ButtonMissingTitle => "button:not([title])",
            Self::DataToggleRestoreTitle => "[data-original-title]",
            Self::DatePickerAddFix => {
                ".TimeSlotTable, .TimeSlotTable .TimeSlot.available a.timeSlotLinkContent"
            }
            Self::DisabledInputRemoveTabindex => "[disabled], [enabled=false]",
            Self::DropDownAddFix => "ul.dropdown-menu:not([class*=inline])",
            Self::ImgMissingTabindex => "img:not([tabindex])",
            Self::TdMissingScope => "tbody tr td:not([scope])",
            Self::ThMissingScope => "thead tr th:not([scope])",
        }
    }

    /// Message template; `{value}` stands for the value the fix wrote
    pub const fn message_template(self) -> &'static str {
        match self {
            Self::ABlankTarget => "Inserting missing sr-only element after blank target hyperlink.",
            Self::AMissingTabindex => "Adding missing tabindex attribute as 0 for hyperlink",
            Self::AMissingTitle => "Adding missing title attribute as \"{value}\" for hyperlink",
            Self::ButtonMissingTabindex => "Adding missing tabindex as 0 for button",
            Self::ButtonMissingTitle => "Adding missing title attribute as \"{value}\" for button",
            Self::DataToggleRestoreTitle => "Restoring title as \"{value}\" for data-toggle",
            Self::DatePickerAddFix => "Making DatePicker 508 compliant",
            Self::DisabledInputRemoveTabindex => {
                "Setting tabindex attribute to {value} for disabled input"
            }
            Self::DropDownAddFix => "Making DropDown menu visible when overflow",
            Self::ImgMissingTabindex => "Adding missing tabindex as 0 for image",
            Self::TdMissingScope => {
                "Adding missing scope attribute as \"{value}\" for table data-cell"
            }
            Self::ThMissingScope => {
                "Adding missing scope attribute as \"{value}\" for table header-cell"
            }
        }
    }

    /// Template used when the rule could not find a proper fix
    pub const fn warning_template(self) -> Option<&'static str> {
        match self {
            Self::AMissingTitle => Some(
                "WARNING: Unable to find an appropriate title for anonymous hyperlink. \
                 The title \"{value}\" was used instead.",
            ),
            _ => None,
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Rule {
    type Err = RuleParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s.trim()).ok_or_else(|| RuleParseError::UnknownRule(s.trim().to_string()))
    }
}

impl Serialize for Rule {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for Rule {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        name.parse().map_err(<D::Error as DeError>::custom)
    }
}

/// Set of rules as a bitmask
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct RuleSet(u32);

impl RuleSet {
    pub const EMPTY: RuleSet = RuleSet(0);

    /// Union of every declared rule
    pub const ALL: RuleSet = {
        let mut bits = 0;
        let mut i = 0;
        while i < Rule::ALL.len() {
            bits |= Rule::ALL[i].bit();
            i += 1;
        }
        RuleSet(bits)
    };

    /// Build from a raw mask; undeclared bits are dropped
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits & Self::ALL.0)
    }

    #[inline]
    pub const fn bits(self) -> u32 {
        self.0
    }

    #[inline]
    pub const fn contains(self, rule: Rule) -> bool {
        self.0 & rule.bit() != 0
    }

    pub fn insert(&mut self, rule: Rule) {
        self.0 |= rule.bit();
    }

    pub fn remove(&mut self, rule: Rule) {
        self.0 &= !rule.bit();
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub const fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    /// Members in run order
    pub fn iter(self) -> impl Iterator<Item = Rule> {
        Rule::ALL.into_iter().filter(move |r| self.contains(*r))
    }
}

impl From<Rule> for RuleSet {
    fn from(rule: Rule) -> Self {
        Self(rule.bit())
    }
}

impl FromIterator<Rule> for RuleSet {
    fn from_iter<I: IntoIterator<Item = Rule>>(iter: I) -> Self {
        let mut set = Self::EMPTY;
        for rule in iter {
            set.insert(rule);
        }
        set
    }
}

impl BitOr for RuleSet {
    type Output = RuleSet;

    fn bitor(self, rhs: RuleSet) -> RuleSet {
        RuleSet(self.0 | rhs.0)
    }
}

impl BitOr<Rule> for RuleSet {
    type Output = RuleSet;

    fn bitor(self, rhs: Rule) -> RuleSet {
        RuleSet(self.0 | rhs.bit())
    }
}

impl BitOr for Rule {
    type Output = RuleSet;

    fn bitor(self, rhs: Rule) -> RuleSet {
        RuleSet(self.bit() | rhs.bit())
    }
}

impl BitOrAssign<Rule> for RuleSet {
    fn bitor_assign(&mut self, rhs: Rule) {
        self.insert(rhs);
    }
}

impl BitAnd for RuleSet {
    type Output = RuleSet;

    fn bitand(self, rhs: RuleSet) -> RuleSet {
        RuleSet(self.0 & rhs.0)
    }
}

impl Sub<Rule> for RuleSet {
    type Output = RuleSet;

    fn sub(self, rhs: Rule) -> RuleSet {
        RuleSet(self.0 & !rhs.bit())
    }
}

impl fmt::Debug for RuleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RuleSet({self})")
    }
}

impl fmt::Display for RuleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if *self == Self::ALL {
            return f.write_str("All");
        }
        if self.is_empty() {
            return f.write_str("0");
        }
        for (i, rule) in self.iter().enumerate() {
            if i > 0 {
                f.write_str("|")?;
            }
            f.write_str(rule.name())?;
        }
        Ok(())
    }
}

impl FromStr for RuleSet {
    type Err = RuleParseError;

    /// Accepts rule names, `All` and raw masks, joined by `|`, `+` or `,`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().is_empty() {
            return Err(RuleParseError::Empty);
        }
        let mut set = Self::EMPTY;
        for part in s.split(['|', '+', ',']) {
            let part = part.trim();
            if part.is_empty() {
                return Err(RuleParseError::Empty);
            }
            if part == "All" {
                set = set | Self::ALL;
            } else if let Ok(bits) = part.parse::<u32>() {
                set = set | Self::from_bits(bits);
            } else {
                set |= part.parse::<Rule>()?;
            }
        }
        Ok(set)
    }
}

impl Serialize for RuleSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u32(self.0)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RuleSetRepr {
    Bits(u32),
    Flag(bool),
    Spec(String),
    List(Vec<RuleItem>),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RuleItem {
    Bits(u32),
    Name(String),
}

impl<'de> Deserialize<'de> for RuleSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let set = match RuleSetRepr::deserialize(deserializer)? {
            RuleSetRepr::Bits(bits) => Self::from_bits(bits),
            RuleSetRepr::Flag(true) => Self::ALL,
            RuleSetRepr::Flag(false) => Self::EMPTY,
            RuleSetRepr::Spec(spec) => spec.parse::<Self>().map_err(<D::Error as DeError>::custom)?,
            RuleSetRepr::List(items) => {
                let mut set = Self::EMPTY;
                for item in items {
                    set = set | match item {
                        RuleItem::Bits(bits) => Self::from_bits(bits),
                        RuleItem::Name(name) => name
                            .parse::<Self>()
                            .map_err(<D::Error as DeError>::custom)?,
                    };
                }
                set
            }
        };
        Ok(set)
    }
}
