use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// A teletext page number, always in 100..=999.
///
/// Serialized as the zero-padded 3-digit string form used on the wire and
/// in the settings file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PageId(u16);

impl PageId {
    pub const MIN: u16 = 100;
    pub const MAX: u16 = 999;

    /// The home page every back-chain converges to
    pub const HOME: PageId = PageId(100);

    pub fn new(number: u16) -> Option<Self> {
        if (Self::MIN..=Self::MAX).contains(&number) {
            Some(Self(number))
        } else {
            None
        }
    }

    /// Parse a 3-digit page string. Rejects anything that is not exactly
    /// three digits in the valid range ("0100", "99", "1a0").
    pub fn parse(s: &str) -> Option<Self> {
        if s.len() != 3 || !s.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        s.parse::<u16>().ok().and_then(Self::new)
    }

    pub fn number(&self) -> u16 {
        self.0
    }
}

impl fmt::Display for PageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:03}", self.0)
    }
}

impl FromStr for PageId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| Error::InvalidPage(s.to_string()))
    }
}

impl TryFrom<String> for PageId {
    type Error = Error;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<PageId> for String {
    fn from(id: PageId) -> String {
        id.to_string()
    }
}

/// Cache / in-flight request key: one entry per (page, subpage) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PageKey {
    pub page: PageId,
    pub sub_page: u16,
}

impl PageKey {
    pub fn new(page: PageId, sub_page: u16) -> Self {
        Self { page, sub_page }
    }
}

impl fmt::Display for PageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.page, self.sub_page)
    }
}

/// A fetched teletext page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageResponse {
    pub page: PageId,
    /// Number of subpages this page has, at least 1
    pub sub_page_count: u16,
    /// Previous page in reading order, if the source provides one
    pub prev_page: Option<PageId>,
    /// Next page in reading order
    pub next_page: Option<PageId>,
    /// Page content as raw character rows; opaque to the engine, the
    /// renderer and the link extractor are the only consumers
    pub lines: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_id_range() {
        assert!(PageId::new(100).is_some());
        assert!(PageId::new(999).is_some());
        assert!(PageId::new(99).is_none());
        assert!(PageId::new(1000).is_none());
    }

    #[test]
    fn test_page_id_parse() {
        assert_eq!(PageId::parse("100"), Some(PageId::HOME));
        assert_eq!(PageId::parse("205").unwrap().number(), 205);
        assert!(PageId::parse("099").is_none());
        assert!(PageId::parse("1000").is_none());
        assert!(PageId::parse("10").is_none());
        assert!(PageId::parse("1a0").is_none());
        assert!(PageId::parse("").is_none());
    }

    #[test]
    fn test_page_id_display() {
        assert_eq!(PageId::new(100).unwrap().to_string(), "100");
        assert_eq!(PageId::new(999).unwrap().to_string(), "999");
    }

    #[test]
    fn test_page_id_serde_string() {
        let id: PageId = serde_json::from_str("\"150\"").unwrap();
        assert_eq!(id.number(), 150);
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"150\"");

        assert!(serde_json::from_str::<PageId>("\"07\"").is_err());
    }
}
