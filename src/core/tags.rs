use std::collections::BTreeSet;
use std::str::FromStr;

/// A tag set parsed from raw strings, remembering how many entries were unusable
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedTags<T: Ord> {
    pub tags: BTreeSet<T>,
    pub malformed: usize,
}

impl<T: Ord> ParsedTags<T> {
    /// Nothing was declared at all
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty() && self.malformed == 0
    }
}

/// Parse a list of raw tags, dropping (and counting) the ones that don't parse.
///
/// Blank entries are ignored entirely; duplicates collapse.
pub fn parse_tags<T>(raw: &[String]) -> ParsedTags<T>
where
    T: FromStr + Ord,
{
    let mut tags = BTreeSet::new();
    let mut malformed = 0;

    for value in raw.iter().filter(|v| !v.trim().is_empty()) {
        match value.parse::<T>() {
            Ok(tag) => {
                tags.insert(tag);
            }
            Err(_) => {
                tracing::debug!("Dropping malformed tag {:?}", value);
                malformed += 1;
            }
        }
    }

    ParsedTags { tags, malformed }
}
