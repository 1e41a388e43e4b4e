// Label space: topic identifiers, the multi-label codec, and the
// human-readable topic mapping.

pub mod codec;
pub mod mapping;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Binary indicator vector over all known topics for one input.
pub type LabelVector = Vec<u8>;

/// Integer key identifying one topic class in the trained label space.
///
/// Displays as `topic <n>`, which is also the string form returned to
/// API callers in `predicted_topics`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TopicId(pub u32);

impl fmt::Display for TopicId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "topic {}", self.0)
    }
}

impl FromStr for TopicId {
    type Err = String;

    /// Accepts `"Topic 3"`, `"topic 3"` or a bare `"3"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let digits = match trimmed.split_once(char::is_whitespace) {
            Some((prefix, rest)) if prefix.eq_ignore_ascii_case("topic") => rest.trim(),
            Some(_) => return Err(format!("not a topic label: {trimmed:?}")),
            None => trimmed,
        };
        digits
            .parse::<u32>()
            .map(TopicId)
            .map_err(|_| format!("not a topic label: {trimmed:?}"))
    }
}

impl From<u32> for TopicId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_is_topic_tag() {
        assert_eq!(TopicId(3).to_string(), "topic 3");
    }

    #[test]
    fn test_parse_variants() {
        assert_eq!("Topic 12".parse::<TopicId>().unwrap(), TopicId(12));
        assert_eq!("topic 0".parse::<TopicId>().unwrap(), TopicId(0));
        assert_eq!(" 7 ".parse::<TopicId>().unwrap(), TopicId(7));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!("subject 3".parse::<TopicId>().is_err());
        assert!("topic x".parse::<TopicId>().is_err());
        assert!("".parse::<TopicId>().is_err());
    }
}
