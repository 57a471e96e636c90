//! Validation of tag input from the command line.

use thiserror::Error;

use crate::core::tags::Tags;

/// Maximum length of a tag key or value
pub const MAX_TAG_LENGTH: usize = 255;

/// Maximum number of tags accepted in one request
pub const MAX_TAGS: usize = 1000;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TagError {
    #[error("Expected key=value, got {0:?}")]
    MissingSeparator(String),

    #[error("Tag key must not be empty")]
    EmptyKey,

    #[error("Tag key is {0} characters long (maximum {max})", max = MAX_TAG_LENGTH)]
    KeyTooLong(usize),

    #[error("Value of {key} is {len} characters long (maximum {max})", max = MAX_TAG_LENGTH)]
    ValueTooLong { key: String, len: usize },

    #[error("Tag {0} given more than once")]
    DuplicateKey(String),

    #[error("Too many tags: {0} (maximum {max})", max = MAX_TAGS)]
    TooManyTags(usize),
}

/// Parse a single `key=value` argument.
///
/// The value may be empty and may itself contain `=`.
///
/// # Examples
///
/// ```
/// use preset_index::utils::validation::parse_tag;
///
/// assert_eq!(
///     parse_tag("amenity=cafe").unwrap(),
///     ("amenity".to_string(), "cafe".to_string())
/// );
/// assert!(parse_tag("amenity").is_err());
/// assert!(parse_tag("=cafe").is_err());
/// ```
pub fn parse_tag(arg: &str) -> Result<(String, String), TagError> {
    let (key, value) = arg
        .split_once('=')
        .ok_or_else(|| TagError::MissingSeparator(arg.to_string()))?;
    let key = key.trim();

    if key.is_empty() {
        return Err(TagError::EmptyKey);
    }
    let key_len = key.chars().count();
    if key_len > MAX_TAG_LENGTH {
        return Err(TagError::KeyTooLong(key_len));
    }
    let value_len = value.chars().count();
    if value_len > MAX_TAG_LENGTH {
        return Err(TagError::ValueTooLong {
            key: key.to_string(),
            len: value_len,
        });
    }
    Ok((key.to_string(), value.to_string()))
}

/// Parse a list of `key=value` arguments into a tag set
pub fn parse_tags<S: AsRef<str>>(args: &[S]) -> Result<Tags, TagError> {
    if args.len() > MAX_TAGS {
        return Err(TagError::TooManyTags(args.len()));
    }

    let mut tags = Tags::new();
    for arg in args {
        let (key, value) = parse_tag(arg.as_ref())?;
        if tags.contains_key(&key) {
            return Err(TagError::DuplicateKey(key));
        }
        tags.insert(key, value);
    }
    Ok(tags)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tag_edge_cases() {
        assert_eq!(
            parse_tag("name=a=b").unwrap(),
            ("name".to_string(), "a=b".to_string())
        );
        assert_eq!(parse_tag("note=").unwrap(), ("note".to_string(), String::new()));
        assert_eq!(parse_tag("  =x"), Err(TagError::EmptyKey));
        assert_eq!(
            parse_tag("highway"),
            Err(TagError::MissingSeparator("highway".to_string()))
        );
    }

    #[test]
    fn test_length_limits() {
        let long = "k".repeat(MAX_TAG_LENGTH + 1);
        assert_eq!(
            parse_tag(&format!("{long}=v")),
            Err(TagError::KeyTooLong(MAX_TAG_LENGTH + 1))
        );
        assert!(matches!(
            parse_tag(&format!("name={long}")),
            Err(TagError::ValueTooLong { .. })
        ));
        assert!(parse_tag(&format!("{}=v", "k".repeat(MAX_TAG_LENGTH))).is_ok());
    }

    #[test]
    fn test_parse_tags() {
        let tags = parse_tags(&["shop=bakery", "name=Crumbs"]).unwrap();
        assert_eq!(tags.len(), 2);
        assert_eq!(tags["shop"], "bakery");

        assert_eq!(
            parse_tags(&["shop=bakery", "shop=butcher"]),
            Err(TagError::DuplicateKey("shop".to_string()))
        );

        let too_many: Vec<String> = (0..=MAX_TAGS).map(|i| format!("k{i}=v")).collect();
        assert_eq!(parse_tags(too_many.as_slice()), Err(TagError::TooManyTags(MAX_TAGS + 1)));

        assert!(parse_tags::<&str>(&[]).unwrap().is_empty());
    }
}
