//! Tag list handling.
//!
//! Snippet tags are stored as a native array, so a stored tag list round-trips exactly. The
//! comma-delimited form only exists where a tag list has to travel as one string, namely the
//! `tags` query parameter of the list endpoints. That form cannot express a tag that itself
//! contains a comma: it comes back as two tags.

/// Trim every tag and drop the ones left empty. Order and duplicates are kept.
pub fn normalize_tags<I, S>(tags: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    tags.into_iter()
        .map(|t| t.as_ref().trim().to_string())
        .filter(|t| !t.is_empty())
        .collect()
}

/// Encode a tag list as a single comma-delimited string.
pub fn join_tags<S: AsRef<str>>(tags: &[S]) -> String {
    tags.iter().map(AsRef::as_ref).collect::<Vec<_>>().join(",")
}

/// Decode a comma-delimited tag string. Empty segments are dropped.
pub fn split_tags(joined: &str) -> Vec<String> {
    normalize_tags(joined.split(','))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_plain_tags() {
        let tags = vec!["api".to_string(), "auth".to_string()];
        assert_eq!(join_tags(&tags), "api,auth");
        assert_eq!(split_tags(&join_tags(&tags)), tags);
    }

    #[test]
    fn test_comma_in_tag_does_not_survive() {
        let tags = vec!["a,b".to_string(), "c".to_string()];
        let round_tripped = split_tags(&join_tags(&tags));

        assert_ne!(round_tripped, tags);
        assert_eq!(round_tripped, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_split_drops_empty_segments() {
        assert_eq!(split_tags("rust,, tokio ,"), vec!["rust", "tokio"]);
        assert!(split_tags("").is_empty());
        assert!(split_tags(" , ,").is_empty());
    }

    #[test]
    fn test_normalize_keeps_order_and_duplicates() {
        let tags = normalize_tags(["  web ", "", "api", "web", "   "]);
        assert_eq!(tags, vec!["web", "api", "web"]);
    }
}
