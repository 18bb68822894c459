//! URL record entity: one alias pointing at one original URL.

/// Short opaque identifier of a record.
pub type Alias = String;

/// URL submitted for shortening, stored verbatim.
pub type OriginalUrl = String;

/// A stored mapping from an alias to an original URL.
///
/// `owner` is `None` for records created anonymously or by a backend that does
/// not model ownership. Once `deleted` is set it is never cleared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlRecord {
    pub alias: Alias,
    pub original_url: OriginalUrl,
    pub owner: Option<String>,
    pub deleted: bool,
}

impl UrlRecord {
    /// Creates a live record.
    pub fn new(alias: Alias, original_url: OriginalUrl, owner: Option<String>) -> Self {
        Self {
            alias,
            original_url,
            owner,
            deleted: false,
        }
    }

    /// Returns true if the record belongs to `user_id`.
    pub fn is_owned_by(&self, user_id: &str) -> bool {
        self.owner.as_deref() == Some(user_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_record_is_live() {
        let record = UrlRecord::new(
            "abcdEFGH".to_string(),
            "https://example.com".to_string(),
            Some("user-1".to_string()),
        );

        assert_eq!(record.alias, "abcdEFGH");
        assert_eq!(record.original_url, "https://example.com");
        assert!(!record.deleted);
    }

    #[test]
    fn test_ownership() {
        let owned = UrlRecord::new("a".into(), "https://a.io".into(), Some("u1".into()));
        let anonymous = UrlRecord::new("b".into(), "https://b.io".into(), None);

        assert!(owned.is_owned_by("u1"));
        assert!(!owned.is_owned_by("u2"));
        assert!(!anonymous.is_owned_by("u1"));
        assert!(!anonymous.is_owned_by(""));
    }
}
