//! Projection and paging for find-all queries.

/// Options for [`create_find_all_query`](crate::DriverConfig::create_find_all_query).
///
/// `limit == 0` means unbounded and renders as `LIMIT ALL`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FindAllOptions {
    pub keys: Option<Vec<String>>,
    pub limit: u64,
    pub offset: u64,
}

impl FindAllOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict the selected columns. Without this every column (`*`) is selected.
    #[must_use]
    pub fn keys<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.keys = Some(keys.into_iter().map(Into::into).collect());
        self
    }

    #[must_use]
    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = limit;
        self
    }

    #[must_use]
    pub fn offset(mut self, offset: u64) -> Self {
        self.offset = offset;
        self
    }

    pub(crate) fn limit_clause(&self) -> String {
        if self.limit == 0 {
            "ALL".to_string()
        } else {
            self.limit.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let opts = FindAllOptions::default();
        assert_eq!(opts.keys, None);
        assert_eq!(opts.limit_clause(), "ALL");
        assert_eq!(opts.offset, 0);
    }

    #[test]
    fn test_builder() {
        let opts = FindAllOptions::new().keys(["id", "name"]).limit(100).offset(200);
        assert_eq!(opts.keys, Some(vec!["id".to_string(), "name".to_string()]));
        assert_eq!(opts.limit_clause(), "100");
        assert_eq!(opts.offset, 200);
    }
}
