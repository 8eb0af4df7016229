use std::collections::HashSet;

/// Names whose pids are never handed to the sampler.
///
/// Matching is case-insensitive against a fixed list.
#[derive(Debug, Clone, Default)]
pub struct TemporaryProcessFilter {
    names: HashSet<String>,
}

impl TemporaryProcessFilter {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            names: names
                .into_iter()
                .map(|name| name.as_ref().to_lowercase())
                .collect(),
        }
    }

    pub fn is_excluded(&self, name: &str) -> bool {
        self.names.contains(&name.to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_EXCLUDED_NAMES;

    #[test]
    fn matches_regardless_of_case() {
        let filter = TemporaryProcessFilter::new(DEFAULT_EXCLUDED_NAMES);
        assert!(filter.is_excluded("WMIC.EXE"));
        assert!(filter.is_excluded("LenovoVantage-(ModernPreloadAddin).exe"));
        assert!(!filter.is_excluded("wmic"));
        assert!(!filter.is_excluded("chrome.exe"));
    }

    #[test]
    fn empty_filter_excludes_nothing() {
        let filter = TemporaryProcessFilter::default();
        assert!(filter.is_empty());
        assert!(!filter.is_excluded("wmic.exe"));
    }
}
