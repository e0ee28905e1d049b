//! Ordered set of available checkers.
//!
//! Checker names sort into run order (`c110_...` before `c120_...`). The
//! registry yields, for one run, the checkers that apply: file checkers are
//! dropped when there is no data directory, and the configured
//! `select`/`skip` filter is applied. Dropped checkers are neither run nor
//! recorded.

use std::collections::HashSet;

use crate::checkers::{build_checker_registry, Checker};
use crate::config::CheckerFilter;
use crate::types::CheckerDescriptor;

/// All checkers known to the engine, sorted by name.
pub struct CheckerRegistry {
    checkers: Vec<Box<dyn Checker>>,
}

impl CheckerRegistry {
    /// Registry of the built-in checkers.
    #[must_use]
    pub fn new() -> Self {
        Self::from_checkers(build_checker_registry())
    }

    /// Registry of the given checkers.
    ///
    /// Sorted by name; when two checkers share a name the first one wins.
    #[must_use]
    pub fn from_checkers(checkers: Vec<Box<dyn Checker>>) -> Self {
        let mut seen = HashSet::new();
        let mut unique = Vec::with_capacity(checkers.len());
        for checker in checkers {
            if seen.insert(checker.name()) {
                unique.push(checker);
            } else {
                log::warn!("duplicate checker '{}' ignored", checker.name());
            }
        }
        unique.sort_by(|a, b| a.name().cmp(b.name()));
        Self { checkers: unique }
    }

    /// Number of registered checkers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.checkers.len()
    }

    /// Whether no checker is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.checkers.is_empty()
    }

    /// Every registered checker in run order.
    pub fn iter(&self) -> impl Iterator<Item = &dyn Checker> {
        self.checkers.iter().map(|c| c.as_ref())
    }

    /// Descriptors of every registered checker in run order.
    #[must_use]
    pub fn descriptors(&self) -> Vec<CheckerDescriptor> {
        self.iter().map(|c| c.descriptor()).collect()
    }

    /// Checkers to run for one submission, in run order.
    #[must_use]
    pub fn ordered(&self, has_data_dir: bool, filter: &CheckerFilter) -> Vec<&dyn Checker> {
        self.iter()
            .filter(|c| has_data_dir || !c.requires_data_dir())
            .filter(|c| filter.allows(c.name()))
            .collect()
    }
}

impl Default for CheckerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checkers::{CheckError, CheckOutcome};
    use crate::config::ValidationConfig;
    use crate::context::ValidationContext;

    struct Named(&'static str);

    impl Checker for Named {
        fn name(&self) -> &'static str {
            self.0
        }
        fn check(&self, _ctx: &ValidationContext) -> Result<CheckOutcome, CheckError> {
            Ok(CheckOutcome::pass("ok"))
        }
    }

    fn names(checkers: &[&dyn Checker]) -> Vec<&'static str> {
        checkers.iter().map(|c| c.name()).collect()
    }

    #[test]
    fn test_sorted_by_name() {
        let registry = CheckerRegistry::from_checkers(vec![
            Box::new(Named("c605_files")),
            Box::new(Named("c120_b")),
            Box::new(Named("c110_a")),
        ]);
        let ordered = registry.ordered(true, &CheckerFilter::default());
        assert_eq!(names(&ordered), vec!["c110_a", "c120_b", "c605_files"]);
    }

    #[test]
    fn test_no_data_dir_drops_file_checkers() {
        let registry = CheckerRegistry::from_checkers(vec![
            Box::new(Named("c110_a")),
            Box::new(Named("c605_files")),
            Box::new(Named("c910_more_files")),
        ]);
        let ordered = registry.ordered(false, &CheckerFilter::default());
        assert_eq!(names(&ordered), vec!["c110_a"]);
    }

    #[test]
    fn test_duplicate_names_keep_first() {
        let registry =
            CheckerRegistry::from_checkers(vec![Box::new(Named("c110_a")), Box::new(Named("c110_a"))]);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_filter_applied() {
        let registry = CheckerRegistry::new();
        let config = ValidationConfig {
            skip: vec!["c2*".to_owned()],
            ..ValidationConfig::default()
        };
        let ordered = registry.ordered(false, &config.checker_filter().unwrap());
        assert!(!ordered.is_empty());
        assert!(ordered.iter().all(|c| !c.name().starts_with("c2")));
        assert!(ordered.iter().all(|c| !c.requires_data_dir()));
    }

    #[test]
    fn test_builtin_registry_order() {
        let registry = CheckerRegistry::new();
        let all: Vec<&str> = registry.iter().map(|c| c.name()).collect();
        let mut sorted = all.clone();
        sorted.sort_unstable();
        assert_eq!(all, sorted);
        assert_eq!(all.first(), Some(&"c110_rg_id_uniqueness"));
        assert_eq!(registry.descriptors().len(), registry.len());
    }
}
