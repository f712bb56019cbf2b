//! The list of selectable compiler builds.

use scs_model::CompilerBuild;

use crate::error::{Result, SessionError};

/// Ordered compiler builds plus the current selection.
///
/// Builds are kept in the order they were loaded, which for published
/// build lists is newest first.
#[derive(Debug, Clone, Default)]
pub struct BuildRegistry {
    builds: Vec<CompilerBuild>,
    selected: Option<usize>,
}

impl BuildRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the build list. The selection is cleared.
    pub fn load(&mut self, builds: Vec<CompilerBuild>) {
        self.builds = builds;
        self.selected = None;
    }

    pub fn builds(&self) -> &[CompilerBuild] {
        &self.builds
    }

    pub fn len(&self) -> usize {
        self.builds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.builds.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&CompilerBuild> {
        self.builds.get(index)
    }

    /// Select the build at `index`. Readiness is not required.
    ///
    /// An out-of-range index leaves the selection untouched.
    pub fn select(&mut self, index: usize) -> Result<()> {
        self.check_index(index)?;
        self.selected = Some(index);
        Ok(())
    }

    #[inline]
    pub fn selected_index(&self) -> Option<usize> {
        self.selected
    }

    pub fn selected_build(&self) -> Option<&CompilerBuild> {
        self.selected.and_then(|index| self.builds.get(index))
    }

    /// Whether a build is selected and loaded.
    pub fn is_selected_ready(&self) -> bool {
        self.selected_build().is_some_and(CompilerBuild::is_ready)
    }

    /// Flag the build at `index` as loaded.
    ///
    /// Returns whether the flag changed; marking a ready build again is a
    /// no-op.
    pub fn mark_ready(&mut self, index: usize) -> Result<bool> {
        self.check_index(index)?;
        let build = &mut self.builds[index];
        let changed = !build.is_ready();
        build.mark_ready();
        Ok(changed)
    }

    /// Select the newest release, or the first build when the list has no
    /// release at all. Returns the selected index.
    pub fn select_latest_release(&mut self) -> Option<usize> {
        if self.builds.is_empty() {
            return None;
        }
        let index = self
            .builds
            .iter()
            .position(|build| build.is_release)
            .unwrap_or(0);
        self.selected = Some(index);
        Some(index)
    }

    /// Index of the build named by `version` (short or long form).
    pub fn find_version(&self, version: &str) -> Option<usize> {
        self.builds
            .iter()
            .position(|build| build.matches_version(version))
    }

    fn check_index(&self, index: usize) -> Result<()> {
        if index < self.builds.len() {
            Ok(())
        } else {
            Err(SessionError::InvalidIndex {
                index,
                len: self.builds.len(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn builds() -> Vec<CompilerBuild> {
        vec![
            CompilerBuild::new("0.4.12", "0.4.12-nightly.2017.5.19+commit.982f6613", false, ""),
            CompilerBuild::new("0.4.11", "0.4.11+commit.68ef5810", true, ""),
            CompilerBuild::new("0.4.10", "0.4.10+commit.f0d539ae", true, ""),
        ]
    }

    #[test]
    fn test_load_clears_selection() {
        let mut registry = BuildRegistry::new();
        registry.load(builds());
        registry.select(1).unwrap();
        registry.load(builds());
        assert_eq!(registry.selected_index(), None);
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn test_select_out_of_range_keeps_selection() {
        let mut registry = BuildRegistry::new();
        registry.load(builds());
        registry.select(2).unwrap();

        let err = registry.select(3).unwrap_err();
        assert_eq!(err, SessionError::InvalidIndex { index: 3, len: 3 });
        assert_eq!(registry.selected_index(), Some(2));
    }

    #[test]
    fn test_select_does_not_require_ready() {
        let mut registry = BuildRegistry::new();
        registry.load(builds());
        registry.select(0).unwrap();
        assert!(!registry.is_selected_ready());
    }

    #[test]
    fn test_mark_ready_is_idempotent() {
        let mut registry = BuildRegistry::new();
        registry.load(builds());
        registry.select(1).unwrap();
        assert!(registry.mark_ready(1).unwrap());
        assert!(!registry.mark_ready(1).unwrap());
        assert!(registry.is_selected_ready());
        assert!(registry.mark_ready(7).is_err());
    }

    #[test]
    fn test_select_latest_release() {
        let mut registry = BuildRegistry::new();
        assert_eq!(registry.select_latest_release(), None);

        registry.load(builds());
        assert_eq!(registry.select_latest_release(), Some(1));
        assert_eq!(registry.selected_build().unwrap().version, "0.4.11");

        registry.load(vec![builds().remove(0)]);
        assert_eq!(registry.select_latest_release(), Some(0));
    }

    #[test]
    fn test_find_version() {
        let mut registry = BuildRegistry::new();
        registry.load(builds());
        assert_eq!(registry.find_version("v0.4.10"), Some(2));
        assert_eq!(registry.find_version("0.4.11+commit.68ef5810"), Some(1));
        assert_eq!(registry.find_version("0.3.6"), None);
    }
}
