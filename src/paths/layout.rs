//! Host theme layout lookups.

use std::path::{Path, PathBuf};

/// The host's view of the active theme on disk.
///
/// A theme is a stylesheet directory (the active, possibly child, theme) and a
/// template directory (its parent theme). Both may be the same directory.
pub trait ThemeLayout: Send + Sync {
    /// Directory of the active theme.
    fn stylesheet_directory(&self) -> PathBuf;

    /// Directory of the parent theme.
    fn template_directory(&self) -> PathBuf;

    /// Finds `relative` in the stylesheet directory, then in the template
    /// directory, returning the first one that exists.
    fn locate(&self, relative: &str) -> Option<PathBuf> {
        let relative = relative.trim_matches(|c| c == '/' || c == '\\');
        if relative.is_empty() {
            return None;
        }
        [self.stylesheet_directory(), self.template_directory()]
            .into_iter()
            .map(|dir| dir.join(relative))
            .find(|candidate| candidate.exists())
    }
}

/// A layout over two fixed directories.
#[derive(Debug, Clone)]
pub struct StaticLayout {
    stylesheet: PathBuf,
    template: PathBuf,
}

impl StaticLayout {
    pub fn new(stylesheet: impl Into<PathBuf>, template: impl Into<PathBuf>) -> Self {
        Self {
            stylesheet: stylesheet.into(),
            template: template.into(),
        }
    }

    /// A theme with no parent.
    pub fn single(dir: impl AsRef<Path>) -> Self {
        Self::new(dir.as_ref(), dir.as_ref())
    }
}

impl ThemeLayout for StaticLayout {
    fn stylesheet_directory(&self) -> PathBuf {
        self.stylesheet.clone()
    }

    fn template_directory(&self) -> PathBuf {
        self.template.clone()
    }
}
