//! The app-shell asset manifest.

/// An ordered, read-only list of root-relative paths making up the app
/// shell.
///
/// Fixed at construction; keeping it in sync with what the build actually
/// produces is the build's responsibility, not the agent's. Duplicate paths
/// are permitted and collapse onto the same cache key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetManifest {
    paths: Vec<String>,
}

impl AssetManifest {
    pub fn new(paths: Vec<String>) -> Self {
        Self { paths }
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.paths.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

impl From<Vec<String>> for AssetManifest {
    fn from(paths: Vec<String>) -> Self {
        Self::new(paths)
    }
}

impl<const N: usize> From<[&str; N]> for AssetManifest {
    fn from(paths: [&str; N]) -> Self {
        Self::new(paths.iter().map(|p| p.to_string()).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preserves_order() {
        let manifest = AssetManifest::from(["/", "/index.html", "/manifest.json"]);
        let paths: Vec<_> = manifest.iter().collect();
        assert_eq!(paths, vec!["/", "/index.html", "/manifest.json"]);
    }

    #[test]
    fn test_len_and_empty() {
        let manifest = AssetManifest::new(Vec::new());
        assert!(manifest.is_empty());

        let manifest = AssetManifest::from(["/"]);
        assert_eq!(manifest.len(), 1);
        assert!(!manifest.is_empty());
    }
}
