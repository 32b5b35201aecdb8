use relative_path::{RelativePath, RelativePathBuf};

/// Extension of stored page sources.
pub const SOURCE_EXTENSION: &str = "json";

/// A stored page source with a relative path and display-friendly slug
#[derive(Debug, Clone, PartialEq)]
pub struct PageFile {
    relative_path: RelativePathBuf,
    slug: String,
}

impl PageFile {
    /// Create a new PageFile from a relative path
    pub fn new(relative_path: RelativePathBuf) -> Self {
        let slug = Self::extract_slug(&relative_path);
        Self {
            relative_path,
            slug,
        }
    }

    /// Source path for a page slug, e.g. `about` -> `about.json`
    pub fn for_slug(slug: &str) -> Self {
        Self::new(RelativePathBuf::from(format!("{slug}.{SOURCE_EXTENSION}")))
    }

    pub fn relative_path(&self) -> &RelativePath {
        &self.relative_path
    }

    /// The slug (file name without extension)
    pub fn slug(&self) -> &str {
        &self.slug
    }

    fn extract_slug(path: &RelativePath) -> String {
        path.file_stem().unwrap_or("untitled").to_string()
    }
}

impl From<&str> for PageFile {
    fn from(path: &str) -> Self {
        Self::new(RelativePathBuf::from(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slug_strips_extension() {
        let file = PageFile::from("blog/hello-world.json");
        assert_eq!(file.slug(), "hello-world");
        assert_eq!(file.relative_path().as_str(), "blog/hello-world.json");
    }

    #[test]
    fn for_slug_adds_extension() {
        let file = PageFile::for_slug("about");
        assert_eq!(file.relative_path().as_str(), "about.json");
        assert_eq!(file.slug(), "about");
    }
}
