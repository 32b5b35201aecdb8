use crate::models::PageFile;
use crate::models::page_file::SOURCE_EXTENSION;
use crate::serialize::PageSource;
use relative_path::{RelativePath, RelativePathBuf};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum IoError {
    #[error("File not found: {0}")]
    NotFound(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid page source {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("Invalid pages directory: {0}")]
    InvalidPagesDir(String),
}

/// Read and parse a stored page source
pub fn read_source(relative_path: &RelativePath, pages_root: &Path) -> Result<PageSource, IoError> {
    let absolute_path = relative_path.to_path(pages_root);
    if !absolute_path.exists() {
        return Err(IoError::NotFound(absolute_path));
    }
    let text = fs::read_to_string(&absolute_path)?;
    serde_json::from_str(&text).map_err(|source| IoError::Parse {
        path: absolute_path,
        source,
    })
}

/// Write a page source as pretty JSON, creating parent directories
pub fn write_source(
    relative_path: &RelativePath,
    pages_root: &Path,
    source: &PageSource,
) -> Result<(), IoError> {
    let absolute_path = relative_path.to_path(pages_root);

    if let Some(parent) = absolute_path.parent() {
        fs::create_dir_all(parent)?;
    }

    let json = serde_json::to_string_pretty(source).map_err(|err| IoError::Parse {
        path: absolute_path.clone(),
        source: err,
    })?;
    fs::write(&absolute_path, json)?;
    log::debug!("wrote page source {}", absolute_path.display());
    Ok(())
}

/// List page sources under the pages directory, sorted by path
pub fn scan_sources(pages_root: &Path) -> Result<Vec<PageFile>, IoError> {
    validate_pages_dir(pages_root)?;

    let mut files = Vec::new();
    scan_directory_recursive(pages_root, &mut files)?;
    files.sort();
    Ok(files
        .iter()
        .filter_map(|path| path.strip_prefix(pages_root).ok())
        .filter_map(|path| RelativePathBuf::from_path(path).ok())
        .map(PageFile::new)
        .collect())
}

fn scan_directory_recursive(dir: &Path, files: &mut Vec<PathBuf>) -> Result<(), IoError> {
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();

        if path.is_dir() {
            scan_directory_recursive(&path, files)?;
        } else if let Some(ext) = path.extension()
            && ext == SOURCE_EXTENSION
        {
            files.push(path);
        }
    }

    Ok(())
}

pub fn validate_pages_dir(path: &Path) -> Result<(), IoError> {
    if !path.is_dir() {
        return Err(IoError::InvalidPagesDir(format!(
            "{} is not a directory",
            path.display()
        )));
    }

    Ok(())
}
