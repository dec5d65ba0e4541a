//! File handler for the well-known generated-source files.
//!
//! Files are overwritten wholesale on every save; content is written exactly
//! as generated, without validation.

use std::fs;
use std::path::{Path, PathBuf};

/// Reads and writes generated source files inside one output directory.
#[derive(Debug, Clone)]
pub struct FileHandler {
    /// Directory for file storage.
    pub directory: PathBuf,
}

impl FileHandler {
    /// Create a new `FileHandler` for the given directory.
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    /// Full path of `filename` inside the handler's directory.
    pub fn path(&self, filename: &str) -> PathBuf {
        self.directory.join(filename)
    }

    /// Load a file's text content.
    ///
    /// Returns `None` if the file does not exist or cannot be read.
    pub fn load(&self, filename: &str) -> Option<String> {
        let path = self.path(filename);
        if path.exists() {
            fs::read_to_string(&path).ok()
        } else {
            None
        }
    }

    /// Save text to a file, replacing any previous content.
    ///
    /// Creates the directory (and any parent of `filename`) if missing.
    pub fn save(&self, filename: &str, content: &str) -> std::io::Result<PathBuf> {
        let path = self.path(filename);
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(&path, content)?;
        Ok(path)
    }

    /// Check if a file exists in the handler's directory.
    pub fn exists(&self, filename: &str) -> bool {
        Path::new(&self.directory).join(filename).exists()
    }
}

impl Default for FileHandler {
    fn default() -> Self {
        Self::new(".")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_then_load_is_byte_identical() {
        let dir = tempfile::tempdir().unwrap();
        let handler = FileHandler::new(dir.path());
        let source = "from crewai import Crew\n\n# ünïcode ✓\r\nprint('x')\n";

        let path = handler.save("generated_crew.py", source).unwrap();
        assert_eq!(path, dir.path().join("generated_crew.py"));
        assert_eq!(handler.load("generated_crew.py").unwrap(), source);
    }

    #[test]
    fn test_save_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let handler = FileHandler::new(dir.path());
        handler.save("generated_tool.py", "first version, longer").unwrap();
        handler.save("generated_tool.py", "second").unwrap();
        assert_eq!(handler.load("generated_tool.py").unwrap(), "second");
    }

    #[test]
    fn test_save_creates_nested_directories() {
        let dir = tempfile::tempdir().unwrap();
        let handler = FileHandler::new(dir.path().join("out"));
        handler.save("tools/temp_tool.py", "name = 'x'").unwrap();
        assert!(handler.exists("tools/temp_tool.py"));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let handler = FileHandler::new(dir.path());
        assert!(handler.load("nope.py").is_none());
    }
}
