//! Files inside a directory, opened in append mode.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use super::Destination;

/// File-backed destination rooted at a directory.
#[derive(Debug, Clone)]
pub struct FileDestination {
    directory: PathBuf,
}

impl FileDestination {
    /// Create destinations inside `directory`, creating it on first open.
    #[must_use]
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    /// Directory files are created in.
    #[must_use]
    pub fn directory(&self) -> &Path {
        &self.directory
    }
}

impl Destination for FileDestination {
    fn open(&mut self, name: &str) -> io::Result<Box<dyn Write + Send>> {
        fs::create_dir_all(&self.directory)?;
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.directory.join(name))?;
        Ok(Box::new(file))
    }
}
