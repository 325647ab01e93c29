use std::io::ErrorKind;
use std::path::PathBuf;

use crate::error::Result;

// Backing store for small text documents (config, high score).
// `Ok(None)` means the document does not exist yet.
pub trait ContentProvider {
    fn get_content(&self) -> Result<Option<String>>;
    fn set_content(&self, content: &str) -> Result<()>;
}

pub struct FileContentProvider {
    file_path: PathBuf,
}

impl FileContentProvider {
    pub fn new(file_path: impl Into<PathBuf>) -> Self {
        Self {
            file_path: file_path.into(),
        }
    }
}

impl ContentProvider for FileContentProvider {
    fn get_content(&self) -> Result<Option<String>> {
        match std::fs::read_to_string(&self.file_path) {
            Ok(content) => Ok(Some(content)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn set_content(&self, content: &str) -> Result<()> {
        std::fs::write(&self.file_path, content)?;
        Ok(())
    }
}
