use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::log;
use crate::storage::{ContentProvider, FileContentProvider};

pub trait HighScoreStore {
    fn load(&self) -> Result<u32>;
    fn save(&self, high_score: u32) -> Result<()>;
}

#[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
struct HighScoreRecord {
    snake_high_score: u32,
}

pub struct YamlHighScoreStore<P: ContentProvider> {
    provider: P,
}

impl<P: ContentProvider> YamlHighScoreStore<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }
}

impl YamlHighScoreStore<FileContentProvider> {
    pub fn from_file(path: impl Into<PathBuf>) -> Self {
        Self::new(FileContentProvider::new(path))
    }
}

impl<P: ContentProvider> HighScoreStore for YamlHighScoreStore<P> {
    fn load(&self) -> Result<u32> {
        match self.provider.get_content()? {
            Some(content) => {
                let record: HighScoreRecord = serde_yaml_ng::from_str(&content)?;
                Ok(record.snake_high_score)
            }
            None => Ok(0),
        }
    }

    fn save(&self, high_score: u32) -> Result<()> {
        let record = HighScoreRecord {
            snake_high_score: high_score,
        };
        self.provider.set_content(&serde_yaml_ng::to_string(&record)?)
    }
}

// Startup read: a broken record is reported and treated as no record at all.
pub fn load_or_default(store: &impl HighScoreStore) -> u32 {
    match store.load() {
        Ok(high_score) => high_score,
        Err(err) => {
            log!("could not read high score, starting from 0: {}", err);
            0
        }
    }
}
