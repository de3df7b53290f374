use crate::error::InitError;
use crate::library::logger::interface::Logger;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

/// How a model output index is turned into a label-table key.
///
/// This is a convention fixed when the model was trained and cannot be
/// recovered from the network itself.
#[derive(Debug, Clone, PartialEq)]
pub enum ClassKeys {
    /// key = index + offset
    Offset(usize),
    /// key = the entry at `index`
    Explicit(Vec<String>),
}

impl Default for ClassKeys {
    fn default() -> Self {
        ClassKeys::Offset(1)
    }
}

impl ClassKeys {
    pub fn key_for_index(&self, index: usize) -> String {
        match self {
            ClassKeys::Offset(offset) => (index as u128 + *offset as u128).to_string(),
            ClassKeys::Explicit(keys) => keys
                .get(index)
                .cloned()
                .unwrap_or_else(|| index.to_string()),
        }
    }

    /// Sorted names of the sub-directories of a training directory, one per
    /// class, matching the order the training data loader assigned indices.
    pub fn from_training_dir(dir: &Path) -> Result<Self, InitError> {
        let to_error = |source| InitError::ClassKeys {
            path: dir.to_path_buf(),
            source,
        };

        let mut keys = Vec::new();
        for entry in std::fs::read_dir(dir).map_err(to_error)? {
            let entry = entry.map_err(to_error)?;
            if entry.file_type().map_err(to_error)?.is_dir() {
                keys.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        keys.sort();

        Ok(ClassKeys::Explicit(keys))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LabelTable {
    names: HashMap<String, String>,
    keys: ClassKeys,
    placeholder: bool,
}

impl LabelTable {
    pub fn new(names: HashMap<String, String>, keys: ClassKeys) -> Self {
        Self {
            names,
            keys,
            placeholder: false,
        }
    }

    /// "Unknown Flower <key>" for every class, used when no name file exists.
    pub fn placeholder(class_count: usize, keys: ClassKeys) -> Self {
        let names = (0..class_count)
            .map(|index| {
                let key = keys.key_for_index(index);
                let name = format!("Unknown Flower {}", key);
                (key, name)
            })
            .collect();

        Self {
            names,
            keys,
            placeholder: true,
        }
    }

    pub fn from_json(json: &str, keys: ClassKeys) -> Result<Self, serde_json::Error> {
        let names: HashMap<String, String> = serde_json::from_str(json)?;
        Ok(Self::new(names, keys))
    }

    /// A missing file is not an error: the table falls back to placeholders.
    pub fn load(
        path: &Path,
        class_count: usize,
        keys: ClassKeys,
        logger: &Arc<dyn Logger + Send + Sync>,
    ) -> Result<Self, InitError> {
        let json = match std::fs::read_to_string(path) {
            Ok(json) => json,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let _ = logger.error(&format!(
                    "{} not found, using placeholder names for {} classes",
                    path.display(),
                    class_count
                ));
                return Ok(Self::placeholder(class_count, keys));
            }
            Err(source) => {
                return Err(InitError::LabelTableRead {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        let table = Self::from_json(&json, keys).map_err(|source| InitError::LabelTableFormat {
            path: path.to_path_buf(),
            source,
        })?;

        let _ = logger.info(&format!("Loaded {} flower names", table.len()));

        Ok(table)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn is_placeholder(&self) -> bool {
        self.placeholder
    }

    pub fn keys(&self) -> &ClassKeys {
        &self.keys
    }

    pub fn name_for_key(&self, key: &str) -> Option<&str> {
        self.names.get(key).map(String::as_str)
    }

    /// Returns the class key and its display name, or "Unknown class <index>"
    /// when the key has no entry.
    pub fn label_for_index(&self, index: usize) -> (String, String) {
        let key = self.keys.key_for_index(index);
        let label = match self.name_for_key(&key) {
            Some(name) => name.to_string(),
            None => format!("Unknown class {}", index),
        };
        (key, label)
    }

    /// Case-insensitive substring match on names, ordered by numeric key.
    pub fn search(&self, term: &str) -> Vec<(&str, &str)> {
        let term = term.to_lowercase();
        let mut found: Vec<(&str, &str)> = self
            .names
            .iter()
            .filter(|(_, name)| name.to_lowercase().contains(&term))
            .map(|(key, name)| (key.as_str(), name.as_str()))
            .collect();

        found.sort_by_key(|(key, _)| (key.parse::<u64>().unwrap_or(u64::MAX), key.to_string()));
        found
    }
}
