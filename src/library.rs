//! Where level text comes from: a directory of `.txt` files or an in-memory map.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::constants::LEVEL_EXTENSION;
use crate::error::LibraryError;
use crate::level::Level;

pub trait LevelSource {
    fn load_level(&self, name: &str) -> Result<String, LibraryError>;
}

pub struct LevelLibrary {
    dir: PathBuf,
}

impl LevelLibrary {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Level names (file stems), sorted. A missing directory lists as empty.
    pub fn list(&self) -> Result<Vec<String>, LibraryError> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(error) if error.kind() == io::ErrorKind::NotFound => {
                debug!(dir = %self.dir.display(), "levels directory does not exist");
                return Ok(Vec::new());
            }
            Err(source) => {
                return Err(LibraryError::Io {
                    path: self.dir.clone(),
                    source,
                })
            }
        };

        let mut names = Vec::new();
        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(error) => {
                    warn!(dir = %self.dir.display(), %error, "skipping unreadable directory entry");
                    continue;
                }
            };
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            if path.extension().and_then(|ext| ext.to_str()) != Some(LEVEL_EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
                names.push(stem.to_string());
            }
        }
        names.sort();
        debug!(dir = %self.dir.display(), count = names.len(), "listed levels");
        Ok(names)
    }

    /// Writes the `"<rows> <cols>"` header followed by the level rows.
    pub fn save(&self, name: &str, level: &Level) -> Result<PathBuf, LibraryError> {
        let path = self.path_for(name)?;
        fs::create_dir_all(&self.dir).map_err(|source| LibraryError::Io {
            path: self.dir.clone(),
            source,
        })?;
        fs::write(&path, level.to_level_text(true)).map_err(|source| LibraryError::Io {
            path: path.clone(),
            source,
        })?;
        debug!(path = %path.display(), "saved level");
        Ok(path)
    }

    pub fn delete(&self, name: &str) -> Result<(), LibraryError> {
        let path = self.path_for(name)?;
        match fs::remove_file(&path) {
            Ok(()) => {
                debug!(path = %path.display(), "deleted level");
                Ok(())
            }
            Err(error) if error.kind() == io::ErrorKind::NotFound => {
                Err(LibraryError::NotFound(name.to_string()))
            }
            Err(source) => Err(LibraryError::Io { path, source }),
        }
    }

    fn path_for(&self, name: &str) -> Result<PathBuf, LibraryError> {
        let stem = normalize_name(name)?;
        Ok(self.dir.join(format!("{stem}.{LEVEL_EXTENSION}")))
    }
}

impl LevelSource for LevelLibrary {
    fn load_level(&self, name: &str) -> Result<String, LibraryError> {
        let path = self.path_for(name)?;
        match fs::read_to_string(&path) {
            Ok(text) => Ok(text),
            Err(error) if error.kind() == io::ErrorKind::NotFound => {
                Err(LibraryError::NotFound(name.to_string()))
            }
            Err(source) => Err(LibraryError::Io { path, source }),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct MemoryLevels {
    levels: BTreeMap<String, String>,
}

impl MemoryLevels {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: &str, text: impl Into<String>) -> Result<(), LibraryError> {
        let stem = normalize_name(name)?;
        self.levels.insert(stem.to_string(), text.into());
        Ok(())
    }

    pub fn names(&self) -> Vec<String> {
        self.levels.keys().cloned().collect()
    }
}

impl LevelSource for MemoryLevels {
    fn load_level(&self, name: &str) -> Result<String, LibraryError> {
        let stem = normalize_name(name)?;
        self.levels
            .get(stem)
            .cloned()
            .ok_or_else(|| LibraryError::NotFound(name.to_string()))
    }
}

/// Strips an optional `.txt` suffix and rejects names that could escape the directory.
fn normalize_name(name: &str) -> Result<&str, LibraryError> {
    let trimmed = name.trim();
    let stem = trimmed
        .strip_suffix(&format!(".{LEVEL_EXTENSION}"))
        .unwrap_or(trimmed);
    if stem.is_empty()
        || stem.contains('/')
        || stem.contains('\\')
        || stem.contains("..")
        || stem.starts_with('.')
    {
        return Err(LibraryError::InvalidName(name.to_string()));
    }
    Ok(stem)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::parse;

    #[test]
    fn missing_directory_lists_empty() {
        let dir = tempfile::tempdir().expect("tempdir");
        let library = LevelLibrary::new(dir.path().join("nope"));
        assert_eq!(library.list().expect("list"), Vec::<String>::new());
    }

    #[test]
    fn save_list_load_delete_cycle() {
        let dir = tempfile::tempdir().expect("tempdir");
        let library = LevelLibrary::new(dir.path().join("levels"));
        let level = parse("WWWW\nWP.G\nWKoW\nWWWW").expect("level should parse");

        let path = library.save("beta", &level).expect("save");
        library.save("alpha.txt", &level).expect("save");
        fs::write(dir.path().join("levels").join("notes.md"), "ignored").expect("write");

        assert!(path.ends_with("beta.txt"));
        assert_eq!(library.list().expect("list"), vec!["alpha", "beta"]);

        let text = library.load_level("beta.txt").expect("load");
        assert!(text.starts_with("4 4\n"));
        assert_eq!(parse(&text).expect("reparse"), level);

        library.delete("alpha").expect("delete");
        assert_eq!(library.list().expect("list"), vec!["beta"]);
        assert!(matches!(
            library.delete("alpha"),
            Err(LibraryError::NotFound(_))
        ));
    }

    #[test]
    fn load_missing_level_is_not_found() {
        let dir = tempfile::tempdir().expect("tempdir");
        let library = LevelLibrary::new(dir.path());
        assert!(matches!(
            library.load_level("ghosts"),
            Err(LibraryError::NotFound(name)) if name == "ghosts"
        ));
    }

    #[test]
    fn names_that_escape_the_directory_are_rejected() {
        for name in ["", "../secret", "a/b", "a\\b", ".hidden", ".txt"] {
            assert!(
                matches!(normalize_name(name), Err(LibraryError::InvalidName(_))),
                "name {name:?} should be rejected"
            );
        }
        assert_eq!(normalize_name("maze.txt").expect("valid"), "maze");
        assert_eq!(normalize_name(" maze ").expect("valid"), "maze");
    }

    #[test]
    fn memory_levels_serve_inserted_text() {
        let mut levels = MemoryLevels::new();
        levels.insert("one.txt", "P.o").expect("insert");
        assert_eq!(levels.load_level("one").expect("load"), "P.o");
        assert_eq!(levels.names(), vec!["one"]);
        assert!(matches!(
            levels.load_level("two"),
            Err(LibraryError::NotFound(_))
        ));
    }
}
