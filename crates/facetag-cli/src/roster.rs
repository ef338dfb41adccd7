//! Character roster: which reference image belongs to which name.
//!
//! The built-in table is used unless a TOML roster file is given:
//!
//! ```toml
//! [[character]]
//! name = "Frodo"
//! file = "frodo.jpg"
//! ```

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

const BUILTIN_ROSTER: [(&str, &str); 6] = [
    ("Frodo", "frodo.jpg"),
    ("Sam", "sam.jpg"),
    ("Aragorn", "aragorn.jpg"),
    ("Legolas", "legolas.jpg"),
    ("Gandalf", "gandalf.jpg"),
    ("Merry", "merry.jpg"),
];

#[derive(Error, Debug)]
pub enum RosterError {
    #[error("failed to read roster {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid roster TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("roster has no characters")]
    Empty,
    #[error("roster entry {index} has an empty name or file")]
    BlankEntry { index: usize },
}

/// One named character and its reference image file name.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Character {
    pub name: String,
    pub file: String,
}

/// Ordered character table; order is enrollment order.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Roster {
    #[serde(rename = "character", default)]
    pub characters: Vec<Character>,
}

impl Roster {
    pub fn builtin() -> Self {
        Self {
            characters: BUILTIN_ROSTER
                .iter()
                .map(|(name, file)| Character {
                    name: name.to_string(),
                    file: file.to_string(),
                })
                .collect(),
        }
    }

    pub fn parse(text: &str) -> Result<Self, RosterError> {
        let roster: Roster = toml::from_str(text)?;
        roster.validate()?;
        Ok(roster)
    }

    pub fn load(path: &Path) -> Result<Self, RosterError> {
        let text = std::fs::read_to_string(path).map_err(|source| RosterError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let roster = Self::parse(&text)?;
        tracing::info!(path = %path.display(), characters = roster.characters.len(), "roster loaded");
        Ok(roster)
    }

    fn validate(&self) -> Result<(), RosterError> {
        if self.characters.is_empty() {
            return Err(RosterError::Empty);
        }
        if let Some(index) = self
            .characters
            .iter()
            .position(|c| c.name.trim().is_empty() || c.file.trim().is_empty())
        {
            return Err(RosterError::BlankEntry { index });
        }
        Ok(())
    }

    /// (name, image path) pairs with files resolved under `images_dir`.
    pub fn resolve<'a>(&'a self, images_dir: &'a Path) -> impl Iterator<Item = (&'a str, PathBuf)> + 'a {
        self.characters
            .iter()
            .map(move |c| (c.name.as_str(), images_dir.join(&c.file)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_order() {
        let roster = Roster::builtin();
        let names: Vec<_> = roster.characters.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["Frodo", "Sam", "Aragorn", "Legolas", "Gandalf", "Merry"]);
        assert_eq!(roster.characters[4].file, "gandalf.jpg");
    }

    #[test]
    fn test_parse_keeps_file_order() {
        let roster = Roster::parse(
            r#"
            [[character]]
            name = "Sam"
            file = "sam.png"

            [[character]]
            name = "Frodo"
            file = "frodo.png"
            "#,
        )
        .unwrap();
        assert_eq!(
            roster.characters,
            vec![
                Character { name: "Sam".into(), file: "sam.png".into() },
                Character { name: "Frodo".into(), file: "frodo.png".into() },
            ]
        );
    }

    #[test]
    fn test_parse_empty_roster_fails() {
        assert!(matches!(Roster::parse(""), Err(RosterError::Empty)));
    }

    #[test]
    fn test_parse_blank_entry_fails() {
        let err = Roster::parse(
            r#"
            [[character]]
            name = "Sam"
            file = "sam.png"

            [[character]]
            name = " "
            file = "x.png"
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, RosterError::BlankEntry { index: 1 }));
    }

    #[test]
    fn test_parse_missing_field_fails() {
        let err = Roster::parse("[[character]]\nname = \"Sam\"\n").unwrap_err();
        assert!(matches!(err, RosterError::Parse(_)));
    }

    #[test]
    fn test_resolve_joins_images_dir() {
        let roster = Roster::builtin();
        let dir = Path::new("images");
        let first = roster.resolve(dir).next().unwrap();
        assert_eq!(first, ("Frodo", PathBuf::from("images/frodo.jpg")));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = Roster::load(&dir.path().join("cast.toml")).unwrap_err();
        assert!(matches!(err, RosterError::Read { .. }));
    }
}
