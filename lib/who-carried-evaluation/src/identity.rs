use serde::Serialize;
use std::fmt::Display;
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use thiserror::Error;

/// Tag assumed when a Riot ID is given without one.
pub const DEFAULT_TAG: &str = "KR1";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum IdentityParseError {
    #[error("riot id has an empty game name: {0:?}")]
    EmptyName(String),
    #[error("riot id has an empty tag: {0:?}")]
    EmptyTag(String),
}

/// A Riot ID (`gameName#tagLine`).
///
/// Two identities are equal when their names and tags match ignoring case and
/// whitespace, so `"Foo Bar#KR1"` and `"foobar#kr1"` are the same account.
#[derive(Debug, Clone, Serialize)]
pub struct Identity {
    game_name: String,
    tag_line: String,
    #[serde(skip)]
    key: String,
}

impl Identity {
    pub fn new(game_name: impl Into<String>, tag_line: impl Into<String>) -> Self {
        let game_name = game_name.into();
        let tag_line = tag_line.into();
        let key = normalize(&game_name, &tag_line);
        Self {
            game_name,
            tag_line,
            key,
        }
    }

    pub fn game_name(&self) -> &str {
        &self.game_name
    }

    pub fn tag_line(&self) -> &str {
        &self.tag_line
    }

    /// Normalized comparison key, e.g. `FOOBAR#KR1`.
    pub fn key(&self) -> &str {
        &self.key
    }
}

fn normalize(game_name: &str, tag_line: &str) -> String {
    format!("{game_name}#{tag_line}")
        .chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_uppercase)
        .collect()
}

impl PartialEq for Identity {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for Identity {}

impl Hash for Identity {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}

impl Display for Identity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}#{}", self.game_name, self.tag_line)
    }
}

impl FromStr for Identity {
    type Err = IdentityParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, tag) = s.split_once('#').unwrap_or((s, DEFAULT_TAG));
        let (name, tag) = (name.trim(), tag.trim());
        if name.is_empty() {
            return Err(IdentityParseError::EmptyName(s.to_string()));
        }
        if tag.is_empty() {
            return Err(IdentityParseError::EmptyTag(s.to_string()));
        }
        Ok(Identity::new(name, tag))
    }
}
