use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Team position exactly as the Riot API reports it (`teamPosition`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum Position {
    Top,
    Jungle,
    Middle,
    Bottom,
    Utility,
    #[default]
    Unknown,
}

impl From<&str> for Position {
    fn from(value: &str) -> Self {
        // Match to values from Riot API
        match value.trim().to_lowercase().as_str() {
            "top" => Position::Top,
            "jungle" => Position::Jungle,
            "middle" => Position::Middle,
            "bottom" => Position::Bottom,
            "utility" => Position::Utility,
            _ => Position::Unknown,
        }
    }
}

impl Position {
    /// The five-way role of this position, if it has one. Scoring uses this
    /// directly so that unknown positions get the neutral policy.
    pub fn role(self) -> Option<Role> {
        match self {
            Position::Top => Some(Role::Top),
            Position::Jungle => Some(Role::Jng),
            Position::Middle => Some(Role::Mid),
            Position::Bottom => Some(Role::Adc),
            Position::Utility => Some(Role::Sup),
            Position::Unknown => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Top,
    Jng,
    Mid,
    Adc,
    Sup,
}

impl Role {
    /// Role shown for a participant. Positions without a role (remakes,
    /// ARAM, missing data) are shown as MID.
    pub fn displayed(position: Position) -> Self {
        position.role().unwrap_or(Role::Mid)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Top => "TOP",
            Role::Jng => "JNG",
            Role::Mid => "MID",
            Role::Adc => "ADC",
            Role::Sup => "SUP",
        }
    }
}

impl Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
