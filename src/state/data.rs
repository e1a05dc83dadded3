/// Shared data structures for the application state
///
/// These structs represent the data model that flows between
/// the database layer and the UI layer.

use std::fmt;

/// A game developer or publisher
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Developer {
    /// Unique database ID
    pub id: i64,
    /// Display name, unique across the catalogue
    pub name: String,
}

/// A single game as listed in the grid, joined with its developer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameEntry {
    /// Unique database ID
    pub id: i64,
    /// Title shown on the card
    pub title: String,
    /// Path to the cover image as chosen in the file picker
    pub image_path: String,
    /// Developer name, None when the game has no developer
    pub developer_name: Option<String>,
}

/// A game ready to be inserted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewGame {
    pub title: String,
    pub image_path: String,
    pub developer_id: Option<i64>,
}

/// Entry of the developer selector in the "Add Game" form
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DeveloperChoice {
    /// The game is added without a developer
    #[default]
    None,
    Developer(Developer),
}

impl DeveloperChoice {
    /// Database ID of the chosen developer, if any
    pub fn developer_id(&self) -> Option<i64> {
        match self {
            DeveloperChoice::None => None,
            DeveloperChoice::Developer(developer) => Some(developer.id),
        }
    }
}

impl fmt::Display for DeveloperChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeveloperChoice::None => write!(f, "None"),
            DeveloperChoice::Developer(developer) => write!(f, "{}", developer.name),
        }
    }
}
