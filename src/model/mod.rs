use serde::Serialize;
use std::fmt;

/// Roster entry. Names keep their original casing; matching is
/// case-insensitive everywhere.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Player {
    pub name: String,
}

/// Scoring bucket for the dice games. Every value written under a category
/// must be a non-negative multiple of its point multiplier.
#[derive(Debug, PartialEq, Eq)]
pub struct Category {
    pub code: &'static str,
    /// The word players actually say ("reyes", "ases", ...).
    pub word: &'static str,
    pub label: &'static str,
    pub multiplier: i32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionId {
    Free,
    Forced,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RankDirection {
    HigherWins,
    LowerWins,
}

/// One scoring column. Regenerated from the game descriptor, never persisted.
#[derive(Clone, Debug, PartialEq)]
pub struct RoundSlot {
    pub label: String,
    pub category: Option<&'static Category>,
    pub section: Option<SectionId>,
}

/// A single (player, round) cell. An out-of-range categorized value is kept
/// but flagged, so the table still shows what was heard.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ScoreCell {
    pub value: Option<i32>,
    pub invalid: bool,
}

impl ScoreCell {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.value.is_none()
    }

    /// Counted toward the player's total?
    #[must_use]
    pub fn counts(&self) -> Option<i32> {
        if self.invalid { None } else { self.value }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct CellRef {
    pub player: usize,
    pub round: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HistoryEntry {
    pub cell: CellRef,
    pub previous: Option<i32>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RankingRow {
    /// Competition rank: ties share a rank, the next distinct total resumes
    /// at position + 1.
    pub rank: usize,
    pub player: String,
    pub total: i32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    Unstarted,
    InProgress,
    Complete,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GridError {
    PlayerNotFound(String),
    DuplicatePlayer(String),
    /// Fixed-length game with no empty cell left for that player.
    GameComplete,
    /// Forced-section write attempted while the free section is open.
    SectionLocked,
    EmptyHistory,
    BadCellRef,
    Store(String),
}

impl fmt::Display for GridError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GridError::PlayerNotFound(name) => write!(f, "player not found: {name}"),
            GridError::DuplicatePlayer(name) => write!(f, "player already in roster: {name}"),
            GridError::GameComplete => write!(f, "all rounds are complete"),
            GridError::SectionLocked => {
                write!(f, "forced section is locked until the free section is complete")
            }
            GridError::EmptyHistory => write!(f, "nothing to undo"),
            GridError::BadCellRef => write!(f, "cell reference out of range"),
            GridError::Store(s) => write!(f, "store error: {s}"),
        }
    }
}

impl std::error::Error for GridError {}

impl From<rusqlite::Error> for GridError {
    fn from(e: rusqlite::Error) -> Self {
        Self::Store(e.to_string())
    }
}

impl From<serde_json::Error> for GridError {
    fn from(e: serde_json::Error) -> Self {
        Self::Store(e.to_string())
    }
}
