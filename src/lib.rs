pub mod args;
pub mod games;
pub mod model;
pub mod storage;
pub mod parser {
    pub mod commands;
    pub mod numbers;
    mod scan;
    pub use commands::Command;
    pub use scan::{Intent, ScoreEntry, parse};
}
pub mod controller {
    pub mod api;
    pub mod grid;
    pub mod voice;
}
pub mod view {
    pub mod index;
    pub mod scoreboard;
}

pub use controller::grid::{GridController, ScoreSession};
pub use model::{GridError, RankingRow};
