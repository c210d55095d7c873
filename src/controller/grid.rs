use std::collections::BTreeMap;
use std::sync::Arc;

use crate::games::{GameDescriptor, RoundScheme};
use crate::model::{
    CellRef, GridError, HistoryEntry, Player, RankDirection, RankingRow, RoundSlot, ScoreCell,
    SectionId, SessionPhase,
};
use crate::storage::{KvStore, SCHEMA_VERSION, SavedSession};

/// The live scoring grid for one game: roster, round columns, cells, undo
/// history and the end-of-game announcement guard. Pure state; persistence
/// is layered on by [`GridController`].
pub struct ScoreSession {
    descriptor: &'static GameDescriptor,
    players: Vec<Player>,
    rounds: Vec<RoundSlot>,
    cells: Vec<Vec<ScoreCell>>,
    history: Vec<HistoryEntry>,
    target_score: Option<i32>,
    announced: bool,
}

impl ScoreSession {
    #[must_use]
    pub fn new(descriptor: &'static GameDescriptor) -> Self {
        Self {
            descriptor,
            players: Vec::new(),
            rounds: descriptor.round_plan(0),
            cells: Vec::new(),
            history: Vec::new(),
            target_score: descriptor.default_target,
            announced: false,
        }
    }

    #[must_use]
    pub fn descriptor(&self) -> &'static GameDescriptor {
        self.descriptor
    }

    #[must_use]
    pub fn players(&self) -> &[Player] {
        &self.players
    }

    #[must_use]
    pub fn rounds(&self) -> &[RoundSlot] {
        &self.rounds
    }

    #[must_use]
    pub fn cell(&self, cell: CellRef) -> Option<&ScoreCell> {
        self.cells.get(cell.player).and_then(|row| row.get(cell.round))
    }

    #[must_use]
    pub fn target_score(&self) -> Option<i32> {
        self.target_score
    }

    pub fn set_target_score(&mut self, target: Option<i32>) {
        self.target_score = target;
    }

    #[must_use]
    pub fn find_player(&self, name: &str) -> Option<usize> {
        let wanted = name.trim().to_lowercase();
        self.players.iter().position(|p| p.name.to_lowercase() == wanted)
    }

    /// # Errors
    ///
    /// Will return `Err` if the name is already in the roster (matching is
    /// case-insensitive).
    pub fn add_player(&mut self, name: &str) -> Result<(), GridError> {
        let name = name.trim();
        if self.find_player(name).is_some() {
            return Err(GridError::DuplicatePlayer(name.to_string()));
        }
        self.players.push(Player { name: name.to_string() });
        self.cells.push(Vec::new());
        self.rebuild_plan();
        Ok(())
    }

    /// # Errors
    ///
    /// Will return `Err` if the player is not in the roster.
    pub fn remove_player(&mut self, name: &str) -> Result<(), GridError> {
        let idx = self
            .find_player(name)
            .ok_or_else(|| GridError::PlayerNotFound(name.to_string()))?;
        self.players.remove(idx);
        self.cells.remove(idx);
        self.rebuild_plan();
        Ok(())
    }

    /// Regenerate the round plan after a roster change, keeping entered
    /// values by position. History is cleared: cell references recorded
    /// before the change may no longer point at the same cell.
    fn rebuild_plan(&mut self) {
        let plan = self.descriptor.round_plan(self.players.len());
        // open-ended grids keep rounds that were appended beyond the plan
        if !(self.descriptor.is_open_ended() && self.rounds.len() > plan.len()) {
            self.rounds = plan;
        }
        for row in &mut self.cells {
            row.resize(self.rounds.len(), ScoreCell::default());
        }
        self.history.clear();
        self.announced = false;
    }

    /// Write a dictated or typed score into the first eligible empty cell.
    ///
    /// Open-ended games grow a new round when the player's columns are full;
    /// fixed-length games report `GameComplete` instead. In the dice games
    /// the forced section only opens once the free section is complete for
    /// everyone, and a category-tagged entry lands on its category's column,
    /// overwriting a previous value there (last writer wins, undoable).
    /// A value that breaks the category multiplier is written anyway but
    /// flagged invalid and left out of the totals.
    ///
    /// # Errors
    ///
    /// Will return `Err` for an unknown player, a full fixed-length grid, or
    /// a forced-section write while the free section is still open.
    pub fn apply_score(
        &mut self,
        player: &str,
        points: i32,
        category: Option<&str>,
    ) -> Result<CellRef, GridError> {
        let p = self
            .find_player(player)
            .ok_or_else(|| GridError::PlayerNotFound(player.to_string()))?;
        let r = self.target_round(p, category)?;
        let cell = CellRef { player: p, round: r };
        self.history.push(HistoryEntry { cell, previous: self.cells[p][r].value });
        self.cells[p][r] = ScoreCell {
            value: Some(points),
            invalid: !self.value_fits(r, points),
        };
        Ok(cell)
    }

    /// Direct cell write for manual edits. Last writer wins, including over
    /// voice entries, and the edit is undoable like any other write.
    ///
    /// # Errors
    ///
    /// Will return `Err` if the reference is out of range.
    pub fn edit_cell(&mut self, cell: CellRef, value: Option<i32>) -> Result<(), GridError> {
        let current = *self.cell(cell).ok_or(GridError::BadCellRef)?;
        self.history.push(HistoryEntry { cell, previous: current.value });
        self.cells[cell.player][cell.round] = ScoreCell {
            value,
            invalid: value.is_some_and(|v| !self.value_fits(cell.round, v)),
        };
        Ok(())
    }

    /// Strict inverse of the most recent write.
    ///
    /// # Errors
    ///
    /// Will return `Err` if there is nothing to undo.
    pub fn undo(&mut self) -> Result<CellRef, GridError> {
        let entry = self.history.pop().ok_or(GridError::EmptyHistory)?;
        let CellRef { player, round } = entry.cell;
        self.cells[player][round] = ScoreCell {
            value: entry.previous,
            invalid: entry.previous.is_some_and(|v| !self.value_fits(round, v)),
        };
        Ok(entry.cell)
    }

    /// Empty every cell and forget the history. Confirmation is the caller's
    /// responsibility; this method just does it.
    pub fn clear_all(&mut self) {
        if self.descriptor.is_open_ended() {
            self.rounds = self.descriptor.round_plan(self.players.len());
        }
        for row in &mut self.cells {
            row.clear();
            row.resize(self.rounds.len(), ScoreCell::default());
        }
        self.history.clear();
        self.announced = false;
    }

    fn value_fits(&self, round: usize, points: i32) -> bool {
        match self.rounds[round].category {
            Some(cat) => points >= 0 && points % cat.multiplier == 0,
            None => true,
        }
    }

    fn target_round(&mut self, p: usize, category: Option<&str>) -> Result<usize, GridError> {
        let category = category.and_then(|c| self.descriptor.category(c));
        match self.descriptor.scheme {
            RoundScheme::TwoSection => {
                if self.section_complete(SectionId::Free) {
                    self.round_in(p, SectionId::Forced, category)
                        .ok_or(GridError::GameComplete)
                } else {
                    self.round_in(p, SectionId::Free, category)
                        .ok_or(GridError::SectionLocked)
                }
            }
            RoundScheme::Open { .. } => match self.first_empty_round(p) {
                Some(r) => Ok(r),
                None => {
                    self.append_round();
                    Ok(self.rounds.len() - 1)
                }
            },
            _ => self.first_empty_round(p).ok_or(GridError::GameComplete),
        }
    }

    fn first_empty_round(&self, p: usize) -> Option<usize> {
        self.cells[p].iter().position(ScoreCell::is_empty)
    }

    /// Target column for the player inside one section. A categorized entry
    /// always takes its category's column, overwriting any previous value
    /// there; a score said for "reyes" must never land under another
    /// category. Uncategorized entries take the first empty column.
    fn round_in(
        &self,
        p: usize,
        section: SectionId,
        category: Option<&'static crate::model::Category>,
    ) -> Option<usize> {
        if let Some(cat) = category {
            return self
                .rounds
                .iter()
                .position(|slot| slot.section == Some(section) && slot.category == Some(cat));
        }
        self.rounds
            .iter()
            .enumerate()
            .find(|(r, slot)| slot.section == Some(section) && self.cells[p][*r].is_empty())
            .map(|(r, _)| r)
    }

    fn append_round(&mut self) {
        self.rounds.push(RoundSlot {
            label: (self.rounds.len() + 1).to_string(),
            category: None,
            section: None,
        });
        for row in &mut self.cells {
            row.push(ScoreCell::default());
        }
    }

    /// True when every cell of the section, across all players, holds a
    /// valid value. Gates the forced section of the dice games.
    #[must_use]
    pub fn section_complete(&self, section: SectionId) -> bool {
        if self.players.is_empty() {
            return false;
        }
        self.rounds
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.section == Some(section))
            .all(|(r, _)| self.cells.iter().all(|row| row[r].counts().is_some()))
    }

    /// Per-player sums over valid cells only. Always derived, never stored.
    #[must_use]
    pub fn totals(&self) -> Vec<i32> {
        self.cells
            .iter()
            .map(|row| row.iter().filter_map(ScoreCell::counts).fold(0_i32, i32::saturating_add))
            .collect()
    }

    #[must_use]
    pub fn compute_ranking(&self) -> Vec<RankingRow> {
        let mut rows: Vec<RankingRow> = self
            .players
            .iter()
            .zip(self.totals())
            .map(|(player, total)| RankingRow { rank: 0, player: player.name.clone(), total })
            .collect();
        match self.descriptor.direction {
            RankDirection::HigherWins => rows.sort_by(|a, b| b.total.cmp(&a.total)),
            RankDirection::LowerWins => rows.sort_by(|a, b| a.total.cmp(&b.total)),
        }
        let mut last_total = None;
        let mut rank = 0;
        for (i, row) in rows.iter_mut().enumerate() {
            if last_total != Some(row.total) {
                rank = i + 1;
                last_total = Some(row.total);
            }
            row.rank = rank;
        }
        rows
    }

    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        if self.players.is_empty()
            || self.cells.iter().all(|row| row.iter().all(ScoreCell::is_empty))
        {
            return SessionPhase::Unstarted;
        }
        let every_cell_valid = self
            .cells
            .iter()
            .all(|row| row.iter().all(|c| c.counts().is_some()));
        if !self.descriptor.is_open_ended() && every_cell_valid {
            SessionPhase::Complete
        } else {
            SessionPhase::InProgress
        }
    }

    /// True exactly once per transition into `Complete`. Edits that reopen
    /// the grid re-arm the announcement.
    pub fn completion_event(&mut self) -> bool {
        if self.phase() == SessionPhase::Complete {
            if !self.announced {
                self.announced = true;
                return true;
            }
        } else {
            self.announced = false;
        }
        false
    }

    #[must_use]
    pub fn to_saved(&self) -> SavedSession {
        let mut scores = BTreeMap::new();
        for (player, row) in self.players.iter().zip(&self.cells) {
            let values = row
                .iter()
                .map(|c| c.value.map(|v| v.to_string()).unwrap_or_default())
                .collect();
            scores.insert(player.name.clone(), values);
        }
        SavedSession {
            version: SCHEMA_VERSION,
            game: self.descriptor.key.to_string(),
            players: self.players.iter().map(|p| p.name.clone()).collect(),
            scores,
            target_score: self.target_score,
            saved_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Rebuild a session from its saved document. Unparseable cell strings
    /// load as empty; rows longer than the plan extend open-ended grids and
    /// are truncated for fixed ones.
    #[must_use]
    pub fn hydrate(descriptor: &'static GameDescriptor, saved: &SavedSession) -> Self {
        let mut session = Self::new(descriptor);
        for name in &saved.players {
            // duplicates in a hand-edited document are skipped, not fatal
            let _ = session.add_player(name);
        }
        session.target_score = saved.target_score.or(descriptor.default_target);

        if descriptor.is_open_ended() {
            let widest = saved.scores.values().map(Vec::len).max().unwrap_or(0);
            while session.rounds.len() < widest {
                session.append_round();
            }
        }

        let names: Vec<String> = session.players.iter().map(|p| p.name.clone()).collect();
        for (p, name) in names.iter().enumerate() {
            let Some(values) = saved.scores.get(name) else { continue };
            for (r, raw) in values.iter().enumerate() {
                if r >= session.rounds.len() {
                    break;
                }
                if let Ok(v) = raw.parse::<i32>() {
                    session.cells[p][r] =
                        ScoreCell { value: Some(v), invalid: !session.value_fits(r, v) };
                }
            }
        }
        session
    }
}

/// A [`ScoreSession`] plus its store: every mutation is followed by one
/// synchronous fire-and-forget save. A failed write is logged and the
/// in-memory state stays authoritative until the next save succeeds.
pub struct GridController {
    session: ScoreSession,
    store: Arc<dyn KvStore>,
}

impl GridController {
    /// Load the saved session for this game, falling back to an empty grid
    /// when there is none or the document does not match the current schema.
    #[must_use]
    pub fn new(descriptor: &'static GameDescriptor, store: Arc<dyn KvStore>) -> Self {
        let session = Self::load(store.as_ref(), descriptor);
        Self { session, store }
    }

    fn load(store: &dyn KvStore, descriptor: &'static GameDescriptor) -> ScoreSession {
        let key = SavedSession::storage_key(descriptor.key);
        let doc = match store.get(&key) {
            Ok(Some(doc)) => doc,
            Ok(None) => return ScoreSession::new(descriptor),
            Err(e) => {
                eprintln!("Error reading session {key}: {e}");
                return ScoreSession::new(descriptor);
            }
        };
        match serde_json::from_str::<SavedSession>(&doc) {
            Ok(saved) if saved.version == SCHEMA_VERSION && saved.game == descriptor.key => {
                ScoreSession::hydrate(descriptor, &saved)
            }
            Ok(saved) => {
                eprintln!(
                    "Session {key} has version {} for game {}, starting fresh",
                    saved.version, saved.game
                );
                ScoreSession::new(descriptor)
            }
            Err(e) => {
                eprintln!("Session {key} failed to parse, starting fresh: {e}");
                ScoreSession::new(descriptor)
            }
        }
    }

    #[must_use]
    pub fn session(&self) -> &ScoreSession {
        &self.session
    }

    /// # Errors
    ///
    /// See [`ScoreSession::apply_score`].
    pub fn apply_score(
        &mut self,
        player: &str,
        points: i32,
        category: Option<&str>,
    ) -> Result<CellRef, GridError> {
        let cell = self.session.apply_score(player, points, category)?;
        self.persist();
        Ok(cell)
    }

    /// # Errors
    ///
    /// See [`ScoreSession::edit_cell`].
    pub fn edit_cell(&mut self, cell: CellRef, value: Option<i32>) -> Result<(), GridError> {
        self.session.edit_cell(cell, value)?;
        self.persist();
        Ok(())
    }

    /// # Errors
    ///
    /// See [`ScoreSession::undo`].
    pub fn undo(&mut self) -> Result<CellRef, GridError> {
        let cell = self.session.undo()?;
        self.persist();
        Ok(cell)
    }

    pub fn clear_all(&mut self) {
        self.session.clear_all();
        self.persist();
    }

    /// # Errors
    ///
    /// See [`ScoreSession::add_player`].
    pub fn add_player(&mut self, name: &str) -> Result<(), GridError> {
        self.session.add_player(name)?;
        self.persist();
        Ok(())
    }

    /// # Errors
    ///
    /// See [`ScoreSession::remove_player`].
    pub fn remove_player(&mut self, name: &str) -> Result<(), GridError> {
        self.session.remove_player(name)?;
        self.persist();
        Ok(())
    }

    pub fn set_target_score(&mut self, target: Option<i32>) {
        self.session.set_target_score(target);
        self.persist();
    }

    pub fn completion_event(&mut self) -> bool {
        self.session.completion_event()
    }

    fn persist(&self) {
        let saved = self.session.to_saved();
        let key = SavedSession::storage_key(&saved.game);
        match serde_json::to_string(&saved) {
            Ok(doc) => {
                if let Err(e) = self.store.put(&key, &doc) {
                    eprintln!("Error writing session {key}: {e}");
                }
            }
            Err(e) => eprintln!("Error serializing session {key}: {e}"),
        }
    }
}
