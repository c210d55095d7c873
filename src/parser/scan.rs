use regex::Regex;
use std::sync::OnceLock;

use crate::games::DICE_CATEGORIES;
use crate::parser::commands::{self, Command};
use crate::parser::numbers::number_word;

/// One score dictated for one player. `category` is only set for the dice
/// games and carries the category code ("K", "AS", ...).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScoreEntry {
    pub player: String,
    pub points: i32,
    pub category: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Intent {
    Command(Command),
    Score(ScoreEntry),
}

/// Turn one utterance into intents, in left-to-right order of mention.
///
/// A detected command phrase preempts everything else in the utterance. For
/// scores, the scanner keeps a current-player slot: a roster name starts a
/// new entry (flushing the previous one), number tokens accumulate into it,
/// "menos" negates the next number, and category words tag the entry (last
/// one wins). Unrecognized tokens are dropped; nothing here ever fails. An
/// utterance that names no player yields no intents, which callers treat as
/// a free-form question for the assistant.
#[must_use]
pub fn parse(transcript: &str, known_players: &[String]) -> Vec<Intent> {
    let text = normalize(transcript);
    if text.is_empty() {
        return Vec::new();
    }
    if let Some(command) = commands::find_command(&text) {
        return vec![Intent::Command(command)];
    }

    let tokens: Vec<&str> = text.split_whitespace().collect();
    let name_tokens: Vec<Vec<String>> = known_players
        .iter()
        .map(|n| n.to_lowercase().split_whitespace().map(str::to_string).collect())
        .collect();

    let mut intents: Vec<Intent> = Vec::new();
    let mut pending: Option<PendingEntry> = None;

    let mut i = 0;
    while i < tokens.len() {
        if let Some((player_idx, consumed)) = match_player(&name_tokens, &tokens, i) {
            if let Some(done) = pending.take() {
                intents.push(done.into_intent());
            }
            pending = Some(PendingEntry::new(known_players[player_idx].clone()));
            i += consumed;
            continue;
        }

        // Tokens before the first player name are noise.
        if let Some(entry) = pending.as_mut() {
            let token = tokens[i];
            if let Some(code) = category_word(token) {
                entry.category = Some(code.to_string());
            } else if token == "menos" {
                entry.negative = true;
            } else if let Some(value) = token.parse::<i32>().ok().or_else(|| number_word(token)) {
                // saturate: dictation can carry absurd digit strings
                let value = if entry.negative { value.saturating_neg() } else { value };
                entry.points = entry.points.saturating_add(value);
                entry.negative = false;
            }
        }
        i += 1;
    }

    if let Some(done) = pending.take() {
        intents.push(done.into_intent());
    }
    intents
}

struct PendingEntry {
    player: String,
    points: i32,
    negative: bool,
    category: Option<String>,
}

impl PendingEntry {
    fn new(player: String) -> Self {
        Self { player, points: 0, negative: false, category: None }
    }

    fn into_intent(self) -> Intent {
        Intent::Score(ScoreEntry {
            player: self.player,
            points: self.points,
            category: self.category,
        })
    }
}

/// Longest roster name whose tokens match the transcript at `at`. Longest
/// match first so "ana maría" is not claimed by a player called "ana".
fn match_player(name_tokens: &[Vec<String>], tokens: &[&str], at: usize) -> Option<(usize, usize)> {
    let mut best: Option<(usize, usize)> = None;
    for (idx, name) in name_tokens.iter().enumerate() {
        let len = name.len();
        if len == 0 || at + len > tokens.len() {
            continue;
        }
        let matches = name
            .iter()
            .zip(&tokens[at..at + len])
            .all(|(word, token)| word.as_str() == *token);
        if matches && best.is_none_or(|(_, best_len)| len > best_len) {
            best = Some((idx, len));
        }
    }
    best
}

/// Dice category words are shared across games, same as the number table.
/// "en reyes" needs no lookahead: "en" is noise and "reyes" matches here.
fn category_word(token: &str) -> Option<&'static str> {
    DICE_CATEGORIES.iter().find(|c| c.word == token).map(|c| c.code)
}

fn normalize(transcript: &str) -> String {
    static PUNCTUATION: OnceLock<Regex> = OnceLock::new();
    let re = PUNCTUATION.get_or_init(|| {
        Regex::new(r"[,;:.¡!¿?]+").expect("Invalid regex pattern - this is a programming error")
    });
    re.replace_all(&transcript.to_lowercase(), " ").trim().to_string()
}
