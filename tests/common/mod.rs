#![allow(dead_code)]

use std::sync::Arc;

use rusty_tally::controller::grid::GridController;
use rusty_tally::games;
use rusty_tally::storage::{KvStore, MemoryKv};

pub fn memory_store() -> Arc<dyn KvStore> {
    Arc::new(MemoryKv::new())
}

pub fn controller(game: &str) -> GridController {
    GridController::new(games::descriptor(game).expect("known game"), memory_store())
}

pub fn controller_with_players(game: &str, players: &[&str]) -> GridController {
    let mut ctrl = controller(game);
    for player in players {
        ctrl.add_player(player).expect("fresh roster");
    }
    ctrl
}

pub fn roster(names: &[&str]) -> Vec<String> {
    names.iter().map(ToString::to_string).collect()
}
