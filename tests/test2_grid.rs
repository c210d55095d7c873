mod common;

use rusty_tally::games;
use rusty_tally::model::{CellRef, GridError, SessionPhase};

#[test]
fn scores_fill_rounds_left_to_right() -> Result<(), Box<dyn std::error::Error>> {
    let mut ctrl = common::controller_with_players("continental", &["Ana", "Luis"]);

    let first = ctrl.apply_score("Ana", 10, None)?;
    let second = ctrl.apply_score("Ana", 5, None)?;
    assert_eq!(first, CellRef { player: 0, round: 0 });
    assert_eq!(second, CellRef { player: 0, round: 1 });
    assert_eq!(ctrl.session().totals(), vec![15, 0]);
    Ok(())
}

#[test]
fn player_lookup_is_case_insensitive() -> Result<(), Box<dyn std::error::Error>> {
    let mut ctrl = common::controller_with_players("continental", &["Ana"]);
    ctrl.apply_score("ANA", 12, None)?;
    assert_eq!(ctrl.session().totals(), vec![12]);
    Ok(())
}

#[test]
fn unknown_player_is_an_error() {
    let mut ctrl = common::controller_with_players("continental", &["Ana"]);
    assert!(matches!(
        ctrl.apply_score("Pepe", 10, None),
        Err(GridError::PlayerNotFound(_))
    ));
}

#[test]
fn duplicate_player_is_rejected() {
    let mut ctrl = common::controller_with_players("pocha", &["Ana"]);
    assert!(matches!(
        ctrl.add_player("ana"),
        Err(GridError::DuplicatePlayer(_))
    ));
}

#[test]
fn undo_is_a_strict_inverse() -> Result<(), Box<dyn std::error::Error>> {
    let mut ctrl = common::controller_with_players("continental", &["Ana", "Luis"]);
    ctrl.apply_score("Ana", 10, None)?;

    let before = ctrl.session().to_saved();
    ctrl.apply_score("Luis", 7, None)?;
    ctrl.undo()?;
    let after = ctrl.session().to_saved();

    assert_eq!(before.scores, after.scores);
    assert_eq!(before.players, after.players);
    Ok(())
}

#[test]
fn undo_restores_an_overwritten_value() -> Result<(), Box<dyn std::error::Error>> {
    let mut ctrl = common::controller_with_players("continental", &["Ana"]);
    let cell = ctrl.apply_score("Ana", 10, None)?;
    ctrl.edit_cell(cell, Some(99))?;
    ctrl.undo()?;
    assert_eq!(ctrl.session().cell(cell).and_then(|c| c.value), Some(10));
    Ok(())
}

#[test]
fn undo_with_no_history_is_an_error() {
    let mut ctrl = common::controller_with_players("continental", &["Ana"]);
    assert!(matches!(ctrl.undo(), Err(GridError::EmptyHistory)));
}

#[test]
fn fixed_length_game_fills_up() -> Result<(), Box<dyn std::error::Error>> {
    let mut ctrl = common::controller_with_players("continental", &["Ana"]);
    assert_eq!(ctrl.session().rounds().len(), 6);
    for i in 0..6 {
        ctrl.apply_score("Ana", i, None)?;
    }
    assert!(matches!(
        ctrl.apply_score("Ana", 1, None),
        Err(GridError::GameComplete)
    ));
    assert_eq!(ctrl.session().phase(), SessionPhase::Complete);
    Ok(())
}

#[test]
fn open_ended_game_grows_new_rounds() -> Result<(), Box<dyn std::error::Error>> {
    let mut ctrl = common::controller_with_players("avaricioso", &["Ana"]);
    assert_eq!(ctrl.session().rounds().len(), 10);
    for _ in 0..10 {
        ctrl.apply_score("Ana", 50, None)?;
    }
    ctrl.apply_score("Ana", 50, None)?;
    assert_eq!(ctrl.session().rounds().len(), 11);
    assert_eq!(ctrl.session().rounds()[10].label, "11");
    // an open-ended grid never declares itself finished
    assert_eq!(ctrl.session().phase(), SessionPhase::InProgress);
    Ok(())
}

#[test]
fn ranking_shares_ranks_on_ties() -> Result<(), Box<dyn std::error::Error>> {
    // continental: lower total wins
    let mut ctrl = common::controller_with_players("continental", &["Ana", "Luis", "Pepe"]);
    ctrl.apply_score("Ana", 10, None)?;
    ctrl.apply_score("Luis", 10, None)?;
    ctrl.apply_score("Pepe", 20, None)?;

    let ranking = ctrl.session().compute_ranking();
    assert_eq!(ranking[0].rank, 1);
    assert_eq!(ranking[1].rank, 1);
    assert_eq!(ranking[2].rank, 3);
    assert_eq!(ranking[2].player, "Pepe");

    // ties keep roster order
    assert_eq!(ranking[0].player, "Ana");
    assert_eq!(ranking[1].player, "Luis");
    Ok(())
}

#[test]
fn ranking_direction_flips_for_higher_wins() -> Result<(), Box<dyn std::error::Error>> {
    let mut ctrl = common::controller_with_players("avaricioso", &["Ana", "Luis"]);
    ctrl.apply_score("Ana", 100, None)?;
    ctrl.apply_score("Luis", 300, None)?;

    let ranking = ctrl.session().compute_ranking();
    assert_eq!(ranking[0].player, "Luis");
    assert_eq!(ranking[0].rank, 1);
    assert_eq!(ranking[1].player, "Ana");
    assert_eq!(ranking[1].rank, 2);

    // reading the ranking twice changes nothing
    assert_eq!(ranking, ctrl.session().compute_ranking());
    Ok(())
}

#[test]
fn completion_announced_once_and_rearmed_by_edits() -> Result<(), Box<dyn std::error::Error>> {
    let mut ctrl = common::controller_with_players("continental", &["Ana"]);
    for i in 0..6 {
        ctrl.apply_score("Ana", i, None)?;
    }
    assert!(ctrl.completion_event());
    assert!(!ctrl.completion_event());

    // emptying a cell reopens the game and re-arms the announcement
    ctrl.edit_cell(CellRef { player: 0, round: 3 }, None)?;
    assert_eq!(ctrl.session().phase(), SessionPhase::InProgress);
    assert!(!ctrl.completion_event());
    ctrl.apply_score("Ana", 4, None)?;
    assert!(ctrl.completion_event());
    Ok(())
}

#[test]
fn clear_all_resets_everything() -> Result<(), Box<dyn std::error::Error>> {
    let mut ctrl = common::controller_with_players("domino", &["Ana", "Luis"]);
    for _ in 0..11 {
        ctrl.apply_score("Ana", 5, None)?;
    }
    assert_eq!(ctrl.session().rounds().len(), 11);

    ctrl.clear_all();
    assert_eq!(ctrl.session().rounds().len(), 10);
    assert_eq!(ctrl.session().totals(), vec![0, 0]);
    assert_eq!(ctrl.session().phase(), SessionPhase::Unstarted);
    assert!(matches!(ctrl.undo(), Err(GridError::EmptyHistory)));
    Ok(())
}

#[test]
fn roster_change_keeps_cells_but_drops_history() -> Result<(), Box<dyn std::error::Error>> {
    let mut ctrl = common::controller_with_players("continental", &["Ana"]);
    ctrl.apply_score("Ana", 10, None)?;

    ctrl.add_player("Luis")?;
    assert_eq!(
        ctrl.session().cell(CellRef { player: 0, round: 0 }).and_then(|c| c.value),
        Some(10)
    );
    assert!(matches!(ctrl.undo(), Err(GridError::EmptyHistory)));
    Ok(())
}

#[test]
fn removing_a_player_drops_their_row() -> Result<(), Box<dyn std::error::Error>> {
    let mut ctrl = common::controller_with_players("continental", &["Ana", "Luis"]);
    ctrl.apply_score("Ana", 10, None)?;
    ctrl.apply_score("Luis", 20, None)?;

    ctrl.remove_player("Ana")?;
    assert!(ctrl.session().find_player("Ana").is_none());
    assert_eq!(ctrl.session().totals(), vec![20]);
    assert!(matches!(
        ctrl.remove_player("Ana"),
        Err(GridError::PlayerNotFound(_))
    ));
    Ok(())
}

#[test]
fn totals_saturate_on_extreme_values() -> Result<(), Box<dyn std::error::Error>> {
    let mut ctrl = common::controller_with_players("continental", &["Ana"]);
    ctrl.edit_cell(CellRef { player: 0, round: 0 }, Some(i32::MAX))?;
    ctrl.edit_cell(CellRef { player: 0, round: 1 }, Some(i32::MAX))?;
    assert_eq!(ctrl.session().totals(), vec![i32::MAX]);

    ctrl.edit_cell(CellRef { player: 0, round: 0 }, Some(i32::MIN))?;
    ctrl.edit_cell(CellRef { player: 0, round: 1 }, Some(i32::MIN))?;
    assert_eq!(ctrl.session().totals(), vec![i32::MIN]);
    Ok(())
}

#[test]
fn pocha_ladder_shape() {
    let pocha = games::descriptor("pocha").unwrap();

    // 40 cards, 4 players: 1 four times, 2..9 once, 10 four times, back
    // down 9..2, and 1 four times to close
    let plan = pocha.round_plan(4);
    assert_eq!(plan.len(), 28);
    assert!(plan[..4].iter().all(|slot| slot.label == "1"));
    assert_eq!(plan.iter().filter(|slot| slot.label == "10").count(), 4);
    assert!(plan[plan.len() - 4..].iter().all(|slot| slot.label == "1"));

    // 2 players go up to 20 cards
    let plan = pocha.round_plan(2);
    assert_eq!(plan.len(), 42);
    assert_eq!(plan.iter().filter(|slot| slot.label == "20").count(), 2);
}
