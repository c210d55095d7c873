use maud::{Markup, html};

use crate::controller::grid::ScoreSession;
use crate::model::{CellRef, SectionId, SessionPhase};

/// Scoreboard page for one game: live ranking, then the scoring grid. The
/// dice games get their two sections as separate tables, everything else is
/// a single table with the round labels across the top.
#[must_use]
pub fn render_scoreboard(session: &ScoreSession) -> Markup {
    let two_section = session
        .rounds()
        .iter()
        .any(|slot| slot.section.is_some());

    html! {
        (maud::DOCTYPE)
        head {
            meta charset="UTF-8";
            meta name="viewport" content="width=device-width, initial-scale=1.0";
            link rel="stylesheet" type="text/css" href="static/styles.css";
            title { (session.descriptor().name) }
        }
        body {
            h1 { (session.descriptor().name) }
            @if let Some(target) = session.target_score() {
                p class="target" { "Meta de puntos: " (target) }
            }
            @if session.phase() == SessionPhase::Complete {
                p class="game-over" { "Partida finalizada" }
            }
            (render_ranking(session))
            @if session.players().is_empty() {
                p { "Añade jugadores para empezar." }
            } @else if two_section {
                h3 { "Sección libre" }
                (render_section(session, Some(SectionId::Free)))
                h3 { "Sección obligada" }
                (render_section(session, Some(SectionId::Forced)))
            } @else {
                (render_section(session, None))
            }
        }
    }
}

fn render_ranking(session: &ScoreSession) -> Markup {
    let ranking = session.compute_ranking();
    html! {
        div class="ranking" {
            h3 { "Ranking en vivo" }
            ol {
                @for row in &ranking {
                    @let medal = match row.rank {
                        1 => "🥇 ",
                        2 => "🥈 ",
                        3 => "🥉 ",
                        _ => "",
                    };
                    li { (medal) (row.rank) "º " (row.player) " → " (row.total) " puntos" }
                }
            }
        }
    }
}

/// One table. `section` of `None` renders every round (the non-dice games).
fn render_section(session: &ScoreSession, section: Option<SectionId>) -> Markup {
    let columns: Vec<usize> = session
        .rounds()
        .iter()
        .enumerate()
        .filter(|(_, slot)| section.is_none() || slot.section == section)
        .map(|(r, _)| r)
        .collect();
    let totals = session.totals();

    html! {
        table class="styled-table" {
            thead {
                tr {
                    th rowspan="2" { "Jugador" }
                    th colspan=(columns.len()) { "Rondas" }
                    th rowspan="2" { "Total" }
                }
                tr {
                    @for &r in &columns {
                        th { (session.rounds()[r].label) }
                    }
                }
            }
            tbody {
                @for (p, player) in session.players().iter().enumerate() {
                    tr {
                        td class="jugador" { (player.name) }
                        @for &r in &columns {
                            @let cell = session.cell(CellRef { player: p, round: r });
                            @let value = cell.and_then(|c| c.value);
                            @let invalid = cell.is_some_and(|c| c.invalid);
                            @if invalid {
                                td class="invalid" { @if let Some(v) = value { (v) } }
                            } @else {
                                td { @if let Some(v) = value { (v) } }
                            }
                        }
                        td class="total" { (totals[p]) }
                    }
                }
            }
        }
    }
}
