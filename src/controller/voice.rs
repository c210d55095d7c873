use serde::Serialize;

use crate::controller::grid::GridController;
use crate::model::{GridError, RankingRow};
use crate::parser::{self, Command, Intent};

/// Voice feedback seam. The server hands a [`ReplyCollector`] in and returns
/// the lines for the browser to synthesize; a desktop front end could speak
/// them directly instead.
pub trait Speaker {
    fn say(&mut self, text: &str);
    /// Cut any ongoing speech short ("vale, calla").
    fn hush(&mut self);
}

#[derive(Debug, Default)]
pub struct ReplyCollector {
    pub lines: Vec<String>,
    pub hushed: bool,
}

impl Speaker for ReplyCollector {
    fn say(&mut self, text: &str) {
        self.lines.push(text.to_string());
    }

    fn hush(&mut self) {
        self.hushed = true;
    }
}

#[derive(Serialize, Clone, Debug)]
pub struct AppliedEntry {
    pub player: String,
    pub points: i32,
    pub category: Option<String>,
    pub invalid: bool,
}

/// What one utterance did. Flags are signals for the UI collaborator:
/// `needs_confirmation` means a clear was requested but not executed,
/// `unrecognized` means the utterance named no player and no command and
/// should be routed to the free-form assistant instead.
#[derive(Serialize, Clone, Debug, Default)]
pub struct DispatchReport {
    pub applied: Vec<AppliedEntry>,
    pub needs_confirmation: bool,
    pub open_help: bool,
    pub stop_listening: bool,
    pub unrecognized: bool,
}

/// Parse one transcript against the session roster and run the resulting
/// intents against the grid, collecting the spoken feedback as it goes.
pub fn dispatch(
    ctrl: &mut GridController,
    transcript: &str,
    speaker: &mut dyn Speaker,
) -> DispatchReport {
    let roster: Vec<String> =
        ctrl.session().players().iter().map(|p| p.name.clone()).collect();
    let intents = parser::parse(transcript, &roster);

    let mut report = DispatchReport::default();
    if intents.is_empty() {
        report.unrecognized = !transcript.trim().is_empty();
        return report;
    }

    for intent in intents {
        match intent {
            Intent::Score(entry) => {
                match ctrl.apply_score(&entry.player, entry.points, entry.category.as_deref()) {
                    Ok(cell) => {
                        let invalid =
                            ctrl.session().cell(cell).is_some_and(|c| c.invalid);
                        if invalid {
                            speaker.say(&format!(
                                "{} puntos no encajan en esa categoría para {}.",
                                entry.points, entry.player
                            ));
                        }
                        report.applied.push(AppliedEntry {
                            player: entry.player,
                            points: entry.points,
                            category: entry.category,
                            invalid,
                        });
                        if ctrl.completion_event() {
                            speaker.say(&final_ranking_text(&ctrl.session().compute_ranking()));
                        }
                    }
                    Err(GridError::PlayerNotFound(name)) => {
                        speaker.say(&format!("No encuentro a {name} en la partida."));
                    }
                    Err(GridError::GameComplete) => {
                        speaker.say("Todas las rondas están completas.");
                    }
                    Err(GridError::SectionLocked) => {
                        speaker.say("Termina la sección libre antes de puntuar la obligada.");
                    }
                    Err(e) => {
                        speaker.say("No he podido apuntar esa puntuación.");
                        eprintln!("Error applying voice score: {e}");
                    }
                }
            }
            Intent::Command(Command::Undo) => match ctrl.undo() {
                Ok(_) => speaker.say("Última puntuación deshecha."),
                Err(_) => speaker.say("No hay nada que deshacer."),
            },
            Intent::Command(Command::ClearAll) => {
                // the grid is only wiped after the UI confirms
                report.needs_confirmation = true;
                speaker.say("¿Borrar todas las puntuaciones? Confirma en pantalla.");
            }
            Intent::Command(Command::Hush) => speaker.hush(),
            Intent::Command(Command::ReadRanking) => {
                speaker.say(&live_ranking_text(&ctrl.session().compute_ranking()));
            }
            Intent::Command(Command::OpenHelp) => report.open_help = true,
            Intent::Command(Command::Stop) => {
                report.stop_listening = true;
                speaker.say("Micrófono apagado.");
            }
        }
    }
    report
}

/// "¿Cómo vamos?" answer, top three only.
#[must_use]
pub fn live_ranking_text(rows: &[RankingRow]) -> String {
    if rows.is_empty() {
        return "Aún no hay suficientes datos para mostrar un ranking.".to_string();
    }
    let mut text = String::from("Así vamos. ");
    for (i, row) in rows.iter().take(3).enumerate() {
        let prefix = match i {
            0 => "En primer lugar",
            1 => "en segundo lugar",
            _ => "y en tercer lugar",
        };
        text.push_str(&format!("{prefix}, {} con {} puntos. ", row.player, row.total));
    }
    text
}

/// Announced exactly once when the last required cell is filled.
#[must_use]
pub fn final_ranking_text(rows: &[RankingRow]) -> String {
    let mut text = String::from("Partida finalizada. El ranking es: ");
    for (i, row) in rows.iter().enumerate() {
        let prefix = match i {
            0 => "En primer lugar".to_string(),
            1 => "En segundo lugar".to_string(),
            2 => "En tercer lugar".to_string(),
            _ => format!("En posición {}", i + 1),
        };
        text.push_str(&format!("{prefix}, {} con {} puntos. ", row.player, row.total));
    }
    text
}
