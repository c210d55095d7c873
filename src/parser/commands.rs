use serde::Serialize;

/// Global voice commands. Detecting one of these preempts score parsing for
/// the whole utterance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Command {
    /// Turn the microphone off.
    Stop,
    /// Wipe every cell; the UI still has to confirm before it happens.
    ClearAll,
    Undo,
    /// Cut the speech synthesis off mid-sentence.
    Hush,
    ReadRanking,
    OpenHelp,
}

/// Phrase table, checked in order; the first phrase found wins. Substring
/// match, so "vale vale ya" still hushes.
const PHRASES: &[(Command, &[&str])] = &[
    (Command::Stop, &["apaga micro", "apagar micro", "detener micro"]),
    (Command::ClearAll, &["reiniciar", "borrar todo", "nueva partida"]),
    (Command::Undo, &["deshacer", "corrige", "borra la última", "borra la ultima"]),
    (Command::Hush, &["vale", "calla", "silencio"]),
    (Command::ReadRanking, &["cómo vamos", "como vamos", "quién va ganando", "quien va ganando"]),
    (
        Command::OpenHelp,
        &["ver reglas", "cómo se juega", "como se juega", "instrucciones"],
    ),
];

/// Scan a lowercased transcript for a command phrase.
#[must_use]
pub fn find_command(text: &str) -> Option<Command> {
    for (command, phrases) in PHRASES {
        if phrases.iter().any(|p| text.contains(p)) {
            return Some(*command);
        }
    }
    None
}
