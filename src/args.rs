use clap::Parser;
use serde_json::Value;
use std::{fs, path::PathBuf};

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Sqlite file backing the session store. Use ":memory:" for a
    /// throwaway scoreboard.
    #[arg(short = 'n', long, value_name = "DATABASE_NAME", default_value = "tally.db")]
    pub db_name: String,

    #[arg(short = 'p', long, value_name = "PORT", default_value_t = 8081)]
    pub port: u16,

    /// Roster prefill: path to a JSON object mapping a game key to player
    /// names, e.g. {"pocha": ["Ana", "Luis"]}. Names already in a roster
    /// are left alone.
    #[arg(long, value_name = "ROSTER_JSON", value_parser = check_readable_file_and_json)]
    pub roster_json: Option<Value>,
}

#[must_use]
pub fn args_checks() -> Args {
    Args::parse()
}

/// # Errors
///
/// Will return `Err` if the file is not readable or is not a JSON object.
pub fn check_readable_file_and_json(file: &str) -> Result<Value, String> {
    let path = PathBuf::from(file);
    if !path.is_file() || fs::metadata(&path).is_err() {
        return Err(format!("The roster file '{file}' is not readable."));
    }
    let contents = fs::read_to_string(&path).map_err(|e| e.to_string())?;
    let json: Value = serde_json::from_str(&contents).map_err(|e| e.to_string())?;
    if !json.is_object() {
        return Err("The roster file must be a JSON object of game -> player names.".to_string());
    }
    Ok(json)
}
