use rusty_tally::parser::{Command, Intent, ScoreEntry, parse};

fn roster(names: &[&str]) -> Vec<String> {
    names.iter().map(ToString::to_string).collect()
}

fn score(player: &str, points: i32, category: Option<&str>) -> Intent {
    Intent::Score(ScoreEntry {
        player: player.to_string(),
        points,
        category: category.map(ToString::to_string),
    })
}

#[test]
fn single_player_and_number() {
    let intents = parse("Ana veinte", &roster(&["Ana", "Luis"]));
    assert_eq!(intents, vec![score("Ana", 20, None)]);
}

#[test]
fn digits_work_like_number_words() {
    let intents = parse("ana 42", &roster(&["Ana"]));
    assert_eq!(intents, vec![score("Ana", 42, None)]);
}

#[test]
fn two_players_one_utterance_in_order() {
    let intents = parse("ana veinte luis menos diez", &roster(&["Ana", "Luis"]));
    assert_eq!(
        intents,
        vec![score("Ana", 20, None), score("Luis", -10, None)]
    );
}

#[test]
fn number_words_accumulate() {
    // "treinta y cinco" = 30 + 5, the "y" is dropped as noise
    let intents = parse("ana treinta y cinco", &roster(&["Ana"]));
    assert_eq!(intents, vec![score("Ana", 35, None)]);

    let intents = parse("luis ciento veinte", &roster(&["Luis"]));
    assert_eq!(intents, vec![score("Luis", 120, None)]);
}

#[test]
fn menos_negates_the_next_number_only() {
    let intents = parse("ana menos diez cinco", &roster(&["Ana"]));
    assert_eq!(intents, vec![score("Ana", -5, None)]);
}

#[test]
fn accented_number_words() {
    let intents = parse("ana dieciséis", &roster(&["Ana"]));
    assert_eq!(intents, vec![score("Ana", 16, None)]);
}

#[test]
fn punctuation_is_stripped() {
    let intents = parse("¡Ana, veinte! Luis: diez.", &roster(&["Ana", "Luis"]));
    assert_eq!(
        intents,
        vec![score("Ana", 20, None), score("Luis", 10, None)]
    );
}

#[test]
fn unrecognized_tokens_are_dropped() {
    let intents = parse("ana eh pues veinte puntos", &roster(&["Ana"]));
    assert_eq!(intents, vec![score("Ana", 20, None)]);
}

#[test]
fn tokens_before_first_player_are_noise() {
    let intents = parse("cincuenta para ana veinte", &roster(&["Ana"]));
    assert_eq!(intents, vec![score("Ana", 20, None)]);
}

#[test]
fn no_player_named_yields_nothing() {
    assert!(parse("veinte puntos para todos", &roster(&["Ana"])).is_empty());
    assert!(parse("", &roster(&["Ana"])).is_empty());
    assert!(parse("   ", &roster(&["Ana"])).is_empty());
}

#[test]
fn longest_roster_name_wins() {
    let intents = parse(
        "ana maría veinte ana diez",
        &roster(&["Ana", "Ana María"]),
    );
    assert_eq!(
        intents,
        vec![score("Ana María", 20, None), score("Ana", 10, None)]
    );
}

#[test]
fn category_word_tags_the_entry() {
    let intents = parse("luis quince en reyes", &roster(&["Luis"]));
    assert_eq!(intents, vec![score("Luis", 15, Some("K"))]);

    // category before the number works the same
    let intents = parse("luis en reyes quince", &roster(&["Luis"]));
    assert_eq!(intents, vec![score("Luis", 15, Some("K"))]);
}

#[test]
fn last_category_mentioned_wins() {
    let intents = parse("luis negros quince ases", &roster(&["Luis"]));
    assert_eq!(intents, vec![score("Luis", 15, Some("AS"))]);
}

#[test]
fn extreme_values_saturate_instead_of_overflowing() {
    // dictation is arbitrary text, so the accumulator has to survive it
    let intents = parse("ana 2147483647 2147483647", &roster(&["Ana"]));
    assert_eq!(intents, vec![score("Ana", i32::MAX, None)]);

    let intents = parse(
        "ana menos 2147483647 menos 2147483647",
        &roster(&["Ana"]),
    );
    assert_eq!(intents, vec![score("Ana", i32::MIN, None)]);
}

#[test]
fn command_preempts_scores() {
    let intents = parse("ana veinte y borrar todo", &roster(&["Ana"]));
    assert_eq!(intents, vec![Intent::Command(Command::ClearAll)]);
}

#[test]
fn command_phrases() {
    let r = roster(&["Ana"]);
    assert_eq!(parse("deshacer", &r), vec![Intent::Command(Command::Undo)]);
    assert_eq!(
        parse("borra la última", &r),
        vec![Intent::Command(Command::Undo)]
    );
    assert_eq!(parse("vale vale ya", &r), vec![Intent::Command(Command::Hush)]);
    assert_eq!(
        parse("¿Quién va ganando?", &r),
        vec![Intent::Command(Command::ReadRanking)]
    );
    assert_eq!(
        parse("como vamos", &r),
        vec![Intent::Command(Command::ReadRanking)]
    );
    assert_eq!(
        parse("apaga micro", &r),
        vec![Intent::Command(Command::Stop)]
    );
    assert_eq!(
        parse("instrucciones", &r),
        vec![Intent::Command(Command::OpenHelp)]
    );
    assert_eq!(
        parse("nueva partida", &r),
        vec![Intent::Command(Command::ClearAll)]
    );
}
