/// Spanish cardinal words as they come back from dictation. Accented and
/// plain spellings are both accepted because transcription is inconsistent
/// about them. Compounds like "treinta y cinco" need no entry of their own:
/// the scanner adds number tokens together, so 30 + 5 falls out naturally.
#[must_use]
pub fn number_word(word: &str) -> Option<i32> {
    let value = match word {
        "cero" => 0,
        "uno" | "una" => 1,
        "dos" => 2,
        "tres" => 3,
        "cuatro" => 4,
        "cinco" => 5,
        "seis" => 6,
        "siete" => 7,
        "ocho" => 8,
        "nueve" => 9,
        "diez" => 10,
        "once" => 11,
        "doce" => 12,
        "trece" => 13,
        "catorce" => 14,
        "quince" => 15,
        "dieciseis" | "dieciséis" => 16,
        "diecisiete" => 17,
        "dieciocho" => 18,
        "diecinueve" => 19,
        "veinte" => 20,
        "veintiuno" | "veintiuna" => 21,
        "veintidos" | "veintidós" => 22,
        "veintitres" | "veintitrés" => 23,
        "veinticuatro" => 24,
        "veinticinco" => 25,
        "veintiseis" | "veintiséis" => 26,
        "veintisiete" => 27,
        "veintiocho" => 28,
        "veintinueve" => 29,
        "treinta" => 30,
        "cuarenta" => 40,
        "cincuenta" => 50,
        "sesenta" => 60,
        "setenta" => 70,
        "ochenta" => 80,
        "noventa" => 90,
        "cien" | "ciento" => 100,
        _ => return None,
    };
    Some(value)
}
