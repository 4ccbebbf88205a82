//! Context classifiers: apartment and language detection.
//!
//! Both are stateless rule-table heuristics over raw message text. They are
//! deliberately coarse; the system degrades gracefully on a miss (the model
//! asks a clarifying question, or the baseline language is used) rather
//! than erroring.

use innkeep_core::session::Apartment;
use innkeep_core::Language;

/// Words that may qualify a bare unit number ("apartment 3", "room 3").
pub const UNIT_QUALIFIERS: &[&str] = &["apartment", "wohnung", "zimmer", "room", "unit"];

/// Optional filler between qualifier and number ("apartment number 3").
pub const NUMBER_FILLERS: &[&str] = &["nummer", "number", "nr", "nr."];

/// German stop words for the language detector.
pub const GERMAN_STOP_WORDS: &[&str] = &[
    "ich", "und", "der", "die", "das", "ist", "ein", "eine", "für", "mit", "wie", "kann", "bitte",
    "meine", "mein", "hallo", "guten", "danke", "wo", "wann", "was", "wer", "warum", "möchte",
    "brauche", "habe", "gibt", "es", "mir", "sie", "ihr", "uns", "nicht", "auch", "noch", "schon",
    "hier", "dort", "heute", "morgen", "abend", "nacht",
];

/// French stop words for the language detector.
pub const FRENCH_STOP_WORDS: &[&str] = &[
    "je", "et", "le", "la", "les", "est", "un", "une", "pour", "avec", "comment", "pouvez",
    "merci", "bonjour", "bonsoir", "où", "quand", "qui", "quoi", "pourquoi", "mon", "ma", "mes",
    "votre", "nous",
];

/// Detect which apartment a message refers to.
///
/// Checked in order: an explicit "unit N" mention (higher units first, so a
/// fixed order resolves multi-mention text deterministically), then a
/// qualified number ("apartment 3", "room number 3"), then a bare digit 1–5
/// as the entire message (a short reply to "which apartment are you in?").
pub fn detect_apartment(text: &str) -> Option<Apartment> {
    let lower = text.to_lowercase();

    for n in (1..=5u8).rev() {
        if lower.contains(&format!("unit {n}")) || lower.contains(&format!("unit{n}")) {
            return Apartment::from_number(n);
        }
    }

    let tokens: Vec<String> = lower
        .split_whitespace()
        .map(|w| {
            w.chars()
                .filter(|c| c.is_alphanumeric() || *c == '.')
                .collect::<String>()
        })
        .filter(|w| !w.is_empty())
        .collect();

    for (i, token) in tokens.iter().enumerate() {
        if !UNIT_QUALIFIERS.contains(&token.as_str()) {
            continue;
        }
        let mut next = i + 1;
        if next < tokens.len() && NUMBER_FILLERS.contains(&tokens[next].as_str()) {
            next += 1;
        }
        if let Some(candidate) = tokens.get(next) {
            if let Ok(n) = candidate.parse::<u8>() {
                if let Some(apt) = Apartment::from_number(n) {
                    return Some(apt);
                }
            }
        }
    }

    // A bare digit only counts when it is the whole message.
    let trimmed = lower.trim();
    if trimmed.len() == 1 {
        if let Ok(n) = trimmed.parse::<u8>() {
            return Apartment::from_number(n);
        }
    }

    None
}

/// Detect the message language by counting stop-word hits.
///
/// The list with the most hits wins, minimum one hit; ties and zero hits
/// fall back to English.
pub fn detect_language(text: &str) -> Language {
    let lower = text.to_lowercase();
    let words: Vec<&str> = lower.split_whitespace().collect();

    let german_hits = words
        .iter()
        .filter(|w| GERMAN_STOP_WORDS.contains(*w))
        .count();
    let french_hits = words
        .iter()
        .filter(|w| FRENCH_STOP_WORDS.contains(*w))
        .count();

    if german_hits > french_hits && german_hits >= 1 {
        Language::German
    } else if french_hits > german_hits && french_hits >= 1 {
        Language::French
    } else {
        Language::English
    }
}
