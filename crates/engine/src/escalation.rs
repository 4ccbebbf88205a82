//! The escalation heuristic.
//!
//! Decides, after a final answer exists, whether the UI should surface the
//! "contact the host" affordance. This is an ordered rule cascade over
//! free text, not a classifier: first matching rule wins, and the rule
//! tables are public so a deployment can review the exact policy.
//!
//! Precedence:
//! 1. short greeting / small talk → never escalate
//! 2. the answer itself recommends contacting the host (unless the mention
//!    sits inside a conditional fallback clause) → escalate
//! 3. the guest raises a topic the assistant must not resolve (payments,
//!    cancellations, booking changes, complaints) → escalate
//! 4. the answer admits uncertainty → escalate
//! 5. otherwise → no escalation

/// Greeting / thanks / farewell tokens. A message shorter than
/// [`SMALL_TALK_MAX_CHARS`] containing one of these is small talk.
pub const GREETING_TOKENS: &[&str] = &[
    "hallo", "hello", "hi", "hey", "guten tag", "guten morgen", "guten abend", "bonjour", "salut",
    "bonsoir", "danke", "thank", "merci", "tschüss", "bye", "auf wiedersehen", "au revoir",
    "wie geht", "how are", "comment allez",
];

/// Length bound for the small-talk check.
pub const SMALL_TALK_MAX_CHARS: usize = 30;

/// Words that mark a mention of the host in the assistant's answer.
pub const HOST_TOKENS: &[&str] = &["host", "gastgeber", "hôte"];

/// Phrases with which the answer recommends the host as the primary path.
pub const HANDOFF_PHRASES: &[&str] = &[
    // German
    "kontaktiere deinen gastgeber",
    "kontaktierst du deinen gastgeber",
    "wende dich an deinen gastgeber",
    "dein gastgeber kann dir helfen",
    "dein gastgeber wird dir helfen",
    "am besten deinen gastgeber",
    "gastgeber direkt",
    "für diese anfrage",
    // English
    "contact your host",
    "contact the host",
    "your host can help",
    "your host will help",
    "best to contact your host",
    "for this request",
    // French
    "contactez votre hôte",
    "contacter votre hôte",
    "votre hôte peut vous aider",
];

/// Conditional markers. A host mention shortly after one of these is a
/// contingency ("if that still doesn't work, contact the host"), not a
/// recommendation.
pub const FALLBACK_MARKERS: &[&str] = &[
    "falls es", "wenn es", "falls das", "wenn das", "ansonsten", "sonst", "immer noch",
    "sollte das", "if it", "if that", "otherwise", "still", "should that", "si cela", "sinon",
];

/// How close (in chars) a fallback marker must precede the host mention.
pub const FALLBACK_WINDOW_CHARS: usize = 100;

/// Topics the assistant is policy-forbidden from resolving.
pub const FORBIDDEN_TOPIC_KEYWORDS: &[&str] = &[
    // payments
    "refund", "rückerstattung", "remboursement", "payment", "zahlung", "bezahl", "paiement",
    "invoice", "rechnung", "facture",
    // cancellations and booking changes
    "cancel", "stornier", "storno", "annuler", "annulation", "umbuchen", "umbuchung",
    "booking change", "buchung ändern", "modifier la réservation",
    // complaints
    "complaint", "beschwerde", "réclamation",
];

/// Phrases with which the answer admits it cannot help.
pub const UNCERTAINTY_PHRASES: &[&str] = &[
    "i don't know",
    "i do not know",
    "i cannot",
    "i can't",
    "i'm not sure",
    "ich weiss nicht",
    "ich weiß nicht",
    "ich kann nicht",
    "ich bin mir nicht sicher",
    "je ne sais pas",
    "je ne peux pas",
];

fn is_small_talk(message: &str) -> bool {
    let lower = message.to_lowercase();
    let trimmed = lower.trim();
    if trimmed.chars().count() >= SMALL_TALK_MAX_CHARS {
        return false;
    }
    GREETING_TOKENS.iter().any(|t| trimmed.contains(t))
}

/// True when the host mention sits inside a conditional fallback clause.
fn host_mention_is_fallback(answer_lower: &str) -> bool {
    let Some(host_index) = HOST_TOKENS
        .iter()
        .filter_map(|t| answer_lower.find(t))
        .min()
    else {
        return false;
    };

    FALLBACK_MARKERS.iter().any(|marker| {
        answer_lower
            .find(marker)
            .is_some_and(|i| i < host_index && host_index - i < FALLBACK_WINDOW_CHARS)
    })
}

/// The escalation decision for one completed turn.
///
/// Deterministic: identical inputs always yield the same boolean. The
/// confidence signal is part of the contract but currently unused by the
/// cascade; policy revisions may weigh it.
pub fn should_escalate(_confidence: f32, user_message: &str, assistant_answer: &str) -> bool {
    // Rule 1: never escalate small talk.
    if is_small_talk(user_message) {
        return false;
    }

    let answer_lower = assistant_answer.to_lowercase();

    // Rule 2: the answer recommends the host as the primary path.
    if !host_mention_is_fallback(&answer_lower)
        && HANDOFF_PHRASES.iter().any(|p| answer_lower.contains(p))
    {
        return true;
    }

    // Rule 3: forbidden topic in the guest's message.
    let message_lower = user_message.to_lowercase();
    if FORBIDDEN_TOPIC_KEYWORDS
        .iter()
        .any(|k| message_lower.contains(k))
    {
        return true;
    }

    // Rule 4: the answer admits uncertainty.
    if UNCERTAINTY_PHRASES.iter().any(|p| answer_lower.contains(p)) {
        return true;
    }

    // Rule 5: the assistant handled it.
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn greeting_never_escalates() {
        assert!(!should_escalate(0.0, "hello", "anything at all"));
        assert!(!should_escalate(0.0, "Hallo!", "bitte kontaktiere deinen gastgeber"));
        assert!(!should_escalate(0.9, "merci beaucoup", "je ne sais pas"));
    }

    #[test]
    fn long_message_with_greeting_word_is_not_small_talk() {
        // over the length bound, so rule 1 does not apply
        let msg = "hello, I would like to request a refund for my entire booking";
        assert!(should_escalate(0.8, msg, "happy to help"));
    }

    #[test]
    fn primary_handoff_recommendation_escalates() {
        assert!(should_escalate(
            0.8,
            "can you change my bed linen daily?",
            "For this request, it's best to contact your host directly."
        ));
        assert!(should_escalate(
            0.8,
            "kann ich später auschecken?",
            "Am besten kontaktierst du deinen Gastgeber direkt."
        ));
    }

    #[test]
    fn fallback_mention_does_not_escalate() {
        assert!(!should_escalate(
            0.8,
            "the heating makes a noise",
            "Try turning the valve to position 3. If that still doesn't work, \
             contact your host."
        ));
        assert!(!should_escalate(
            0.8,
            "die heizung klappert",
            "Stelle das Ventil auf Stufe 3. Falls es dann immer noch klappert, \
             wende dich an deinen Gastgeber."
        ));
    }

    #[test]
    fn forbidden_topic_escalates_regardless_of_answer() {
        assert!(should_escalate(
            0.95,
            "I want a refund for last night",
            "Our check-out time is 10:00."
        ));
        assert!(should_escalate(0.5, "ich möchte stornieren", "Gerne!"));
        assert!(should_escalate(0.5, "j'ai une réclamation", "D'accord."));
    }

    #[test]
    fn uncertainty_phrase_escalates() {
        assert!(should_escalate(
            0.2,
            "where can I rent a boat?",
            "I don't know of any boat rental nearby."
        ));
        assert!(should_escalate(
            0.2,
            "wo kann ich ein Boot mieten?",
            "Das weiss ich leider nicht, ich kann nicht weiterhelfen."
        ));
    }

    #[test]
    fn handled_answer_does_not_escalate() {
        assert!(!should_escalate(
            0.85,
            "what's the wifi password?",
            "The WiFi network is Lakeside and the password is on your welcome sheet."
        ));
    }

    #[test]
    fn deterministic_for_identical_inputs() {
        let inputs = (0.42, "can I get a refund?", "Let me check that for you.");
        let first = should_escalate(inputs.0, inputs.1, inputs.2);
        for _ in 0..10 {
            assert_eq!(should_escalate(inputs.0, inputs.1, inputs.2), first);
        }
    }
}
