//! Localized canned texts: welcome bubble, host-contact hint, fallback
//! answer, and the fatal-error apology.

use innkeep_core::Language;

/// First assistant bubble shown by the UI for a new conversation.
pub fn welcome_message(language: Language) -> &'static str {
    match language {
        Language::German => {
            "Hallo! Ich bin der Assistent vom Lakeside Guesthouse 👋\n\n\
             Ich helfe dir gerne mit Fragen zu deinem Aufenthalt.\n\n\
             **Häufige Fragen:**\n• WLAN-Passwort\n• Check-in Infos\n• Lokale Tipps\n\n\
             Wie kann ich dir helfen?"
        }
        Language::French => {
            "Bonjour! Je suis l'assistant du Lakeside Guesthouse 👋\n\n\
             Je suis là pour vous aider avec vos questions sur votre séjour.\n\n\
             **Questions fréquentes:**\n• Mot de passe WiFi\n• Infos check-in\n• Conseils locaux\n\n\
             Comment puis-je vous aider?"
        }
        Language::English => {
            "Hello! I'm the Lakeside Guesthouse assistant 👋\n\n\
             I'm happy to help you with questions about your stay.\n\n\
             **Common questions:**\n• WiFi password\n• Check-in info\n• Local tips\n\n\
             How can I help you?"
        }
    }
}

/// Shown by the UI next to the escalation affordance.
pub fn host_contact_message(language: Language) -> &'static str {
    match language {
        Language::German => {
            "Für diese Anfrage ist es am besten, deinen Gastgeber direkt zu kontaktieren.\n\n\
             Er ist täglich von 08:00 bis 22:00 erreichbar! 💬"
        }
        Language::French => {
            "Pour cette demande, il est préférable de contacter votre hôte directement.\n\n\
             Il est disponible tous les jours de 08:00 à 22:00! 💬"
        }
        Language::English => {
            "For this request, it's best to contact your host directly.\n\n\
             They're available daily from 08:00 to 22:00! 💬"
        }
    }
}

/// Used when the tool loop hits its round limit without any model text.
/// Never empty: the guest always gets a sentence back.
pub fn fallback_answer(language: Language) -> &'static str {
    match language {
        Language::German => {
            "Das konnte ich leider nicht vollständig beantworten. \
             Am besten kontaktierst du deinen Gastgeber direkt."
        }
        Language::French => {
            "Je n'ai malheureusement pas pu répondre complètement. \
             Le mieux est de contacter votre hôte directement."
        }
        Language::English => {
            "I wasn't able to fully answer that. \
             It's best to contact your host directly."
        }
    }
}

/// Body of the 503 response when the model itself is unavailable.
pub fn service_apology(language: Language) -> &'static str {
    match language {
        Language::German => {
            "Entschuldigung, der Assistent ist gerade nicht erreichbar. \
             Bitte versuche es in einem Moment noch einmal."
        }
        Language::French => {
            "Désolé, l'assistant n'est pas disponible pour le moment. \
             Veuillez réessayer dans un instant."
        }
        Language::English => {
            "Sorry, the assistant is unavailable right now. \
             Please try again in a moment."
        }
    }
}
