//! The prompt assembler.
//!
//! Builds the single system-instruction block for the model, in fixed
//! section order: role and language directive, apartment-scoped knowledge,
//! retrieved context, then static policy directives.
//!
//! Leakage contract: when an apartment is known, only that unit's facts are
//! interpolated; when none is known, no unit credentials appear at all and
//! the model is told to ask first. See `facts` for the structural side.

use crate::facts;
use innkeep_core::knowledge::RetrievalResult;
use innkeep_core::session::Apartment;
use innkeep_core::Language;

const SECTION_RULE: &str = "═══════════════════════════════════════════════════════════════";

/// Delimiter between retrieved chunks.
pub const CHUNK_DELIMITER: &str = "\n---\n";

/// Assembles system prompts for one property.
#[derive(Debug, Clone)]
pub struct PromptAssembler {
    property_name: String,
    locality: String,
}

impl PromptAssembler {
    pub fn new(property_name: impl Into<String>, locality: impl Into<String>) -> Self {
        Self {
            property_name: property_name.into(),
            locality: locality.into(),
        }
    }

    /// Build the full system prompt for one turn.
    ///
    /// `web_search` reflects whether the tool is actually declared to the
    /// model this turn; the directive section is omitted otherwise.
    pub fn build(
        &self,
        language: Language,
        retrieval: &RetrievalResult,
        apartment: Option<Apartment>,
        web_search: bool,
    ) -> String {
        let date = chrono::Utc::now().format("%A, %e %B %Y");
        let apartment_section = self.apartment_section(apartment);
        let search_section = if web_search {
            self.search_tool_section()
        } else {
            String::new()
        };
        let context_section = self.context_section(retrieval);

        format!(
            "You are the guest assistant for {property} in {locality}.\n\
             ALWAYS answer in the guest's language (currently: {language}).\n\
             For German, use Swiss spelling (no ß, always ss).\n\
             \n\
             **TODAY IS: {date}**\n\
             Keep this date in mind for any opening-hours question. If search results\n\
             mention dates in the past, the attraction is most likely open by now.\n\
             \n\
             {apartment_section}\n\
             {search_section}\
             \n\
             {rule}\n\
             ## FORBIDDEN\n\
             {rule}\n\
             - NO phone or messaging numbers - guests reach the host through the\n\
               booking platform's messenger (the chat shows a button for it)\n\
             - NO invented information\n\
             - Do NOT ask which apartment the guest is in if it is already known above\n\
             \n\
             {rule}\n\
             ## GENERAL INFO (same for all apartments)\n\
             {rule}\n\
             **Check-in:** 16:00 (self check-in) | **Check-out:** 10:00 (self check-out)\n\
             **Key box:** the code arrives automatically via the booking platform before arrival\n\
             **Host:** regularly at the house and reachable through the platform messenger, 08:00-22:00\n\
             \n\
             {context_section}\n\
             \n\
             Be friendly, helpful, and BRIEF. Guests want quick answers!",
            property = self.property_name,
            locality = self.locality,
            language = language,
            date = date,
            apartment_section = apartment_section,
            context_section = context_section,
            rule = SECTION_RULE,
        )
    }

    fn apartment_section(&self, apartment: Option<Apartment>) -> String {
        match apartment {
            None => format!(
                "{rule}\n\
                 ## APARTMENT NOT YET KNOWN\n\
                 {rule}\n\
                 \n\
                 The guest has not said which apartment they are in.\n\
                 \n\
                 **For questions about WiFi, laundry, hot water, heating, location, or\n\
                 equipment:** FIRST ask \"Which apartment are you in? (Unit 1, 2, 3, 4\n\
                 or 5)\" and only THEN give the matching information.\n\
                 \n\
                 WRONG: listing credentials for several units at once.\n\
                 RIGHT: \"Which apartment are you in? Then I can give you the right\n\
                 WiFi password.\"\n\
                 \n\
                 **General questions (check-in time, trip tips) can be answered normally.**",
                rule = SECTION_RULE,
            ),
            Some(apt) => {
                let f = facts::facts(apt);
                let brochures = if f.has_brochure_rack {
                    "Yes, on the ground floor"
                } else {
                    "Not available in this unit"
                };
                format!(
                    "{rule}\n\
                     ## GUEST IS IN: {name}\n\
                     {rule}\n\
                     \n\
                     **WiFi:** network \"{network}\", password: {password}\n\
                     **Laundry:** {laundry}\n\
                     **Brochure rack:** {brochures}\n\
                     **Location:** {location}\n\
                     \n\
                     Give ONLY this information for {name}. Do NOT mention the other apartments.",
                    rule = SECTION_RULE,
                    name = apt,
                    network = f.wifi_network,
                    password = f.wifi_password,
                    laundry = f.washing_machine,
                    brochures = brochures,
                    location = f.location,
                )
            }
        }
    }

    fn search_tool_section(&self) -> String {
        format!(
            "\n{rule}\n\
             ## YOU HAVE A WEB SEARCH TOOL\n\
             {rule}\n\
             \n\
             You have access to the **search_web** tool. USE IT when you need:\n\
             - Current weather forecasts\n\
             - Opening hours of attractions\n\
             - Current prices or events\n\
             \n\
             NEVER say \"I cannot look that up\" - you CAN search. If the guest asks\n\
             about weather, opening hours, or anything current, use the tool. State\n\
             availability in the FIRST sentence when answering attraction questions.\n",
            rule = SECTION_RULE,
        )
    }

    fn context_section(&self, retrieval: &RetrievalResult) -> String {
        let context_text = if retrieval.chunks.is_empty() {
            "No matching documents found.".to_string()
        } else {
            retrieval
                .chunks
                .iter()
                .map(|c| c.content.as_str())
                .collect::<Vec<_>>()
                .join(CHUNK_DELIMITER)
        };

        format!(
            "{rule}\n\
             ## KNOWLEDGE FROM THE DATABASE (IMPORTANT!)\n\
             {rule}\n\
             USE THIS KNOWLEDGE to answer questions. If relevant information is here,\n\
             give it to the guest - never claim you don't have it when it is listed below.\n\
             \n\
             {context_text}",
            rule = SECTION_RULE,
            context_text = context_text,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use innkeep_core::knowledge::ScoredChunk;

    fn assembler() -> PromptAssembler {
        PromptAssembler::new("Lakeside Guesthouse", "Interlaken, Switzerland")
    }

    fn retrieval_with(contents: &[&str]) -> RetrievalResult {
        RetrievalResult::from_chunks(
            contents
                .iter()
                .map(|c| ScoredChunk {
                    content: c.to_string(),
                    source: "house-guide".into(),
                    similarity: 0.8,
                })
                .collect(),
        )
    }

    #[test]
    fn unknown_apartment_withholds_all_credentials() {
        let prompt = assembler().build(Language::English, &RetrievalResult::empty(), None, true);
        assert!(prompt.contains("APARTMENT NOT YET KNOWN"));
        for f in &facts::ALL_FACTS {
            assert!(!prompt.contains(f.wifi_password));
        }
    }

    #[test]
    fn known_apartment_includes_only_its_facts() {
        for apt in Apartment::ALL {
            let prompt =
                assembler().build(Language::German, &RetrievalResult::empty(), Some(apt), true);
            let own = facts::facts(apt);
            assert!(prompt.contains(own.wifi_password));
            assert!(prompt.contains(&format!("GUEST IS IN: {apt}")));

            for other in Apartment::ALL {
                let other_facts = facts::facts(other);
                if other_facts.wifi_password != own.wifi_password {
                    assert!(
                        !prompt.contains(other_facts.wifi_password),
                        "{apt} prompt leaked credentials of {other}"
                    );
                }
            }
        }
    }

    #[test]
    fn unit5_prompt_never_contains_shared_building_password() {
        let prompt = assembler().build(
            Language::English,
            &RetrievalResult::empty(),
            Some(Apartment::Unit5),
            true,
        );
        assert!(prompt.contains(facts::facts(Apartment::Unit5).wifi_password));
        assert!(!prompt.contains(facts::facts(Apartment::Unit1).wifi_password));
    }

    #[test]
    fn chunks_appear_in_rank_order_with_delimiter() {
        let retrieval = retrieval_with(&["first chunk", "second chunk"]);
        let prompt = assembler().build(Language::English, &retrieval, None, true);
        let first = prompt.find("first chunk").unwrap();
        let second = prompt.find("second chunk").unwrap();
        assert!(first < second);
        assert!(prompt.contains("---"));
    }

    #[test]
    fn empty_context_uses_fallback_string() {
        let prompt = assembler().build(Language::French, &RetrievalResult::empty(), None, true);
        assert!(prompt.contains("No matching documents found."));
    }

    #[test]
    fn language_directive_names_current_language() {
        let prompt = assembler().build(Language::German, &RetrievalResult::empty(), None, true);
        assert!(prompt.contains("currently: de"));
    }

    #[test]
    fn policy_directives_present() {
        let prompt = assembler().build(Language::English, &RetrievalResult::empty(), None, true);
        assert!(prompt.contains("FORBIDDEN"));
        assert!(prompt.contains("NO phone or messaging numbers"));
        assert!(prompt.contains("search_web"));
        assert!(prompt.contains("BRIEF"));
    }

    #[test]
    fn no_registered_tool_omits_search_directive() {
        let prompt = assembler().build(Language::English, &RetrievalResult::empty(), None, false);
        assert!(!prompt.contains("WEB SEARCH TOOL"));
        assert!(!prompt.contains("search_web"));
        // the rest of the prompt is unaffected
        assert!(prompt.contains("FORBIDDEN"));
        assert!(prompt.contains("KNOWLEDGE FROM THE DATABASE"));
    }
}
