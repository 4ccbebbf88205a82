//! The per-unit fact table.
//!
//! Everything apartment-specific the assistant may disclose lives here, and
//! only here. The prompt assembler looks up exactly one unit's facts; other
//! units' entries are never interpolated into prompt text. That structural
//! restriction, not model instructions, is what keeps one guest's access
//! credentials out of another guest's conversation.

use innkeep_core::session::Apartment;

/// Facts for a single unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApartmentFacts {
    pub apartment: Apartment,
    pub wifi_network: &'static str,
    pub wifi_password: &'static str,
    /// Laundry note shown to the guest
    pub washing_machine: &'static str,
    pub has_brochure_rack: bool,
    pub location: &'static str,
}

/// Units 1–4 share the main building; Unit 5 is a separate building with
/// its own Wi-Fi credentials.
pub const ALL_FACTS: [ApartmentFacts; 5] = [
    ApartmentFacts {
        apartment: Apartment::Unit1,
        wifi_network: "Lakeside",
        wifi_password: "Lake44Gst07BnB",
        washing_machine: "Shared washing machine on the ground floor",
        has_brochure_rack: true,
        location: "Main building, 200m from the west train station",
    },
    ApartmentFacts {
        apartment: Apartment::Unit2,
        wifi_network: "Lakeside",
        wifi_password: "Lake44Gst07BnB",
        washing_machine: "Shared washing machine on the ground floor",
        has_brochure_rack: true,
        location: "Main building, 200m from the west train station",
    },
    ApartmentFacts {
        apartment: Apartment::Unit3,
        wifi_network: "Lakeside",
        wifi_password: "Lake44Gst07BnB",
        washing_machine: "Shared washing machine on the ground floor",
        has_brochure_rack: true,
        location: "Main building, 200m from the west train station",
    },
    ApartmentFacts {
        apartment: Apartment::Unit4,
        wifi_network: "Lakeside",
        wifi_password: "Lake44Gst07BnB",
        washing_machine: "Shared washing machine on the ground floor",
        has_brochure_rack: true,
        location: "Main building, 200m from the west train station",
    },
    ApartmentFacts {
        apartment: Apartment::Unit5,
        wifi_network: "Lakeside",
        wifi_password: "Lake44Gst21BnB",
        washing_machine: "No washing machine in the building; nearest launderette: Wash & Go, Postgasse 18",
        has_brochure_rack: false,
        location: "Separate building from Units 1-4",
    },
];

/// Look up the facts for one unit.
pub fn facts(apartment: Apartment) -> &'static ApartmentFacts {
    &ALL_FACTS[(apartment.number() - 1) as usize]
}
