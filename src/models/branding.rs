use serde::{Deserialize, Serialize};

/// Cosmetic identity of a chat widget. Behavior is identical across brands.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Branding {
    pub assistant_name: String,
    pub venue_name: String,
    pub booking_id_prefix: String,
}

impl Branding {
    pub fn talk2book() -> Self {
        Self {
            assistant_name: "Talk2Book Assistant".to_string(),
            venue_name: "Talk2Book".to_string(),
            booking_id_prefix: "TKT".to_string(),
        }
    }

    pub fn heritage_museum() -> Self {
        Self {
            assistant_name: "Heritage Museum Assistant".to_string(),
            venue_name: "Heritage Museum".to_string(),
            booking_id_prefix: "HM".to_string(),
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "talk2book" => Some(Self::talk2book()),
            "heritage" | "heritage_museum" => Some(Self::heritage_museum()),
            _ => None,
        }
    }
}

impl Default for Branding {
    fn default() -> Self {
        Self::talk2book()
    }
}
