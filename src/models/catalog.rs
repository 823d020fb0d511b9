use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Exhibition {
    pub id: u32,
    pub name: String,
    pub museum: String,
    pub description: String,
    /// Price of one ticket in whole US dollars.
    pub unit_price: u32,
    pub duration: String,
    pub rating: f32,
    pub category: String,
    pub location: String,
    pub availability: String,
    pub features: Vec<String>,
    pub next_available: String,
}

/// Fixed, read-only set of bookable exhibitions.
#[derive(Debug, Clone, Serialize)]
pub struct ExhibitionCatalog {
    exhibitions: Vec<Exhibition>,
}

impl ExhibitionCatalog {
    pub fn new(exhibitions: Vec<Exhibition>) -> Self {
        Self { exhibitions }
    }

    pub fn all(&self) -> &[Exhibition] {
        &self.exhibitions
    }

    pub fn names(&self) -> Vec<String> {
        self.exhibitions.iter().map(|e| e.name.clone()).collect()
    }

    pub fn get(&self, id: u32) -> Option<&Exhibition> {
        self.exhibitions.iter().find(|e| e.id == id)
    }

    /// Resolve free text to a catalog entry.
    ///
    /// The first entry (in catalog order) whose name appears in the input
    /// wins. Failing that, an input of at least three characters that is
    /// part of exactly one name selects that entry.
    pub fn find_match(&self, input: &str) -> Option<&Exhibition> {
        let needle = input.trim().to_lowercase();
        if needle.is_empty() {
            return None;
        }

        if let Some(found) = self
            .exhibitions
            .iter()
            .find(|e| needle.contains(&e.name.to_lowercase()))
        {
            return Some(found);
        }

        if needle.chars().count() < 3 {
            return None;
        }
        let mut partial = self
            .exhibitions
            .iter()
            .filter(|e| e.name.to_lowercase().contains(&needle));
        match (partial.next(), partial.next()) {
            (Some(only), None) => Some(only),
            _ => None,
        }
    }

    /// Filter by category ("All" or `None` means no filter) and a
    /// case-insensitive search over name, museum and description.
    pub fn search(&self, term: Option<&str>, category: Option<&str>) -> Vec<&Exhibition> {
        let term = term.map(|t| t.trim().to_lowercase()).filter(|t| !t.is_empty());
        let category = category
            .map(str::trim)
            .filter(|c| !c.is_empty() && !c.eq_ignore_ascii_case("all"));

        self.exhibitions
            .iter()
            .filter(|e| match category {
                Some(c) => e.category.eq_ignore_ascii_case(c),
                None => true,
            })
            .filter(|e| match &term {
                Some(t) => {
                    e.name.to_lowercase().contains(t)
                        || e.museum.to_lowercase().contains(t)
                        || e.description.to_lowercase().contains(t)
                }
                None => true,
            })
            .collect()
    }

    pub fn categories(&self) -> Vec<String> {
        let mut out = vec!["All".to_string()];
        for e in &self.exhibitions {
            if !out.contains(&e.category) {
                out.push(e.category.clone());
            }
        }
        out
    }
}

impl Default for ExhibitionCatalog {
    fn default() -> Self {
        Self::new(vec![
            exhibition(
                1,
                "Ancient Civilizations",
                "Metropolitan Museum of Art",
                "Journey through time and explore the world of ancient Egypt, Greece, and Rome. See authentic artifacts, mummies, and treasures.",
                25,
                "2-3 hours",
                4.8,
                "History",
                "5th Ave, New York",
                "Available",
                &["Audio Guide", "Interactive", "Family Friendly"],
                "Today at 2:00 PM",
            ),
            exhibition(
                2,
                "Modern Art Gallery",
                "Museum of Modern Art (MoMA)",
                "A collection of modern and contemporary art featuring works by Picasso, Van Gogh, and Warhol.",
                30,
                "1-2 hours",
                4.9,
                "Art",
                "11 W 53rd St, New York",
                "Limited",
                &["Audio Guide", "Expert Tour", "Photography"],
                "Tomorrow at 10:00 AM",
            ),
            exhibition(
                3,
                "Space & Science",
                "Natural History Museum",
                "Interactive planetarium shows, moon rocks, and hands-on space exploration exhibits.",
                28,
                "2-4 hours",
                4.7,
                "Science",
                "200 Central Park West",
                "Available",
                &["Planetarium", "Interactive", "Kids Zone", "IMAX"],
                "Today at 1:30 PM",
            ),
            exhibition(
                4,
                "Contemporary Photography",
                "Photography Center",
                "Contemporary photography from emerging and established artists worldwide.",
                22,
                "1-2 hours",
                4.6,
                "Photography",
                "94 E Broadway, New York",
                "Available",
                &["Artist Talks", "Photography", "Quiet Viewing"],
                "Today at 3:00 PM",
            ),
        ])
    }
}

#[allow(clippy::too_many_arguments)]
fn exhibition(
    id: u32,
    name: &str,
    museum: &str,
    description: &str,
    unit_price: u32,
    duration: &str,
    rating: f32,
    category: &str,
    location: &str,
    availability: &str,
    features: &[&str],
    next_available: &str,
) -> Exhibition {
    Exhibition {
        id,
        name: name.to_string(),
        museum: museum.to_string(),
        description: description.to_string(),
        unit_price,
        duration: duration.to_string(),
        rating,
        category: category.to_string(),
        location: location.to_string(),
        availability: availability.to_string(),
        features: features.iter().map(|f| f.to_string()).collect(),
        next_available: next_available.to_string(),
    }
}
