//! Nutrient profiles, food groups and similarity between produce.

use std::sync::Arc;

use foodprint_core::{NutritionFeatures, ProduceCatalog};

use crate::matching::{best_match, normalize};

/// Per-100g profile: (name, kcal, protein g, carbs g, fat g, notable vitamins).
const NUTRITION_TABLE: &[(&str, f64, f64, f64, f64, &[&str])] = &[
    ("apple", 52.0, 0.3, 14.0, 0.2, &["C"]),
    ("pear", 57.0, 0.4, 15.0, 0.1, &["C", "K"]),
    ("banana", 89.0, 1.1, 23.0, 0.3, &["B6", "C"]),
    ("orange", 47.0, 0.9, 12.0, 0.1, &["C", "B9"]),
    ("lemon", 29.0, 1.1, 9.0, 0.3, &["C"]),
    ("grapefruit", 42.0, 0.8, 11.0, 0.1, &["A", "C"]),
    ("strawberry", 32.0, 0.7, 7.7, 0.3, &["C", "B9"]),
    ("blueberry", 57.0, 0.7, 14.0, 0.3, &["C", "K"]),
    ("raspberry", 52.0, 1.2, 12.0, 0.7, &["C", "K"]),
    ("blackberry", 43.0, 1.4, 10.0, 0.5, &["C", "K"]),
    ("cranberry", 46.0, 0.4, 12.0, 0.1, &["C", "E"]),
    ("grape", 69.0, 0.7, 18.0, 0.2, &["C", "K"]),
    ("kiwi", 61.0, 1.1, 15.0, 0.5, &["C", "K", "E"]),
    ("mango", 60.0, 0.8, 15.0, 0.4, &["A", "C"]),
    ("papaya", 43.0, 0.5, 11.0, 0.3, &["A", "C"]),
    ("pineapple", 50.0, 0.5, 13.0, 0.1, &["C", "B6"]),
    ("avocado", 160.0, 2.0, 8.5, 14.7, &["K", "E", "B9"]),
    ("peach", 39.0, 0.9, 9.5, 0.3, &["A", "C"]),
    ("plum", 46.0, 0.7, 11.0, 0.3, &["A", "C"]),
    ("cherry", 63.0, 1.1, 16.0, 0.2, &["A", "C"]),
    ("apricot", 48.0, 1.4, 11.0, 0.4, &["A", "C"]),
    ("watermelon", 30.0, 0.6, 7.6, 0.2, &["A", "C"]),
    ("tomato", 18.0, 0.9, 3.9, 0.2, &["A", "C", "K"]),
    ("bell pepper", 31.0, 1.0, 6.0, 0.3, &["A", "C", "B6"]),
    ("eggplant", 25.0, 1.0, 6.0, 0.2, &["B1", "B6"]),
    ("cucumber", 15.0, 0.7, 3.6, 0.1, &["K"]),
    ("zucchini", 17.0, 1.2, 3.1, 0.3, &["A", "C"]),
    ("carrot", 41.0, 0.9, 10.0, 0.2, &["A", "K"]),
    ("potato", 77.0, 2.0, 17.0, 0.1, &["C", "B6"]),
    ("sweet potato", 86.0, 1.6, 20.0, 0.1, &["A", "C"]),
    ("beetroot", 43.0, 1.6, 10.0, 0.2, &["B9", "C"]),
    ("spinach", 23.0, 2.9, 3.6, 0.4, &["A", "C", "K", "B9"]),
    ("lettuce", 15.0, 1.4, 2.9, 0.2, &["A", "K"]),
    ("kale", 49.0, 4.3, 8.8, 0.9, &["A", "C", "K"]),
    ("broccoli", 34.0, 2.8, 6.6, 0.4, &["C", "K"]),
    ("cauliflower", 25.0, 1.9, 5.0, 0.3, &["C", "K"]),
    ("cabbage", 25.0, 1.3, 5.8, 0.1, &["C", "K"]),
    ("brussels sprouts", 43.0, 3.4, 9.0, 0.3, &["C", "K"]),
    ("asparagus", 20.0, 2.2, 3.9, 0.1, &["K", "B9"]),
    ("green beans", 31.0, 1.8, 7.0, 0.2, &["C", "K"]),
    ("peas", 81.0, 5.4, 14.0, 0.4, &["C", "K", "B1"]),
    ("oats", 389.0, 16.9, 66.0, 6.9, &["B1"]),
    ("quinoa", 120.0, 4.4, 21.0, 1.9, &["B9", "E"]),
    ("lentils", 116.0, 9.0, 20.0, 0.4, &["B9", "B1"]),
    ("chickpeas", 164.0, 8.9, 27.0, 2.6, &["B9", "B6"]),
    ("almonds", 579.0, 21.0, 22.0, 50.0, &["E", "B2"]),
    ("walnuts", 654.0, 15.0, 14.0, 65.0, &["B6", "E"]),
    ("sunflower seeds", 584.0, 21.0, 20.0, 51.0, &["E", "B1"]),
    ("olives", 115.0, 0.8, 6.0, 11.0, &["E"]),
    ("coconut", 354.0, 3.3, 15.0, 33.0, &["C"]),
];

/// Profile assumed for produce missing from every table.
pub const DEFAULT_FEATURES: (f64, f64, f64, f64) = (50.0, 1.0, 12.0, 0.3);

/// Food groups used to propose substitutes. A produce may sit in several.
pub(crate) const FOOD_GROUPS: &[(&str, &[&str])] = &[
    (
        "fruits",
        &[
            "apple", "pear", "banana", "orange", "grape", "kiwi", "mango", "peach", "plum",
            "cherry", "strawberry", "blueberry", "watermelon", "avocado",
        ],
    ),
    (
        "vegetables",
        &[
            "carrot", "potato", "tomato", "bell pepper", "cucumber", "zucchini", "broccoli",
            "spinach", "lettuce", "cabbage", "asparagus", "green beans", "eggplant",
        ],
    ),
    ("grains", &["oats", "quinoa"]),
    ("protein", &["lentils", "chickpeas", "peas"]),
    ("nuts and seeds", &["almonds", "walnuts", "sunflower seeds"]),
    ("leafy greens", &["spinach", "lettuce", "kale", "cabbage"]),
    (
        "cruciferous",
        &["broccoli", "cauliflower", "cabbage", "kale", "brussels sprouts"],
    ),
    (
        "root vegetables",
        &["carrot", "potato", "sweet potato", "beetroot"],
    ),
    ("nightshades", &["tomato", "bell pepper", "eggplant", "potato"]),
    (
        "berries",
        &["strawberry", "blueberry", "raspberry", "blackberry", "cranberry"],
    ),
    ("citrus", &["orange", "lemon", "grapefruit"]),
    (
        "tropical fruits",
        &["banana", "mango", "papaya", "pineapple", "kiwi", "coconut"],
    ),
    ("stone fruits", &["peach", "plum", "cherry", "apricot", "mango"]),
    ("pome fruits", &["apple", "pear"]),
    ("high-fat fruits", &["avocado", "olives", "coconut"]),
];

/// Candidates used when the produce belongs to no known group.
pub const GENERIC_CANDIDATES: &[&str] = &[
    "apple",
    "pear",
    "banana",
    "carrot",
    "tomato",
    "spinach",
    "lettuce",
    "broccoli",
    "potato",
    "strawberry",
    "bell pepper",
    "kiwi",
];

/// Cosine similarity of two vectors; `0.0` if either has no magnitude.
#[must_use]
pub fn cosine_similarity(a: &[f64; 4], b: &[f64; 4]) -> f64 {
    let dot: f64 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f64>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f64>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    (dot / (norm_a * norm_b)).clamp(0.0, 1.0)
}

/// Nutrition and grouping lookups over the built-in tables and the catalog.
#[derive(Debug, Clone, Default)]
pub struct NutritionIndex {
    catalog: Arc<ProduceCatalog>,
}

impl NutritionIndex {
    #[must_use]
    pub fn new(catalog: Arc<ProduceCatalog>) -> Self {
        Self { catalog }
    }

    /// Canonical table name for `produce`, if any table knows it.
    #[must_use]
    pub fn canonical_name(&self, produce: &str) -> Option<String> {
        if let Some(entry) = self.catalog.find(produce) {
            return Some(entry.key());
        }
        best_match(produce, NUTRITION_TABLE.iter().map(|row| row.0)).map(str::to_string)
    }

    /// Nutrient profile, falling back to [`DEFAULT_FEATURES`].
    #[must_use]
    pub fn features(&self, produce: &str) -> NutritionFeatures {
        if let Some(n) = self.catalog.find(produce).and_then(|e| e.nutrition.as_ref()) {
            return n.into();
        }
        let matched = best_match(produce, NUTRITION_TABLE.iter().map(|row| row.0));
        match NUTRITION_TABLE.iter().find(|row| Some(row.0) == matched) {
            Some(&(_, calories, protein, carbs, fat, vitamins)) => {
                NutritionFeatures::new(calories, protein, carbs, fat).with_vitamins(vitamins)
            }
            None => {
                tracing::debug!(produce, "no nutrition profile, using default");
                let (calories, protein, carbs, fat) = DEFAULT_FEATURES;
                NutritionFeatures::new(calories, protein, carbs, fat)
            }
        }
    }

    /// Cosine similarity of two produce items' normalized profiles.
    #[must_use]
    pub fn similarity(&self, a: &str, b: &str) -> f64 {
        cosine_similarity(
            &self.features(a).normalized_vector(),
            &self.features(b).normalized_vector(),
        )
    }

    /// Names of the groups `produce` belongs to, built-in and catalog.
    #[must_use]
    pub fn groups_of(&self, produce: &str) -> Vec<String> {
        let mut groups: Vec<String> = Vec::new();
        if let Some(group) = self.catalog.find(produce).and_then(|e| e.group.as_deref()) {
            groups.push(normalize(group));
        }
        if let Some(name) = best_match(produce, NUTRITION_TABLE.iter().map(|row| row.0)) {
            for (group, members) in FOOD_GROUPS {
                if members.contains(&name) && !groups.iter().any(|g| g == group) {
                    groups.push((*group).to_string());
                }
            }
        }
        groups
    }

    /// Substitute candidates for `produce`: members of its groups, or the
    /// generic list when it has none. Never contains `produce` itself.
    #[must_use]
    pub fn candidates(&self, produce: &str) -> Vec<String> {
        let own = self
            .canonical_name(produce)
            .unwrap_or_else(|| normalize(produce));
        let query = normalize(produce);

        let mut pool: Vec<String> = Vec::new();
        for group in self.groups_of(produce) {
            let builtin = FOOD_GROUPS
                .iter()
                .find(|(name, _)| *name == group)
                .map(|(_, members)| members.iter().map(|m| (*m).to_string()).collect::<Vec<_>>())
                .unwrap_or_default();
            for member in builtin.into_iter().chain(self.catalog.group_members(&group)) {
                if member != own && member != query && !pool.contains(&member) {
                    pool.push(member);
                }
            }
        }

        if pool.is_empty() {
            pool = GENERIC_CANDIDATES
                .iter()
                .map(|c| (*c).to_string())
                .filter(|c| *c != own && *c != query)
                .collect();
        }
        pool
    }
}
