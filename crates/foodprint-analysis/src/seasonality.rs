//! Is this produce in season where the consumer is, this month?

use std::sync::Arc;

use foodprint_core::{Hemisphere, ProduceCatalog, UserLocation};
use foodprint_inference::ClassifierHandle;

use crate::error::{Assessment, PipelineError, Stage};
use crate::matching::{best_match, normalize};
use crate::oracle::{consult, Consultation};

pub const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Classifier confidence needed to call something in season.
pub const IN_SEASON_THRESHOLD: f64 = 0.7;

/// Answer when neither the tables nor the classifier can decide.
const DEFAULT_GUESS: bool = false;

/// Harvest months (0 = January) as listed in the seasonal calendar.
const SEASONAL_CALENDAR: &[(&str, &[u8])] = &[
    ("apple", &[7, 8, 9, 10, 11]),
    ("apricot", &[5, 6, 7]),
    ("asparagus", &[3, 4, 5]),
    ("avocado", &[2, 3, 4, 5, 6, 7, 8]),
    ("banana", &[0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11]),
    ("beetroot", &[5, 6, 7, 8, 9, 10]),
    ("bell pepper", &[6, 7, 8, 9]),
    ("blackberry", &[6, 7, 8]),
    ("blueberry", &[5, 6, 7, 8]),
    ("broccoli", &[5, 6, 7, 8, 9, 10]),
    ("brussels sprouts", &[9, 10, 11, 0, 1]),
    ("cabbage", &[0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11]),
    ("carrot", &[5, 6, 7, 8, 9, 10]),
    ("cauliflower", &[5, 6, 7, 8, 9, 10, 11]),
    ("cherry", &[5, 6]),
    ("cucumber", &[5, 6, 7, 8]),
    ("eggplant", &[6, 7, 8, 9]),
    ("grape", &[7, 8, 9]),
    ("grapefruit", &[11, 0, 1, 2, 3]),
    ("kale", &[9, 10, 11, 0, 1, 2]),
    ("kiwi", &[10, 11, 0, 1, 2]),
    ("leek", &[8, 9, 10, 11, 0, 1, 2]),
    ("lemon", &[11, 0, 1, 2, 3]),
    ("lettuce", &[4, 5, 6, 7, 8]),
    ("mango", &[3, 4, 5, 6, 7]),
    ("orange", &[11, 0, 1, 2, 3]),
    ("papaya", &[3, 4, 5, 6, 7, 8]),
    ("peach", &[5, 6, 7, 8]),
    ("pear", &[7, 8, 9, 10, 11]),
    ("pineapple", &[2, 3, 4, 5, 6]),
    ("plum", &[6, 7, 8, 9]),
    ("potato", &[5, 6, 7, 8, 9, 10]),
    ("pumpkin", &[8, 9, 10, 11]),
    ("raspberry", &[5, 6, 7, 8]),
    ("rhubarb", &[2, 3, 4, 5]),
    ("spinach", &[2, 3, 4, 5, 8, 9, 10]),
    ("strawberry", &[4, 5, 6, 7]),
    ("sweet potato", &[8, 9, 10, 11]),
    ("tomato", &[5, 6, 7, 8, 9]),
    ("watermelon", &[5, 6, 7, 8]),
    ("zucchini", &[5, 6, 7, 8]),
];

/// Broad produce families with a Northern-hemisphere season, mirrored six
/// months for Southern locations.
const HEMISPHERE_DEFAULTS: &[(&str, &[u8])] = &[
    ("berries", &[5, 6, 7]),
    ("citrus", &[11, 0, 1, 2]),
    ("corn", &[6, 7, 8]),
    ("beans", &[6, 7, 8]),
    ("peas", &[5, 6]),
    ("squash", &[8, 9, 10]),
    ("melon", &[6, 7, 8]),
    ("greens", &[3, 4, 5, 8, 9]),
    ("root", &[8, 9, 10, 11, 0, 1]),
    ("stone fruit", &[5, 6, 7]),
];

/// Place-name fragments that put a location south of the equator.
const SOUTHERN_REGIONS: &[&str] = &[
    "australia",
    "new zealand",
    "argentina",
    "chile",
    "south africa",
    "brazil",
    "peru",
    "uruguay",
];

/// Hemisphere for a free-text place name; Northern unless a known Southern
/// region is named.
#[must_use]
pub fn hemisphere_for_place(place: &str) -> Hemisphere {
    let place = normalize(place);
    if SOUTHERN_REGIONS.iter().any(|r| place.contains(r)) {
        Hemisphere::Southern
    } else {
        Hemisphere::Northern
    }
}

/// Hemisphere for a consumer location. Named regions decide first; a
/// negative latitude also means Southern.
#[must_use]
pub fn hemisphere_for(location: &UserLocation) -> Hemisphere {
    if let Some(text) = location.place_text() {
        if hemisphere_for_place(&text) == Hemisphere::Southern {
            return Hemisphere::Southern;
        }
    }
    match location.coordinates() {
        Some(c) if c.lat < 0.0 => Hemisphere::Southern,
        _ => Hemisphere::Northern,
    }
}

/// English name of a 0-based month, wrapping out-of-range input.
#[must_use]
pub fn month_name(month: u8) -> &'static str {
    MONTH_NAMES[usize::from(month % 12)]
}

pub struct SeasonalityOracle {
    catalog: Arc<ProduceCatalog>,
    classifier: Arc<ClassifierHandle>,
}

impl SeasonalityOracle {
    #[must_use]
    pub fn new(catalog: Arc<ProduceCatalog>, classifier: Arc<ClassifierHandle>) -> Self {
        Self {
            catalog,
            classifier,
        }
    }

    /// Decide from the static tables alone; `None` when nothing matches.
    ///
    /// Catalog and calendar months are used as listed. The family defaults
    /// are shifted six months for the Southern hemisphere.
    #[must_use]
    pub fn lookup(&self, produce: &str, month: u8, hemisphere: Hemisphere) -> Option<bool> {
        let month = month % 12;

        if let Some(entry) = self.catalog.find(produce) {
            if !entry.in_season.is_empty() {
                return Some(entry.in_season.contains(&month));
            }
        }

        if let Some(months) = table_months(SEASONAL_CALENDAR, produce) {
            return Some(months.contains(&month));
        }

        table_months(HEMISPHERE_DEFAULTS, produce).map(|months| {
            let northern_month = match hemisphere {
                Hemisphere::Northern => month,
                Hemisphere::Southern => (month + 6) % 12,
            };
            months.contains(&northern_month)
        })
    }

    /// Tables first, then the classifier on
    /// `"<produce> is in season in <location> during <Month>"`.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Configuration`] if the classifier rejects the
    /// credential. Any other classifier failure yields the default guess and
    /// a warning.
    pub async fn is_in_season(
        &self,
        produce: &str,
        month: u8,
        hemisphere: Hemisphere,
        location: &str,
    ) -> Result<Assessment<bool>, PipelineError> {
        if let Some(in_season) = self.lookup(produce, month, hemisphere) {
            return Ok(Assessment::clean(in_season));
        }

        let prompt = format!(
            "{} is in season in {location} during {}",
            produce.trim(),
            month_name(month)
        );
        match consult(&self.classifier, Stage::Seasonality, &prompt).await? {
            Consultation::Answer(answer) => {
                Ok(Assessment::clean(answer.is_confident_yes(IN_SEASON_THRESHOLD)))
            }
            Consultation::Unavailable(warning) => {
                Ok(Assessment::with_warning(DEFAULT_GUESS, Some(warning)))
            }
        }
    }
}

fn table_months(
    table: &'static [(&'static str, &'static [u8])],
    produce: &str,
) -> Option<&'static [u8]> {
    let key = best_match(produce, table.iter().map(|(name, _)| *name))?;
    table
        .iter()
        .find(|(name, _)| *name == key)
        .map(|(_, months)| *months)
}
