//! Dictation catalog: the index page's listing, filters and facet values.
//!
//! The catalog is rebuilt from the repository on each call. Filters that
//! match nothing produce an empty listing, never an error.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use tracing::warn;

use diktat_core::error::Result;
use diktat_core::types::{ContentRepository, Dictation, DictationId};

const KEY_TITLE: &str = "titel";
const KEY_DESCRIPTION: &str = "beschreibung";
const KEY_THEME: &str = "thema";
const KEY_EXERCISE: &str = "übung";
const KEY_DIFFICULTY: &str = "schwierigkeit";

/// Listing filters. Empty or absent values do not filter.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogFilters {
    /// Case-insensitive substring of the title or the description.
    pub search: Option<String>,
    pub thema: Option<String>,
    pub uebung: Option<String>,
    pub schwierigkeit: Option<String>,
}

impl CatalogFilters {
    fn matches(&self, metadata: &BTreeMap<String, String>) -> bool {
        let field = |key: &str| metadata.get(key).map(String::as_str).unwrap_or("");

        if let Some(query) = active(&self.search) {
            let query = query.to_lowercase();
            if !field(KEY_TITLE).to_lowercase().contains(&query)
                && !field(KEY_DESCRIPTION).to_lowercase().contains(&query)
            {
                return false;
            }
        }

        [
            (&self.thema, KEY_THEME),
            (&self.uebung, KEY_EXERCISE),
            (&self.schwierigkeit, KEY_DIFFICULTY),
        ]
        .into_iter()
        .all(|(wanted, key)| active(wanted).map_or(true, |w| w == field(key)))
    }
}

fn active(filter: &Option<String>) -> Option<&str> {
    filter.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// One listed dictation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub id: DictationId,
    pub title: String,
    /// Header metadata plus a `filename` entry.
    pub metadata: BTreeMap<String, String>,
    /// Star rating for display, 1 to 5.
    pub rating: u8,
    pub sentence_count: usize,
}

impl CatalogEntry {
    fn from_dictation(dictation: &Dictation) -> Self {
        let mut metadata = dictation.metadata.clone();
        metadata.insert("filename".to_string(), dictation.id.clone());
        Self {
            id: dictation.id.clone(),
            title: dictation.title(),
            rating: star_rating(dictation.metadata.get(KEY_DIFFICULTY)),
            sentence_count: dictation.sentences.len(),
            metadata,
        }
    }
}

/// Parse a difficulty header into a 1..=5 star rating; unparsable or
/// missing values count as 1.
pub fn star_rating(difficulty: Option<&String>) -> u8 {
    difficulty
        .and_then(|d| d.trim().parse::<i64>().ok())
        .unwrap_or(1)
        .clamp(1, 5) as u8
}

/// Filtered listing plus the filter values available across all dictations.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Catalog {
    pub entries: Vec<CatalogEntry>,
    pub themes: Vec<String>,
    pub exercises: Vec<String>,
    pub difficulties: Vec<String>,
}

impl Catalog {
    /// Load every dictation from `repo` and apply `filters`.
    ///
    /// Dictations that fail to load are skipped with a warning.
    pub fn build<R>(repo: &R, filters: &CatalogFilters) -> Result<Self>
    where
        R: ContentRepository + ?Sized,
    {
        let mut all = Vec::new();
        for id in repo.list_dictations()? {
            match repo.load_dictation(&id) {
                Ok(d) => all.push(d),
                Err(e) => warn!(dictation = %id, error = %e, "Skipping unreadable dictation"),
            }
        }

        let facet = |key: &str| -> Vec<String> {
            all.iter()
                .filter_map(|d| d.metadata.get(key))
                .filter(|v| !v.is_empty())
                .cloned()
                .collect::<BTreeSet<_>>()
                .into_iter()
                .collect()
        };

        Ok(Self {
            entries: all
                .iter()
                .filter(|d| filters.matches(&d.metadata))
                .map(CatalogEntry::from_dictation)
                .collect(),
            themes: facet(KEY_THEME),
            exercises: facet(KEY_EXERCISE),
            difficulties: facet(KEY_DIFFICULTY),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::MemoryContentRepository;

    fn repo() -> MemoryContentRepository {
        MemoryContentRepository::new()
            .with_text(
                "zoo.txt",
                "# Titel: Im Zoo\n# Beschreibung: Tiere beobachten\n# Thema: Tiere\n\
                 # Übung: Nomen\n# Schwierigkeit: 2\nIm Zoo leben viele Tiere.",
            )
            .with_text(
                "wald.txt",
                "# Titel: Herbstwald\n# Thema: Natur\n# Übung: Dehnungs-h\n\
                 # Schwierigkeit: 4\nDie Blätter fallen.\nEs wird kühl.",
            )
            .with_text(
                "bauernhof.txt",
                "# Titel: Auf dem Hof\n# Thema: Tiere\n# Schwierigkeit: schwer\nDie Kuh muht.",
            )
            .with_text("ohne_kopf.txt", "Nur ein Satz.")
    }

    fn ids(catalog: &Catalog) -> Vec<&str> {
        catalog.entries.iter().map(|e| e.id.as_str()).collect()
    }

    #[test]
    fn test_unfiltered_lists_everything() {
        let catalog = Catalog::build(&repo(), &CatalogFilters::default()).unwrap();
        assert_eq!(
            ids(&catalog),
            vec!["bauernhof.txt", "ohne_kopf.txt", "wald.txt", "zoo.txt"]
        );
        let zoo = &catalog.entries[3];
        assert_eq!(zoo.title, "Im Zoo");
        assert_eq!(zoo.metadata.get("filename").unwrap(), "zoo.txt");
        assert_eq!(zoo.rating, 2);
        assert_eq!(zoo.sentence_count, 1);
    }

    #[test]
    fn test_search_title_and_description_case_insensitive() {
        let filters = CatalogFilters {
            search: Some("  tiere ".to_string()),
            ..Default::default()
        };
        let catalog = Catalog::build(&repo(), &filters).unwrap();
        assert_eq!(ids(&catalog), vec!["zoo.txt"]);

        let filters = CatalogFilters {
            search: Some("HERBST".to_string()),
            ..Default::default()
        };
        assert_eq!(ids(&Catalog::build(&repo(), &filters).unwrap()), vec!["wald.txt"]);
    }

    #[test]
    fn test_exact_filters_combine() {
        let filters = CatalogFilters {
            thema: Some("Tiere".to_string()),
            schwierigkeit: Some("2".to_string()),
            ..Default::default()
        };
        let catalog = Catalog::build(&repo(), &filters).unwrap();
        assert_eq!(ids(&catalog), vec!["zoo.txt"]);
    }

    #[test]
    fn test_exercise_filter() {
        let filters = CatalogFilters {
            uebung: Some("Dehnungs-h".to_string()),
            ..Default::default()
        };
        assert_eq!(ids(&Catalog::build(&repo(), &filters).unwrap()), vec!["wald.txt"]);
    }

    #[test]
    fn test_unknown_filter_value_yields_empty() {
        let filters = CatalogFilters {
            thema: Some("Weltraum".to_string()),
            ..Default::default()
        };
        let catalog = Catalog::build(&repo(), &filters).unwrap();
        assert!(catalog.entries.is_empty());
        assert_eq!(catalog.themes, vec!["Natur", "Tiere"]);
    }

    #[test]
    fn test_empty_filter_strings_are_ignored() {
        let filters = CatalogFilters {
            search: Some(String::new()),
            thema: Some("  ".to_string()),
            ..Default::default()
        };
        assert_eq!(Catalog::build(&repo(), &filters).unwrap().entries.len(), 4);
    }

    #[test]
    fn test_facets_sorted_and_unique() {
        let catalog = Catalog::build(&repo(), &CatalogFilters::default()).unwrap();
        assert_eq!(catalog.themes, vec!["Natur", "Tiere"]);
        assert_eq!(catalog.exercises, vec!["Dehnungs-h", "Nomen"]);
        assert_eq!(catalog.difficulties, vec!["2", "4", "schwer"]);
    }

    #[test]
    fn test_star_rating() {
        assert_eq!(star_rating(Some(&"3".to_string())), 3);
        assert_eq!(star_rating(Some(&"schwer".to_string())), 1);
        assert_eq!(star_rating(Some(&"9".to_string())), 5);
        assert_eq!(star_rating(Some(&"0".to_string())), 1);
        assert_eq!(star_rating(None), 1);
    }

    #[test]
    fn test_catalog_serializes() {
        let catalog = Catalog::build(&repo(), &CatalogFilters::default()).unwrap();
        let json = serde_json::to_value(&catalog).unwrap();
        assert_eq!(json["entries"].as_array().unwrap().len(), 4);
        assert_eq!(json["themes"][0], "Natur");
    }
}
