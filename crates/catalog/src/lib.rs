use std::collections::HashSet;

use foundation::LngLat;
use serde::{Deserialize, Serialize};

mod seed;

pub use seed::{CHICAGO_CENTER, chicago_events};

/// A point of interest shown as a marker on the map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PinRecord {
    pub id: String,
    pub title: String,
    pub category: String,
    /// Display string, not a parsed timestamp.
    pub starts_at: String,
    pub description: String,
    pub coordinate: LngLat,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CatalogError {
    #[error("duplicate pin id `{0}`")]
    DuplicateId(String),
    #[error("pin `{id}` has out-of-range coordinate ({lng}, {lat})")]
    InvalidCoordinate { id: String, lng: f64, lat: f64 },
    #[error("catalog data is malformed: {0}")]
    Malformed(String),
}

/// Immutable, ordered list of pins.
///
/// Ordering contract:
/// - `all()` yields records in insertion order.
/// - Ids are unique; `new` rejects duplicates.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PinCatalog {
    pins: Vec<PinRecord>,
}

impl PinCatalog {
    pub fn new(pins: Vec<PinRecord>) -> Result<Self, CatalogError> {
        let mut seen = HashSet::with_capacity(pins.len());
        for pin in &pins {
            if !seen.insert(pin.id.as_str()) {
                return Err(CatalogError::DuplicateId(pin.id.clone()));
            }
            if !pin.coordinate.is_valid() {
                return Err(CatalogError::InvalidCoordinate {
                    id: pin.id.clone(),
                    lng: pin.coordinate.lng,
                    lat: pin.coordinate.lat,
                });
            }
        }
        Ok(Self { pins })
    }

    /// The four built-in Chicago events.
    pub fn seeded() -> Self {
        // The seed list is fixed and satisfies `new`'s invariants.
        Self {
            pins: chicago_events(),
        }
    }

    /// Parses a JSON array of records (`startsAt`, `[lng, lat]` coordinates).
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let pins: Vec<PinRecord> =
            serde_json::from_str(json).map_err(|e| CatalogError::Malformed(e.to_string()))?;
        Self::new(pins)
    }

    pub fn all(&self) -> &[PinRecord] {
        &self.pins
    }

    pub fn find(&self, id: &str) -> Option<&PinRecord> {
        self.pins.iter().find(|p| p.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.find(id).is_some()
    }

    pub fn first(&self) -> Option<&PinRecord> {
        self.pins.first()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> + '_ {
        self.pins.iter().map(|p| p.id.as_str())
    }

    pub fn len(&self) -> usize {
        self.pins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pins.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::{CatalogError, PinCatalog, chicago_events};
    use pretty_assertions::assert_eq;
    use std::collections::HashSet;

    #[test]
    fn seeded_catalog_passes_validation() {
        let validated = PinCatalog::new(chicago_events()).unwrap();
        assert_eq!(validated, PinCatalog::seeded());
        assert_eq!(validated.len(), 4);
    }

    #[test]
    fn find_returns_every_pin_and_ids_are_distinct() {
        let catalog = PinCatalog::seeded();
        for pin in catalog.all() {
            assert_eq!(catalog.find(&pin.id), Some(pin));
        }
        let ids: HashSet<&str> = catalog.ids().collect();
        assert_eq!(ids.len(), catalog.len());
    }

    #[test]
    fn all_preserves_insertion_order() {
        let catalog = PinCatalog::seeded();
        let ids: Vec<&str> = catalog.ids().collect();
        assert_eq!(
            ids,
            vec![
                "chi-river-kayak-night",
                "west-loop-jazz",
                "lincoln-park-market",
                "museum-campus-foodfest",
            ]
        );
        assert_eq!(catalog.first().map(|p| p.id.as_str()), Some(ids[0]));
    }

    #[test]
    fn missing_id_is_not_found() {
        let catalog = PinCatalog::seeded();
        assert!(catalog.find("nope").is_none());
        assert!(!catalog.contains(""));
    }

    #[test]
    fn rejects_duplicate_ids() {
        let mut pins = chicago_events();
        pins[2].id = pins[0].id.clone();
        assert_eq!(
            PinCatalog::new(pins),
            Err(CatalogError::DuplicateId("chi-river-kayak-night".into()))
        );
    }

    #[test]
    fn rejects_out_of_range_coordinates() {
        let mut pins = chicago_events();
        pins[1].coordinate.lat = 120.0;
        assert!(matches!(
            PinCatalog::new(pins),
            Err(CatalogError::InvalidCoordinate { id, .. }) if id == "west-loop-jazz"
        ));
    }

    #[test]
    fn loads_records_from_json() {
        let json = r#"[
            {
                "id": "pier-fireworks",
                "title": "Navy Pier Fireworks",
                "category": "Outdoor",
                "startsAt": "Sat 9:30 PM",
                "description": "Summer fireworks over the lake.",
                "coordinate": [-87.6051, 41.8917]
            }
        ]"#;
        let catalog = PinCatalog::from_json(json).unwrap();
        let pin = catalog.find("pier-fireworks").unwrap();
        assert_eq!(pin.starts_at, "Sat 9:30 PM");
        assert_eq!(pin.coordinate.to_array(), [-87.6051, 41.8917]);
    }

    #[test]
    fn malformed_json_is_reported() {
        assert!(matches!(
            PinCatalog::from_json("{\"id\": 1}"),
            Err(CatalogError::Malformed(_))
        ));
    }
}
