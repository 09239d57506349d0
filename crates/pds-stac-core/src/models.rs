//! Catalog entities produced for the external routing layer.
//!
//! Optional members are skipped during serialization rather than emitted as
//! `null` or empty placeholders.

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

/// Precomputed spatial extent of a collection, aggregated from its items.
///
/// West/east are kept as aggregated; a collection crossing the antimeridian
/// will report `west_bound > east_bound`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionExtent {
    pub collection_id: String,
    pub west_bound: f64,
    pub east_bound: f64,
    pub south_bound: f64,
    pub north_bound: f64,
}

impl CollectionExtent {
    /// STAC ordering: `[west, south, east, north]`.
    pub fn to_bbox(&self) -> [f64; 4] {
        [
            self.west_bound,
            self.south_bound,
            self.east_bound,
            self.north_bound,
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Provider {
    pub name: String,
    pub role: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Link {
    pub rel: String,
    pub href: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpatialExtent {
    pub bbox: Vec<[f64; 4]>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TemporalExtent {
    pub interval: Vec<[Option<String>; 2]>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Extent {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spatial: Option<SpatialExtent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temporal: Option<TemporalExtent>,
}

impl Extent {
    pub fn is_empty(&self) -> bool {
        self.spatial.is_none() && self.temporal.is_none()
    }
}

/// A STAC collection built from a `Product_Collection` record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Collection {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub stac_version: String,
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keywords: Option<Vec<String>>,
    pub license: String,
    pub providers: Vec<Provider>,
    #[serde(skip_serializing_if = "Extent::is_empty")]
    pub extent: Extent,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub links: Vec<Link>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Asset {
    pub href: String,
    pub title: String,
    #[serde(rename = "type")]
    pub media_type: String,
}

/// Assets keyed `data_file_1`, `data_file_2`, … in insertion order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Assets(pub Vec<Asset>);

impl Assets {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Looks an asset up by its serialized key.
    pub fn get(&self, key: &str) -> Option<&Asset> {
        let n: usize = key.strip_prefix("data_file_")?.parse().ok()?;
        self.0.get(n.checked_sub(1)?)
    }

    pub fn keys(&self) -> impl Iterator<Item = String> + '_ {
        (1..=self.0.len()).map(|n| format!("data_file_{}", n))
    }
}

impl Serialize for Assets {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (key, asset) in self.keys().zip(&self.0) {
            map.serialize_entry(&key, asset)?;
        }
        map.end()
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ItemProperties {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub datetime: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_datetime: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_datetime: Option<String>,
}

/// A STAC item built from a `Product_Observational` record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Item {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub stac_version: String,
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collection: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub geometry: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bbox: Option<[f64; 4]>,
    #[serde(skip_serializing_if = "Assets::is_empty")]
    pub assets: Assets,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<ItemProperties>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub links: Vec<Link>,
}

/// Sort direction of a [`SortField`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Asc,
    Desc,
}

/// One sort key of a search, in `field` / `+field` / `-field` notation.
///
/// # Examples
///
/// ```
/// use pds_stac_core::models::{Direction, SortField};
///
/// let sort: SortField = "-ops:Harvest_Info/ops:harvest_date_time".parse().unwrap();
/// assert_eq!(sort.direction, Direction::Desc);
/// assert_eq!(sort.to_string(), "-ops:Harvest_Info/ops:harvest_date_time");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortField {
    pub field: String,
    pub direction: Direction,
}

impl SortField {
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: Direction::Asc,
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: Direction::Desc,
        }
    }

    /// Index sort clause: `{field: {order: asc|desc}}`.
    pub fn to_query(&self) -> Value {
        let mut clause = serde_json::Map::new();
        clause.insert(
            self.field.clone(),
            serde_json::json!({ "order": self.direction }),
        );
        Value::Object(clause)
    }
}

impl std::str::FromStr for SortField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (direction, field) = match s.as_bytes().first() {
            Some(b'-') => (Direction::Desc, &s[1..]),
            Some(b'+') => (Direction::Asc, &s[1..]),
            _ => (Direction::Asc, s),
        };
        if field.is_empty() {
            return Err(format!("empty sort field in '{}'", s));
        }
        Ok(Self {
            field: field.to_string(),
            direction,
        })
    }
}

impl std::fmt::Display for SortField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.direction {
            Direction::Asc => write!(f, "{}", self.field),
            Direction::Desc => write!(f, "-{}", self.field),
        }
    }
}

/// Parameters of an item search, already validated by the caller.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SearchRequest {
    /// Restrict to items of these collections.
    pub collection_ids: Option<Vec<String>>,
    pub limit: usize,
    /// Token returned as `next_token` by the previous page.
    pub token: Option<String>,
    /// Overrides the default sort.
    pub sort: Option<Vec<SortField>>,
}

/// One page of item search results.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemPage {
    pub items: Vec<Item>,
    /// Total number of matching items; `None` when it could not be determined.
    pub number_matched: Option<u64>,
    /// Pass back to continue; `None` at the end of results.
    pub next_token: Option<String>,
}

impl ItemPage {
    pub fn number_returned(&self) -> usize {
        self.items.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_assets_serialize_in_order() {
        let assets = Assets(
            (1..=11)
                .map(|n| Asset {
                    href: format!("file:{}", n),
                    title: "Data File".to_string(),
                    media_type: "application/octet-stream".to_string(),
                })
                .collect(),
        );
        let json = serde_json::to_string(&assets).unwrap();
        let pos_2 = json.find("\"data_file_2\"").unwrap();
        let pos_10 = json.find("\"data_file_10\"").unwrap();
        assert!(pos_2 < pos_10);
        assert_eq!(assets.get("data_file_11").unwrap().href, "file:11");
        assert!(assets.get("data_file_0").is_none());
        assert!(assets.get("other").is_none());
    }

    #[test]
    fn test_sort_field_parse() {
        let s: SortField = "+lidvid".parse().unwrap();
        assert_eq!(s, SortField::asc("lidvid"));
        let s: SortField = "lidvid".parse().unwrap();
        assert_eq!(s, SortField::asc("lidvid"));
        assert!("-".parse::<SortField>().is_err());
    }

    #[test]
    fn test_sort_field_to_query() {
        let s = SortField::desc("ops:Harvest_Info/ops:harvest_date_time");
        assert_eq!(
            s.to_query(),
            json!({ "ops:Harvest_Info/ops:harvest_date_time": { "order": "desc" } })
        );
    }

    #[test]
    fn test_empty_extent_is_skipped() {
        let collection = Collection {
            kind: "Collection",
            stac_version: "1.0.0".to_string(),
            id: "c1".to_string(),
            title: None,
            description: None,
            keywords: None,
            license: "CC0-1.0".to_string(),
            providers: vec![],
            extent: Extent::default(),
            links: vec![],
        };
        let value = serde_json::to_value(&collection).unwrap();
        assert!(value.get("extent").is_none());
        assert!(value.get("title").is_none());
        assert_eq!(value["type"], "Collection");
    }

    #[test]
    fn test_collection_extent_bbox_order() {
        let extent = CollectionExtent {
            collection_id: "c1".to_string(),
            west_bound: -10.0,
            east_bound: 10.0,
            south_bound: -5.0,
            north_bound: 5.0,
        };
        assert_eq!(extent.to_bbox(), [-10.0, -5.0, 10.0, 5.0]);
    }
}
