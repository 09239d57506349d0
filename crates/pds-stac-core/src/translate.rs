//! Translation of registry records into STAC collections and items.
//!
//! Both functions are pure: the record, the cached extent and the catalog
//! configuration fully determine the output.

use serde_json::Value;

use crate::config::CatalogConfig;
use crate::models::{
    Asset, Assets, Collection, CollectionExtent, Extent, Item, ItemProperties, Link, Provider,
    SpatialExtent, TemporalExtent,
};
use crate::record::{fields, DomainRecord};

const DEFAULT_ASSET_TITLE: &str = "Data File";
const DEFAULT_ASSET_TYPE: &str = "application/octet-stream";
const CUSTODIAN_ROLE: &str = "custodian";

/// Harvesting node reported when a record does not name one.
const UNKNOWN_NODE: &str = "unknown";

fn owned(value: Option<&str>) -> Option<String> {
    value.map(str::to_string)
}

/// Related links for the investigation, platform and instrument references.
fn reference_links(record: &DomainRecord, config: &CatalogConfig) -> Vec<Link> {
    [
        ("investigation", fields::REF_LID_INVESTIGATION),
        ("platform", fields::REF_LID_PLATFORM),
        ("instrument", fields::REF_LID_INSTRUMENT),
    ]
    .into_iter()
    .filter_map(|(rel, field)| {
        record.first_str(field).map(|lid| Link {
            rel: rel.to_string(),
            href: format!("{}products/{}", config.api_base_url, lid),
        })
    })
    .collect()
}

/// Start and stop instants of the record, each optional.
fn time_bounds(record: &DomainRecord) -> (Option<String>, Option<String>) {
    (
        owned(record.first_str(fields::START_DATE_TIME)),
        owned(record.first_str(fields::STOP_DATE_TIME)),
    )
}

/// Builds a collection from a `Product_Collection` record.
///
/// `extent` is the cached spatial extent of the collection; a collection
/// whose items carry no bounding coordinates has none and is emitted
/// without a spatial extent.
pub fn to_collection(
    record: &DomainRecord,
    extent: Option<&CollectionExtent>,
    config: &CatalogConfig,
) -> Collection {
    let keywords: Vec<String> = fields::KEYWORD_FIELDS
        .iter()
        .flat_map(|field| record.strings(field))
        .map(str::to_string)
        .collect();

    let provider = Provider {
        name: record
            .first_str(fields::NODE_NAME)
            .unwrap_or(UNKNOWN_NODE)
            .to_string(),
        role: CUSTODIAN_ROLE.to_string(),
        url: config.provider_url.clone(),
    };

    let spatial = extent.map(|e| SpatialExtent {
        bbox: vec![e.to_bbox()],
    });

    let temporal = match time_bounds(record) {
        (None, None) => None,
        (start, stop) => Some(TemporalExtent {
            interval: vec![[start, stop]],
        }),
    };

    Collection {
        kind: "Collection",
        stac_version: config.stac_version.clone(),
        id: record.identifier().to_string(),
        title: owned(record.first_str(fields::TITLE)),
        description: owned(record.first_str(fields::DESCRIPTION)),
        keywords: (!keywords.is_empty()).then_some(keywords),
        license: config.license.clone(),
        providers: vec![provider],
        extent: Extent { spatial, temporal },
        links: reference_links(record, config),
    }
}

/// Builds an item from a `Product_Observational` record.
pub fn to_item(record: &DomainRecord, config: &CatalogConfig) -> Item {
    let geometry = record.get(fields::BBOX_POLYGON).cloned();
    let bbox = geometry.as_ref().and_then(bbox_from_polygon);

    Item {
        kind: "Feature",
        stac_version: config.stac_version.clone(),
        id: record.identifier().to_string(),
        collection: owned(record.parent_collection()),
        geometry,
        bbox,
        assets: data_file_assets(record),
        properties: item_properties(record),
        links: reference_links(record, config),
    }
}

/// Reads `[west, east, south, north]` off the exterior ring of a rectangle.
///
/// Assumes the ring starts at the south-west corner and walks east first:
/// `[ring[0].x, ring[1].x, ring[0].y, ring[2].y]`. The polygon shape is not
/// validated.
fn bbox_from_polygon(geometry: &Value) -> Option<[f64; 4]> {
    let ring = geometry.get("coordinates")?.get(0)?;
    let coord = |point: usize, axis: usize| ring.get(point)?.get(axis)?.as_f64();
    Some([coord(0, 0)?, coord(1, 0)?, coord(0, 1)?, coord(2, 1)?])
}

fn data_file_assets(record: &DomainRecord) -> Assets {
    let names = record.values(fields::FILE_NAME);
    let types = record.values(fields::MIME_TYPE);

    let assets = record
        .strings(fields::FILE_REF)
        .enumerate()
        .map(|(i, href)| Asset {
            href: href.to_string(),
            title: names
                .get(i)
                .and_then(Value::as_str)
                .unwrap_or(DEFAULT_ASSET_TITLE)
                .to_string(),
            media_type: types
                .get(i)
                .and_then(Value::as_str)
                .unwrap_or(DEFAULT_ASSET_TYPE)
                .to_string(),
        })
        .collect();

    Assets(assets)
}

fn item_properties(record: &DomainRecord) -> Option<ItemProperties> {
    match time_bounds(record) {
        (None, None) => None,
        (Some(start), stop) => Some(ItemProperties {
            datetime: Some(start.clone()),
            start_datetime: Some(start),
            end_datetime: stop,
        }),
        (None, Some(stop)) => Some(ItemProperties {
            datetime: Some(stop.clone()),
            start_datetime: None,
            end_datetime: Some(stop),
        }),
    }
}
