//! Raw registry documents as stored in the index.

use serde_json::{Map, Value};

/// Field paths used by the registry index.
pub mod fields {
    pub const LIDVID: &str = "lidvid";
    pub const PRODUCT_CLASS: &str = "product_class";
    pub const TITLE: &str = "pds:Identification_Area/pds:title";
    pub const DESCRIPTION: &str = "pds:Identification_Area/pds:description";

    pub const OBSERVING_SYSTEM_NAME: &str = "pds:Observing_System/pds:name";
    pub const TARGET_NAME: &str = "pds:Target_Identification/pds:name";
    pub const INVESTIGATION_AREA_NAME: &str = "pds:Investigation_Area/pds:name";
    pub const OBSERVING_SYSTEM_COMPONENT_NAME: &str = "pds:Observing_System_Component/pds:name";
    pub const SCIENCE_FACETS_DOMAIN: &str = "pds:Science_Facets/pds:domain";

    /// Fields concatenated, in this order, into collection keywords.
    pub const KEYWORD_FIELDS: [&str; 5] = [
        OBSERVING_SYSTEM_NAME,
        TARGET_NAME,
        INVESTIGATION_AREA_NAME,
        OBSERVING_SYSTEM_COMPONENT_NAME,
        SCIENCE_FACETS_DOMAIN,
    ];

    pub const NODE_NAME: &str = "ops:Harvest_Info/ops:node_name";
    pub const PARENT_COLLECTION: &str = "ops:Provenance/ops:parent_collection_identifier";

    pub const START_DATE_TIME: &str = "pds:Time_Coordinates/pds:start_date_time";
    pub const STOP_DATE_TIME: &str = "pds:Time_Coordinates/pds:stop_date_time";

    pub const BBOX_POLYGON: &str = "bbox_polygon";
    pub const EAST_BOUND: &str = "cart:Bounding_Coordinates/cart:east_bounding_coordinate";
    pub const WEST_BOUND: &str = "cart:Bounding_Coordinates/cart:west_bounding_coordinate";
    pub const NORTH_BOUND: &str = "cart:Bounding_Coordinates/cart:north_bounding_coordinate";
    pub const SOUTH_BOUND: &str = "cart:Bounding_Coordinates/cart:south_bounding_coordinate";

    pub const FILE_REF: &str = "ops:Data_File_Info/ops:file_ref";
    pub const FILE_NAME: &str = "ops:Data_File_Info/ops:file_name";
    pub const MIME_TYPE: &str = "ops:Data_File_Info/ops:mime_type";

    pub const REF_LID_INVESTIGATION: &str = "ref_lid_investigation";
    pub const REF_LID_PLATFORM: &str = "ref_lid_platform";
    pub const REF_LID_INSTRUMENT: &str = "ref_lid_instrument";
}

/// `product_class` of individual data products.
pub const PRODUCT_OBSERVATIONAL: &str = "Product_Observational";

/// `product_class` of collection records.
pub const PRODUCT_COLLECTION: &str = "Product_Collection";

/// One document from the registry index.
///
/// Multi-valued fields conventionally hold their value at position 0. A
/// bare scalar is read as a one-element array so both shapes translate the
/// same way.
///
/// # Examples
///
/// ```
/// use pds_stac_core::record::{fields, DomainRecord};
/// use serde_json::json;
///
/// let record = DomainRecord::from_value(
///     "urn:nasa:pds:x::1.0",
///     json!({ "pds:Identification_Area/pds:title": ["Mars Images"] }),
/// );
/// assert_eq!(record.first_str(fields::TITLE), Some("Mars Images"));
/// assert_eq!(record.first_str(fields::DESCRIPTION), None);
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DomainRecord {
    doc_id: String,
    source: Map<String, Value>,
}

impl DomainRecord {
    pub fn new(doc_id: impl Into<String>, source: Map<String, Value>) -> Self {
        Self {
            doc_id: doc_id.into(),
            source,
        }
    }

    /// Builds a record from a JSON value; anything but an object yields an empty record.
    pub fn from_value(doc_id: impl Into<String>, source: Value) -> Self {
        let source = match source {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        Self::new(doc_id, source)
    }

    /// Id the index stores the document under.
    pub fn doc_id(&self) -> &str {
        &self.doc_id
    }

    /// The `lidvid` field, falling back to the document id.
    pub fn identifier(&self) -> &str {
        self.first_str(fields::LIDVID).unwrap_or(&self.doc_id)
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.source.get(field).filter(|v| !v.is_null())
    }

    pub fn contains(&self, field: &str) -> bool {
        self.get(field).is_some()
    }

    /// All values of a field; a scalar yields one element, an absent field none.
    pub fn values(&self, field: &str) -> &[Value] {
        match self.get(field) {
            Some(Value::Array(items)) => items.as_slice(),
            Some(value) => std::slice::from_ref(value),
            None => &[],
        }
    }

    pub fn first(&self, field: &str) -> Option<&Value> {
        self.values(field).first().filter(|v| !v.is_null())
    }

    pub fn first_str(&self, field: &str) -> Option<&str> {
        self.first(field).and_then(Value::as_str)
    }

    /// String values of a field, skipping non-string entries.
    pub fn strings(&self, field: &str) -> impl Iterator<Item = &str> + '_ {
        self.values(field).iter().filter_map(Value::as_str)
    }

    /// Whether `product_class` equals `class`.
    pub fn is_product_class(&self, class: &str) -> bool {
        self.first_str(fields::PRODUCT_CLASS) == Some(class)
    }

    /// Identifier of the owning collection, if declared.
    pub fn parent_collection(&self) -> Option<&str> {
        self.first_str(fields::PARENT_COLLECTION)
    }

    pub fn source(&self) -> &Map<String, Value> {
        &self.source
    }
}
