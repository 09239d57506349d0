//! In-memory `IndexBackend` interpreting the subset of the query DSL the
//! catalog emits: `bool.filter` with `term`/`terms`/`exists`, `ids`,
//! `sort` + `search_after`, `size`, and the collection extent aggregation.

use std::cmp::Ordering;
use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};

use async_trait::async_trait;
use pds_stac_core::backend::{Hit, Hits, IndexBackend, SearchResponse, TotalHits, TotalRelation};
use pds_stac_core::error::AppError;
use pds_stac_core::record::{fields, DomainRecord};
use serde_json::{json, Map, Value};

#[derive(Debug, Default)]
pub struct InMemoryIndex {
    pub records: Vec<DomainRecord>,
    /// `_count` fails with `BackendUnavailable`.
    pub fail_count: bool,
    /// `_search` reports totals as lower bounds.
    pub inexact_totals: bool,
    /// `_search` and `_count` answer 404.
    pub missing_index: bool,
    pub search_calls: AtomicUsize,
    pub last_search_body: std::sync::Mutex<Option<Value>>,
}

impl InMemoryIndex {
    pub fn new(records: Vec<DomainRecord>) -> Self {
        Self {
            records,
            ..Self::default()
        }
    }

    fn matching(&self, query: Option<&Value>) -> Vec<&DomainRecord> {
        self.records
            .iter()
            .filter(|r| query.map_or(true, |q| matches_query(r, q)))
            .collect()
    }
}

pub fn record(doc_id: &str, source: Value) -> DomainRecord {
    DomainRecord::from_value(doc_id, source)
}

fn matches_query(record: &DomainRecord, query: &Value) -> bool {
    if let Some(values) = query.pointer("/ids/values").and_then(Value::as_array) {
        return values.iter().any(|v| v.as_str() == Some(record.doc_id()));
    }
    let filters = query
        .pointer("/bool/filter")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();
    filters.iter().all(|f| matches_filter(record, f))
}

fn single_entry(value: &Value) -> Option<(&String, &Value)> {
    value.as_object().and_then(|m| m.iter().next())
}

fn matches_filter(record: &DomainRecord, filter: &Value) -> bool {
    if let Some((field, expected)) = filter.get("term").and_then(single_entry) {
        return record.first(field) == Some(expected);
    }
    if let Some((field, allowed)) = filter.get("terms").and_then(single_entry) {
        let allowed = allowed.as_array().cloned().unwrap_or_default();
        return record.first(field).is_some_and(|v| allowed.contains(v));
    }
    if let Some(field) = filter.pointer("/exists/field").and_then(Value::as_str) {
        return record.contains(field);
    }
    panic!("unsupported filter {}", filter);
}

fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Null, Value::Null) => Ordering::Equal,
        (Value::Null, _) => Ordering::Greater,
        (_, Value::Null) => Ordering::Less,
        _ => a.to_string().cmp(&b.to_string()),
    }
}

/// `(field, descending)` pairs of a sort clause array.
fn sort_keys(body: &Value) -> Vec<(String, bool)> {
    body.get("sort")
        .and_then(Value::as_array)
        .map(|clauses| {
            clauses
                .iter()
                .filter_map(single_entry)
                .map(|(field, spec)| (field.clone(), spec["order"] == "desc"))
                .collect()
        })
        .unwrap_or_default()
}

fn compare_tuples(a: &[Value], b: &[Value], keys: &[(String, bool)]) -> Ordering {
    for (i, (_, desc)) in keys.iter().enumerate() {
        let ord = compare_values(&a[i], &b[i]);
        let ord = if *desc { ord.reverse() } else { ord };
        if ord != Ordering::Equal {
            return ord;
        }
    }
    Ordering::Equal
}

fn min_max(records: &[&DomainRecord], field: &str, max: bool) -> Value {
    let values = records.iter().filter_map(|r| r.first(field).and_then(Value::as_f64));
    let folded = if max {
        values.fold(None, |acc: Option<f64>, v| Some(acc.map_or(v, |a| a.max(v))))
    } else {
        values.fold(None, |acc: Option<f64>, v| Some(acc.map_or(v, |a| a.min(v))))
    };
    json!({ "value": folded })
}

impl InMemoryIndex {
    fn aggregate(&self, body: &Value, matching: &[&DomainRecord]) -> Map<String, Value> {
        let (name, agg) = single_entry(&body["aggs"]).expect("one aggregation");
        let group_field = agg["terms"]["field"].as_str().expect("terms field");
        let size = agg["terms"]["size"].as_u64().unwrap_or(10) as usize;

        let mut keys: Vec<String> = Vec::new();
        for r in matching {
            if let Some(key) = r.first_str(group_field) {
                if !keys.iter().any(|k| k == key) {
                    keys.push(key.to_string());
                }
            }
        }
        keys.sort();

        let mut other = 0;
        let mut buckets = Vec::new();
        for (i, key) in keys.iter().enumerate() {
            let members: Vec<&DomainRecord> = matching
                .iter()
                .copied()
                .filter(|r| r.first_str(group_field) == Some(key.as_str()))
                .collect();
            if i >= size {
                other += members.len();
                continue;
            }
            buckets.push(json!({
                "key": key,
                "doc_count": members.len(),
                "max_east_bound": min_max(&members, fields::EAST_BOUND, true),
                "min_west_bound": min_max(&members, fields::WEST_BOUND, false),
                "max_north_bound": min_max(&members, fields::NORTH_BOUND, true),
                "min_south_bound": min_max(&members, fields::SOUTH_BOUND, false),
            }));
        }

        let mut aggregations = Map::new();
        aggregations.insert(
            name.clone(),
            json!({ "doc_count_error_upper_bound": 0, "sum_other_doc_count": other, "buckets": buckets }),
        );
        aggregations
    }
}

#[async_trait]
impl IndexBackend for InMemoryIndex {
    async fn search(&self, _index: &str, body: &Value) -> Result<SearchResponse, AppError> {
        self.search_calls.fetch_add(1, AtomicOrdering::SeqCst);
        *self.last_search_body.lock().unwrap() = Some(body.clone());
        if self.missing_index {
            return Err(AppError::NotFound("no such index [registry]".to_string()));
        }

        let matching = self.matching(body.get("query"));
        let total = TotalHits {
            value: matching.len() as u64,
            relation: if self.inexact_totals {
                TotalRelation::Gte
            } else {
                TotalRelation::Eq
            },
        };

        if body.get("aggs").is_some() {
            return Ok(SearchResponse {
                hits: Hits {
                    total: Some(total),
                    hits: vec![],
                },
                aggregations: Some(self.aggregate(body, &matching)),
            });
        }

        let keys = sort_keys(body);
        let mut rows: Vec<(Vec<Value>, &DomainRecord)> = matching
            .into_iter()
            .map(|r| {
                let tuple = keys
                    .iter()
                    .map(|(field, _)| r.first(field).cloned().unwrap_or(Value::Null))
                    .collect();
                (tuple, r)
            })
            .collect();
        rows.sort_by(|a, b| compare_tuples(&a.0, &b.0, &keys));

        if let Some(after) = body.get("search_after").and_then(Value::as_array) {
            rows.retain(|(tuple, _)| compare_tuples(tuple, after, &keys) == Ordering::Greater);
        }

        let size = body.get("size").and_then(Value::as_u64).unwrap_or(10) as usize;
        let hits = rows
            .into_iter()
            .take(size)
            .map(|(tuple, r)| Hit {
                id: r.doc_id().to_string(),
                source: r.source().clone(),
                sort: (!keys.is_empty()).then_some(tuple),
            })
            .collect();

        Ok(SearchResponse {
            hits: Hits {
                total: Some(total),
                hits,
            },
            aggregations: None,
        })
    }

    async fn count(&self, _index: &str, body: &Value) -> Result<u64, AppError> {
        if self.missing_index {
            return Err(AppError::NotFound("no such index [registry]".to_string()));
        }
        if self.fail_count {
            return Err(AppError::BackendUnavailable("count shard failure".to_string()));
        }
        Ok(self.matching(body.get("query")).len() as u64)
    }

    async fn get_document(&self, _index: &str, id: &str) -> Result<Option<DomainRecord>, AppError> {
        Ok(self.records.iter().find(|r| r.doc_id() == id).cloned())
    }
}
