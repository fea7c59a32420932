//! Documents, queries and snapshots
//!
//! A query is evaluated the same way whether the backend runs it or the
//! client falls back to running it over an unfiltered snapshot:
//! filter, then a stable sort (ties keep arrival order), then limit.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::cmp::Ordering;

/// A document as delivered by the backend: an id plus an open field map
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    #[serde(default)]
    pub fields: Map<String, Value>,
}

impl Document {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            fields: Map::new(),
        }
    }

    /// Builder-style field setter
    pub fn field(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.fields.insert(name.to_string(), value.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// String field, `None` when absent or not a string
    pub fn str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Value::as_str)
    }

    /// Numeric field, `None` when absent or not a number
    pub fn number(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(Value::as_f64)
    }

    /// Timestamp field in any accepted encoding
    pub fn timestamp(&self, name: &str) -> Option<DateTime<Utc>> {
        self.get(name).and_then(parse_timestamp)
    }
}

/// Parse a timestamp value.
///
/// Accepts RFC 3339 strings, `YYYY-MM-DD` dates (midnight UTC), integer epoch
/// milliseconds and `{"seconds": s, "nanoseconds": n}` objects.
pub fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => DateTime::parse_from_rfc3339(s)
            .map(|dt| dt.with_timezone(&Utc))
            .ok()
            .or_else(|| {
                NaiveDate::parse_from_str(s, "%Y-%m-%d")
                    .ok()
                    .and_then(|d| d.and_hms_opt(0, 0, 0))
                    .map(|naive| naive.and_utc())
            }),
        Value::Number(n) => n.as_i64().and_then(DateTime::from_timestamp_millis),
        Value::Object(obj) => {
            let seconds = obj
                .get("seconds")
                .or_else(|| obj.get("_seconds"))
                .and_then(Value::as_i64)?;
            let nanos = obj
                .get("nanoseconds")
                .or_else(|| obj.get("_nanoseconds"))
                .and_then(Value::as_u64)
                .unwrap_or(0);
            DateTime::from_timestamp(seconds, u32::try_from(nanos).ok()?)
        }
        _ => None,
    }
}

/// Encode a timestamp the way the in-memory backend stores it
pub fn timestamp_value(instant: DateTime<Utc>) -> Value {
    Value::String(instant.to_rfc3339())
}

/// Order two field values.
///
/// Numbers compare numerically, values that both read as timestamps compare
/// chronologically, remaining strings lexically. Anything else is
/// incomparable.
pub fn compare_values(a: &Value, b: &Value) -> Option<Ordering> {
    if let (Value::Number(x), Value::Number(y)) = (a, b) {
        return x.as_f64()?.partial_cmp(&y.as_f64()?);
    }
    if let (Some(x), Some(y)) = (parse_timestamp(a), parse_timestamp(b)) {
        return Some(x.cmp(&y));
    }
    match (a, b) {
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        (Value::Bool(x), Value::Bool(y)) => Some(x.cmp(y)),
        _ => None,
    }
}

fn values_equal(a: &Value, b: &Value) -> bool {
    a == b || compare_values(a, b) == Some(Ordering::Equal)
}

/// Filter operators a subscription may request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum FilterOp {
    /// `field == value`
    Eq { value: Value },
    /// `field` not in `values`; documents without the field match
    NotIn { values: Vec<Value> },
    /// `field >= value`
    Gte { value: Value },
}

/// A single-field filter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    pub field: String,
    #[serde(flatten)]
    pub op: FilterOp,
}

impl Filter {
    pub fn eq(field: &str, value: impl Into<Value>) -> Self {
        Self {
            field: field.to_string(),
            op: FilterOp::Eq {
                value: value.into(),
            },
        }
    }

    pub fn not_in<V: Into<Value>>(field: &str, values: impl IntoIterator<Item = V>) -> Self {
        Self {
            field: field.to_string(),
            op: FilterOp::NotIn {
                values: values.into_iter().map(Into::into).collect(),
            },
        }
    }

    pub fn gte(field: &str, value: impl Into<Value>) -> Self {
        Self {
            field: field.to_string(),
            op: FilterOp::Gte {
                value: value.into(),
            },
        }
    }

    /// Operator name as reported in capability errors
    pub fn op_name(&self) -> &'static str {
        match self.op {
            FilterOp::Eq { .. } => "==",
            FilterOp::NotIn { .. } => "not-in",
            FilterOp::Gte { .. } => ">=",
        }
    }

    pub fn matches(&self, doc: &Document) -> bool {
        let field = doc.get(&self.field);
        match (&self.op, field) {
            (FilterOp::Eq { value }, Some(actual)) => values_equal(actual, value),
            (FilterOp::Eq { .. }, None) => false,
            (FilterOp::NotIn { values }, Some(actual)) => {
                !values.iter().any(|v| values_equal(actual, v))
            }
            (FilterOp::NotIn { .. }, None) => true,
            (FilterOp::Gte { value }, Some(actual)) => matches!(
                compare_values(actual, value),
                Some(Ordering::Greater | Ordering::Equal)
            ),
            (FilterOp::Gte { .. }, None) => false,
        }
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Asc,
    Desc,
}

/// Ordering clause. Documents lacking the field are excluded from ordered
/// results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderBy {
    pub field: String,
    pub direction: Direction,
}

/// A live query over one collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionQuery {
    pub collection: String,
    #[serde(default)]
    pub filter: Option<Filter>,
    #[serde(default)]
    pub order_by: Option<OrderBy>,
    #[serde(default)]
    pub limit: Option<usize>,
}

impl CollectionQuery {
    /// Unfiltered query over a whole collection
    pub fn new(collection: &str) -> Self {
        Self {
            collection: collection.to_string(),
            filter: None,
            order_by: None,
            limit: None,
        }
    }

    pub fn filter(mut self, filter: Filter) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn order_by(mut self, field: &str, direction: Direction) -> Self {
        self.order_by = Some(OrderBy {
            field: field.to_string(),
            direction,
        });
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// True when the query has no clauses beyond the collection
    pub fn is_plain(&self) -> bool {
        self.filter.is_none() && self.order_by.is_none() && self.limit.is_none()
    }

    /// The same collection without any clauses
    pub fn unfiltered(&self) -> Self {
        Self::new(&self.collection)
    }

    /// Evaluate the query over documents in arrival order
    pub fn apply(&self, docs: &[Document]) -> Vec<Document> {
        let mut out: Vec<Document> = docs
            .iter()
            .filter(|d| self.filter.as_ref().map_or(true, |f| f.matches(d)))
            .cloned()
            .collect();

        if let Some(order) = &self.order_by {
            out.retain(|d| d.get(&order.field).is_some());
            // sort_by is stable, so ties keep arrival order
            out.sort_by(|a, b| {
                let ord = match (a.get(&order.field), b.get(&order.field)) {
                    (Some(x), Some(y)) => compare_values(x, y).unwrap_or(Ordering::Equal),
                    _ => Ordering::Equal,
                };
                match order.direction {
                    Direction::Asc => ord,
                    Direction::Desc => ord.reverse(),
                }
            });
        }

        if let Some(limit) = self.limit {
            out.truncate(limit);
        }
        out
    }
}

/// Full current view of a subscribed collection
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub collection: String,
    pub docs: Vec<Document>,
}

impl Snapshot {
    pub fn new(collection: &str, docs: Vec<Document>) -> Self {
        Self {
            collection: collection.to_string(),
            docs,
        }
    }

    pub fn size(&self) -> usize {
        self.docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }
}
