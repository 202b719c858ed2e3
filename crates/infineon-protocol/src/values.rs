//! Typed parameter value bag.

use std::collections::BTreeMap;

use crate::schema::{ParamId, ParamKind, Schema};

/// A single parameter value, typed per the descriptor kind.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value {
    Int(i64),
    Float(f64),
}

impl Value {
    pub fn as_f64(self) -> f64 {
        match self {
            Value::Int(v) => v as f64,
            Value::Float(v) => v,
        }
    }
}

/// Current values for every parameter of a schema.
///
/// Seeded from descriptor defaults; `set` normalizes the stored
/// representation to the descriptor kind so an integer parameter never ends
/// up holding a fractional value.
#[derive(Debug, Clone)]
pub struct ParamValues {
    schema: &'static Schema,
    values: BTreeMap<ParamId, Value>,
}

impl PartialEq for ParamValues {
    fn eq(&self, other: &Self) -> bool {
        self.values == other.values
    }
}

impl ParamValues {
    /// A value bag holding every parameter's default.
    pub fn with_defaults(schema: &'static Schema) -> Self {
        let values = ParamId::ALL
            .into_iter()
            .map(|id| (id, schema.descriptor(id).default))
            .collect();
        Self { schema, values }
    }

    pub fn schema(&self) -> &'static Schema {
        self.schema
    }

    /// Current value of `id`. Total: parameters absent from the map fall
    /// back to their default.
    pub fn get(&self, id: ParamId) -> Value {
        self.values
            .get(&id)
            .copied()
            .unwrap_or(self.schema.descriptor(id).default)
    }

    /// Store a value, normalized to the descriptor kind.
    pub fn set(&mut self, id: ParamId, value: Value) {
        let normalized = match self.schema.descriptor(id).kind {
            ParamKind::Integer => Value::Int(value.as_f64().round() as i64),
            ParamKind::Float => Value::Float(value.as_f64()),
        };
        self.values.insert(id, normalized);
    }

    /// The selected controller model index (1-based; 0 is reserved).
    pub fn model_index(&self) -> i64 {
        match self.get(ParamId::ControllerModel) {
            Value::Int(v) => v,
            Value::Float(v) => v.round() as i64,
        }
    }

    /// Iterate all values in stable id order.
    pub fn iter(&self) -> impl Iterator<Item = (ParamId, Value)> {
        ParamId::ALL.into_iter().map(|id| (id, self.get(id)))
    }
}
