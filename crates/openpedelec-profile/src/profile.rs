//! Profile type, `.asv` text codec and edit transactions.

use std::path::{Path, PathBuf};

use pedelec_infineon_protocol::{
    ParamId, ParamKind, ParamValues, Value, catalog, eb3,
};

use crate::error::FormatError;

/// A named set of parameter values, optionally backed by an `.asv` file.
///
/// The description is always the file stem of the backing file; profiles
/// that were never saved carry the description they were created with.
#[derive(Debug, Clone)]
pub struct Profile {
    pub(crate) values: ParamValues,
    pub(crate) path: Option<PathBuf>,
    pub(crate) description: String,
}

impl Profile {
    /// A new profile holding schema defaults, not yet persisted.
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            values: ParamValues::with_defaults(eb3()),
            path: None,
            description: description.into(),
        }
    }

    /// Parse `.asv` text: one value per load-order parameter, in order.
    ///
    /// Leading/trailing whitespace is stripped and anything from the first
    /// `:` onward is ignored, so vendor files with trailing comments load
    /// unchanged.
    ///
    /// # Errors
    ///
    /// Fails when a value does not parse as its parameter's kind, when a
    /// non-empty line remains after the last parameter, or when the file
    /// has fewer value lines than the schema has parameters.
    pub fn parse(description: impl Into<String>, text: &str) -> Result<Self, FormatError> {
        let schema = eb3();
        let order = schema.load_order();
        let mut values = ParamValues::with_defaults(schema);
        let mut seen = 0usize;

        for (idx, raw_line) in text.lines().enumerate() {
            let mut field = raw_line.trim();
            if let Some(colon) = field.find(':') {
                field = field[..colon].trim_end();
            }

            if let Some(id) = order.get(idx) {
                values.set(*id, parse_field(*id, field, idx + 1)?);
                seen += 1;
            } else if !field.is_empty() {
                return Err(FormatError::ExtraData(field.to_string()));
            }
        }

        if seen < order.len() {
            return Err(FormatError::MissingLines {
                expected: order.len(),
                actual: seen,
            });
        }

        Ok(Self {
            values,
            path: None,
            description: description.into(),
        })
    }

    /// Render the profile as `.asv` lines, each terminated with a carriage
    /// return. The persisted format uses CR+LF records regardless of host
    /// convention.
    pub fn serialize(&self) -> Vec<String> {
        eb3()
            .load_order()
            .iter()
            .map(|id| {
                let desc = id.descriptor();
                let value = self.values.get(*id);
                let mut line = match desc.kind {
                    ParamKind::Integer => format!("{}", value.as_f64().round() as i64),
                    ParamKind::Float => {
                        format!("{:.*}", desc.precision as usize, value.as_f64())
                    }
                };
                line.push('\r');
                line
            })
            .collect()
    }

    /// Current parameter values.
    pub fn values(&self) -> &ParamValues {
        &self.values
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Backing file, if the profile was ever saved or loaded.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Display name of the selected controller model (`"???"` when the
    /// index is out of range).
    pub fn model_name(&self) -> &'static str {
        catalog().model_name(self.values.model_index())
    }

    /// An unsaved copy of this profile with a derived description.
    pub fn duplicate(&self) -> Self {
        Self {
            values: self.values.clone(),
            path: None,
            description: format!("{} copy", self.description),
        }
    }

    /// Open an edit transaction. Changes accumulate in a scratch copy and
    /// reach the profile only on [`EditSession::commit`].
    pub fn edit(&mut self) -> EditSession<'_> {
        let scratch = self.values.clone();
        EditSession {
            profile: self,
            scratch,
        }
    }
}

fn parse_field(id: ParamId, field: &str, line: usize) -> Result<Value, FormatError> {
    let desc = id.descriptor();
    match desc.kind {
        ParamKind::Integer => field.parse::<i64>().map(Value::Int).map_err(|_| {
            FormatError::BadNumber {
                line,
                text: field.to_string(),
                kind: "an integer",
            }
        }),
        ParamKind::Float => field.parse::<f64>().map(Value::Float).map_err(|_| {
            FormatError::BadNumber {
                line,
                text: field.to_string(),
                kind: "a number",
            }
        }),
    }
}

/// Two-phase edit transaction over a profile.
///
/// Holds a scratch copy of the values; the borrow on the profile prevents
/// any aliased mutation while the session is open. Dropping the session
/// discards the scratch copy.
#[derive(Debug)]
pub struct EditSession<'p> {
    profile: &'p mut Profile,
    scratch: ParamValues,
}

impl EditSession<'_> {
    pub fn get(&self, id: ParamId) -> Value {
        self.scratch.get(id)
    }

    /// Stage a value and report which parameters' cached display values
    /// must be recomputed because they depend on `id`.
    pub fn set(&mut self, id: ParamId, value: Value) -> Vec<ParamId> {
        self.scratch.set(id, value);
        eb3().dependents_of(id).collect()
    }

    /// Merge the staged values into the profile.
    pub fn commit(self) {
        self.profile.values = self.scratch;
    }

    /// Drop the staged values, leaving the profile untouched.
    pub fn discard(self) {}
}
