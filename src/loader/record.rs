//! Field access on JSON records with errors that name the record.

use serde_json::{Map, Value};

use crate::error::{Error, Result};

/// One object of a record collection.
///
/// Errors raised through a `Record` name the collection, the record (by id
/// once known, by position before that) and the offending field.
pub(crate) struct Record<'a> {
    collection: &'static str,
    label: String,
    fields: &'a Map<String, Value>,
}

impl<'a> Record<'a> {
    /// Wraps the `position`-th element of `collection`.
    pub fn new(collection: &'static str, position: usize, value: &'a Value) -> Result<Self> {
        let label = format!("#{position}");
        let fields = value.as_object().ok_or_else(|| {
            Error::validation(collection, label.clone(), "<record>", "must be an object")
        })?;
        Ok(Self {
            collection,
            label,
            fields,
        })
    }

    /// Reads the `id` field and relabels the record with it.
    pub fn identify(&mut self) -> Result<i64> {
        let id = self.int("id")?;
        self.label = format!("id {id}");
        Ok(id)
    }

    pub fn error(&self, field: &str, reason: impl Into<String>) -> Error {
        Error::validation(self.collection, self.label.clone(), field, reason)
    }

    fn present(&self, field: &str) -> Option<&'a Value> {
        self.fields.get(field).filter(|v| !v.is_null())
    }

    fn required(&self, field: &str) -> Result<&'a Value> {
        self.present(field)
            .ok_or_else(|| self.error(field, "is missing"))
    }

    /// Whether the field is present and not null.
    pub fn has(&self, field: &str) -> bool {
        self.present(field).is_some()
    }

    pub fn int(&self, field: &str) -> Result<i64> {
        self.required(field)?
            .as_i64()
            .ok_or_else(|| self.error(field, "must be an integer"))
    }

    pub fn opt_int(&self, field: &str) -> Result<Option<i64>> {
        match self.present(field) {
            None => Ok(None),
            Some(v) => v
                .as_i64()
                .map(Some)
                .ok_or_else(|| self.error(field, "must be an integer")),
        }
    }

    pub fn string(&self, field: &str) -> Result<String> {
        self.required(field)?
            .as_str()
            .map(str::to_owned)
            .ok_or_else(|| self.error(field, "must be a string"))
    }

    pub fn boolean(&self, field: &str) -> Result<bool> {
        self.required(field)?
            .as_bool()
            .ok_or_else(|| self.error(field, "must be a boolean"))
    }

    /// Required array field.
    pub fn array(&self, field: &str) -> Result<&'a [Value]> {
        self.required(field)?
            .as_array()
            .map(Vec::as_slice)
            .ok_or_else(|| self.error(field, "must be an array"))
    }

    /// Array field that defaults to empty when absent.
    pub fn opt_array(&self, field: &str) -> Result<&'a [Value]> {
        match self.present(field) {
            None => Ok(&[]),
            Some(_) => self.array(field),
        }
    }

    pub fn int_list(&self, field: &str) -> Result<Vec<i64>> {
        self.array(field)?
            .iter()
            .map(|v| {
                v.as_i64()
                    .ok_or_else(|| self.error(field, "must contain only integers"))
            })
            .collect()
    }

    pub fn opt_int_list(&self, field: &str) -> Result<Vec<i64>> {
        match self.present(field) {
            None => Ok(Vec::new()),
            Some(_) => self.int_list(field),
        }
    }
}
