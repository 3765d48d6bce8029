use std::str::FromStr;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failure reading a posted body parameter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParamError {
    #[error("Request missing required body param: {name}")]
    Missing { name: String },

    #[error("Invalid value for body param {name}: '{value}'")]
    Invalid { name: String, value: String },
}

/// Posted form fields in submission order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BodyParams(IndexMap<String, String>);

impl BodyParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.insert(name.into(), value.into());
    }

    /// Raw value of `name`, if it was posted.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    /// Trimmed value of `name`; blank values count as absent.
    pub fn get_trimmed(&self, name: &str) -> Option<&str> {
        self.get(name).map(str::trim).filter(|value| !value.is_empty())
    }

    /// Value of `name`, failing when it was not posted at all.
    pub fn required(&self, name: &str) -> Result<&str, ParamError> {
        self.get(name).ok_or_else(|| ParamError::Missing { name: name.to_string() })
    }

    /// Parse an optional parameter; blank counts as absent.
    pub fn parse<T: FromStr>(&self, name: &str) -> Result<Option<T>, ParamError> {
        self.get_trimmed(name)
            .map(|value| parse_value(name, value))
            .transpose()
    }

    /// Parse a required parameter.
    pub fn parse_required<T: FromStr>(&self, name: &str) -> Result<T, ParamError> {
        parse_value(name, self.required(name)?.trim())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

fn parse_value<T: FromStr>(name: &str, value: &str) -> Result<T, ParamError> {
    value.parse().map_err(|_| ParamError::Invalid {
        name: name.to_string(),
        value: value.to_string(),
    })
}

impl FromIterator<(String, String)> for BodyParams {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
