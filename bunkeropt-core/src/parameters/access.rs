//! Dotted-path access to numeric parameters, e.g. `economy.fuel_price`.
//!
//! Drivers that perturb a single input work on a copy: the bundle is
//! serialised to a [`toml::Value`], the addressed leaf is replaced and the
//! result deserialised back, so the usual field types and defaults apply.

use super::Parameters;
use crate::errors::{BunkerError, BunkerResult};

impl Parameters {
    /// Read a numeric parameter by dotted path.
    pub fn get_value(&self, path: &str) -> BunkerResult<f64> {
        let root = toml::Value::try_from(self)?;
        let leaf = lookup(&root, path)?;
        as_number(leaf).ok_or_else(|| BunkerError::NonNumericParameter {
            path: path.to_string(),
            found: leaf.type_str().to_string(),
        })
    }

    /// Copy of the bundle with the parameter at `path` replaced by `value`.
    ///
    /// Integer fields keep their type; the value is rounded to the nearest integer.
    pub fn with_value(&self, path: &str, value: f64) -> BunkerResult<Parameters> {
        let mut root = toml::Value::try_from(self)?;
        let leaf = lookup_mut(&mut root, path)?;
        *leaf = match leaf {
            toml::Value::Integer(_) => toml::Value::Integer(value.round() as i64),
            toml::Value::Float(_) => toml::Value::Float(value),
            other => {
                return Err(BunkerError::NonNumericParameter {
                    path: path.to_string(),
                    found: other.type_str().to_string(),
                })
            }
        };
        Ok(root.try_into::<Parameters>()?)
    }
}

fn lookup<'a>(root: &'a toml::Value, path: &str) -> BunkerResult<&'a toml::Value> {
    let mut current = root;
    for segment in path.split('.') {
        let next = match current {
            toml::Value::Table(table) => table.get(segment),
            toml::Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
            _ => None,
        };
        current = next.ok_or_else(|| BunkerError::UnknownParameter(path.to_string()))?;
    }
    Ok(current)
}

fn lookup_mut<'a>(root: &'a mut toml::Value, path: &str) -> BunkerResult<&'a mut toml::Value> {
    let mut current = root;
    for segment in path.split('.') {
        let next = match current {
            toml::Value::Table(table) => table.get_mut(segment),
            toml::Value::Array(items) => segment
                .parse::<usize>()
                .ok()
                .and_then(move |i| items.get_mut(i)),
            _ => None,
        };
        current = next.ok_or_else(|| BunkerError::UnknownParameter(path.to_string()))?;
    }
    Ok(current)
}

fn as_number(value: &toml::Value) -> Option<f64> {
    match value {
        toml::Value::Integer(i) => Some(*i as f64),
        toml::Value::Float(f) => Some(*f),
        _ => None,
    }
}
