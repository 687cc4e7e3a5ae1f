// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Command parameters and their binding to named arguments.

use serde_json::{Map, Value};

use crate::error::CommandError;
use crate::types::ToggleMode;

/// Parameters supplied with a command, by shape.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Params {
    /// No parameters.
    #[default]
    None,
    /// A single value.
    Scalar(Value),
    /// Positional values.
    List(Vec<Value>),
    /// Named values.
    Map(Map<String, Value>),
}

impl From<Value> for Params {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Self::None,
            Value::Array(items) => Self::List(items),
            Value::Object(map) => Self::Map(map),
            other => Self::Scalar(other),
        }
    }
}

impl From<Option<Value>> for Params {
    fn from(value: Option<Value>) -> Self {
        value.map_or(Self::None, Self::from)
    }
}

impl Params {
    /// Returns `true` if no parameters were supplied.
    #[must_use]
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    /// Looks up a named value. A scalar answers to any name.
    #[must_use]
    pub fn named(&self, name: &str) -> Option<&Value> {
        match self {
            Self::Map(map) => map.get(name),
            Self::Scalar(value) => Some(value),
            Self::None | Self::List(_) => None,
        }
    }

    /// Binds the parameters to a handler's argument names.
    ///
    /// Zero-argument handlers ignore whatever was supplied. Otherwise lists
    /// bind positionally, maps by name and a scalar binds to a single
    /// argument; the count has to match exactly.
    ///
    /// # Errors
    ///
    /// Returns `CommandError::ArityMismatch` or `CommandError::MissingArgument`
    /// when the shape does not fit.
    ///
    /// # Examples
    ///
    /// ```
    /// use serde_json::json;
    /// use trinnov_bridge::command::Params;
    ///
    /// let params = Params::from(json!({"mode": 2}));
    /// let args = params.bind("mute", &["mode"]).unwrap();
    /// assert_eq!(args.get(0).unwrap(), &json!(2));
    ///
    /// assert!(Params::from(json!([1, 2])).bind("mute", &["mode"]).is_err());
    /// ```
    pub fn bind(self, command: &str, names: &'static [&'static str]) -> Result<BoundArgs, CommandError> {
        let arity_mismatch = |actual| CommandError::ArityMismatch {
            command: command.to_string(),
            expected: names.len(),
            actual,
        };

        let values = match (names.len(), self) {
            (0, _) => Vec::new(),
            (_, Self::None) => {
                return Err(CommandError::MissingArgument {
                    command: command.to_string(),
                    name: names[0].to_string(),
                });
            }
            (1, Self::Scalar(value)) => vec![value],
            (_, Self::Scalar(_)) => return Err(arity_mismatch(1)),
            (n, Self::List(items)) => {
                if items.len() != n {
                    return Err(arity_mismatch(items.len()));
                }
                items
            }
            (n, Self::Map(mut map)) => {
                if map.len() > n {
                    return Err(arity_mismatch(map.len()));
                }
                names
                    .iter()
                    .map(|name| {
                        map.remove(*name).ok_or_else(|| CommandError::MissingArgument {
                            command: command.to_string(),
                            name: (*name).to_string(),
                        })
                    })
                    .collect::<Result<_, _>>()?
            }
        };

        Ok(BoundArgs {
            command: command.to_string(),
            names,
            values,
        })
    }
}

/// Arguments bound to a handler, with typed accessors.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundArgs {
    command: String,
    names: &'static [&'static str],
    values: Vec<Value>,
}

impl BoundArgs {
    /// Returns the raw value at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    /// Returns the number of bound values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` if nothing was bound.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    fn invalid(&self, index: usize, message: impl Into<String>) -> CommandError {
        CommandError::InvalidArgument {
            command: self.command.clone(),
            name: self.names.get(index).copied().unwrap_or("?").to_string(),
            message: message.into(),
        }
    }

    fn value(&self, index: usize) -> Result<&Value, CommandError> {
        self.values
            .get(index)
            .ok_or_else(|| self.invalid(index, "missing"))
    }

    /// Reads a number, accepting numeric strings.
    ///
    /// # Errors
    ///
    /// Returns `CommandError::InvalidArgument` for anything else.
    pub fn number(&self, index: usize) -> Result<f64, CommandError> {
        let value = self.value(index)?;
        let number = match value {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        };
        number
            .filter(|n| n.is_finite())
            .ok_or_else(|| self.invalid(index, format!("expected a number, got {value}")))
    }

    /// Reads a non-negative integer, accepting numeric strings.
    ///
    /// # Errors
    ///
    /// Returns `CommandError::InvalidArgument` for anything else.
    pub fn index(&self, index: usize) -> Result<u32, CommandError> {
        let value = self.value(index)?;
        let number = match value {
            Value::Number(n) => n.as_u64(),
            Value::String(s) => s.trim().parse::<u64>().ok(),
            _ => None,
        };
        number
            .and_then(|n| u32::try_from(n).ok())
            .ok_or_else(|| self.invalid(index, format!("expected an index, got {value}")))
    }

    /// Reads a string, rendering numbers as text.
    ///
    /// # Errors
    ///
    /// Returns `CommandError::InvalidArgument` for other shapes.
    pub fn text(&self, index: usize) -> Result<String, CommandError> {
        match self.value(index)? {
            Value::String(s) if !s.is_empty() => Ok(s.clone()),
            Value::Number(n) => Ok(n.to_string()),
            other => Err(self.invalid(index, format!("expected a string, got {other}"))),
        }
    }

    /// Reads a toggle mode from 0/1/2 or off/on/toggle.
    ///
    /// # Errors
    ///
    /// Returns `CommandError::InvalidArgument` for anything else.
    pub fn toggle(&self, index: usize) -> Result<ToggleMode, CommandError> {
        let value = self.value(index)?;
        let mode = match value {
            Value::Number(n) => n.as_u64().and_then(|n| ToggleMode::from_num(n).ok()),
            Value::String(s) => s.parse().ok(),
            Value::Bool(b) => Some(ToggleMode::from(*b)),
            _ => None,
        };
        mode.ok_or_else(|| self.invalid(index, format!("expected 0, 1 or 2, got {value}")))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn shapes_from_json() {
        assert_eq!(Params::from(json!(null)), Params::None);
        assert_eq!(Params::from(json!(3)), Params::Scalar(json!(3)));
        assert!(matches!(Params::from(json!([1])), Params::List(_)));
        assert!(matches!(Params::from(json!({"a": 1})), Params::Map(_)));
        assert_eq!(Params::from(None), Params::None);
    }

    #[test]
    fn zero_arity_ignores_params() {
        let args = Params::from(json!({"junk": true})).bind("back", &[]).unwrap();
        assert!(args.is_empty());
    }

    #[test]
    fn scalar_binds_single_argument_only() {
        assert_eq!(Params::Scalar(json!(1)).bind("mute", &["mode"]).unwrap().len(), 1);
        assert_eq!(
            Params::Scalar(json!(1)).bind("pair", &["a", "b"]),
            Err(CommandError::ArityMismatch {
                command: "pair".into(),
                expected: 2,
                actual: 1
            })
        );
    }

    #[test]
    fn list_binds_positionally() {
        let args = Params::from(json!([1, "x"])).bind("pair", &["a", "b"]).unwrap();
        assert_eq!(args.get(1), Some(&json!("x")));
        assert!(Params::from(json!([1])).bind("pair", &["a", "b"]).is_err());
    }

    #[test]
    fn map_binds_by_name() {
        let args = Params::from(json!({"b": 2, "a": 1}))
            .bind("pair", &["a", "b"])
            .unwrap();
        assert_eq!(args.get(0), Some(&json!(1)));
        assert_eq!(args.get(1), Some(&json!(2)));

        assert_eq!(
            Params::from(json!({"a": 1, "c": 3})).bind("pair", &["a", "b"]),
            Err(CommandError::MissingArgument {
                command: "pair".into(),
                name: "b".into()
            })
        );
        assert!(
            Params::from(json!({"a": 1, "b": 2, "c": 3}))
                .bind("pair", &["a", "b"])
                .is_err()
        );
    }

    #[test]
    fn missing_params_for_non_zero_arity() {
        assert!(matches!(
            Params::None.bind("volume", &["db"]),
            Err(CommandError::MissingArgument { .. })
        ));
    }

    #[test]
    fn typed_accessors() {
        let args = Params::from(json!(["-12.5", 3, "toggle", "dts"]))
            .bind("all", &["n", "i", "t", "s"])
            .unwrap();
        assert!((args.number(0).unwrap() + 12.5).abs() < f64::EPSILON);
        assert_eq!(args.index(1).unwrap(), 3);
        assert_eq!(args.toggle(2).unwrap(), ToggleMode::Toggle);
        assert_eq!(args.text(3).unwrap(), "dts");
        assert!(args.index(0).is_err());
        assert!(args.toggle(3).is_err());
    }

    #[test]
    fn named_lookup() {
        let params = Params::from(json!({"source": "HDMI2"}));
        assert_eq!(params.named("source"), Some(&json!("HDMI2")));
        assert_eq!(params.named("mode"), None);
        assert_eq!(Params::from(json!(40)).named("volume"), Some(&json!(40)));
        assert_eq!(Params::None.named("volume"), None);
    }
}
