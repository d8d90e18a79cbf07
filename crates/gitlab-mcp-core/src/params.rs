//! Tool argument extraction.
//!
//! Tool calls arrive with an untyped JSON object of arguments. These helpers
//! turn that object into typed values with one shared set of validation
//! rules, so every handler reports bad input the same way.
//!
//! JSON has a single number type, so clients send integers as `42`, `42.0`
//! or `"42"` interchangeably. [`optional_integer`] accepts all three; the
//! generic [`required_value`] / [`optional_value`] family is strict about
//! the JSON kind and is meant for strings, booleans and raw numbers.
//!
//! # Example
//!
//! ```
//! use gitlab_mcp_core::params::{self, Arguments};
//! use serde_json::json;
//!
//! let args: Arguments = json!({"projectId": "42", "page": 2.0})
//!     .as_object()
//!     .cloned()
//!     .unwrap_or_default();
//!
//! let project: String = params::required_value(&args, "projectId").unwrap();
//! let pagination = params::pagination_params(&args).unwrap();
//! assert_eq!(project, "42");
//! assert_eq!(pagination.page, 2);
//! ```

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::ParamError;

/// Untyped tool arguments as decoded from a `tools/call` request.
pub type Arguments = Map<String, Value>;

/// Default number of items per page when `per_page` is absent or invalid.
pub const DEFAULT_PAGE_SIZE: i64 = 30;

/// Largest page size the GitLab API accepts.
pub const MAX_PAGE_SIZE: i64 = 100;

/// A value that can be read directly out of a JSON argument.
///
/// `Default` supplies the zero value returned for absent optional
/// parameters and rejected for required ones.
pub trait ParamType: Sized + Default + PartialEq {
    /// Name used in type mismatch messages.
    const TYPE_NAME: &'static str;

    /// Convert without coercion; `None` means the JSON kind does not match.
    fn from_value(value: &Value) -> Option<Self>;
}

impl ParamType for String {
    const TYPE_NAME: &'static str = "string";

    fn from_value(value: &Value) -> Option<Self> {
        value.as_str().map(str::to_string)
    }
}

impl ParamType for f64 {
    const TYPE_NAME: &'static str = "number";

    fn from_value(value: &Value) -> Option<Self> {
        value.as_f64()
    }
}

impl ParamType for i64 {
    const TYPE_NAME: &'static str = "integer";

    fn from_value(value: &Value) -> Option<Self> {
        value.as_i64()
    }
}

impl ParamType for u64 {
    const TYPE_NAME: &'static str = "unsigned integer";

    fn from_value(value: &Value) -> Option<Self> {
        value.as_u64()
    }
}

impl ParamType for bool {
    const TYPE_NAME: &'static str = "boolean";

    fn from_value(value: &Value) -> Option<Self> {
        value.as_bool()
    }
}

/// JSON kind of a value, for error messages.
pub fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn convert<T: ParamType>(name: &str, value: &Value) -> Result<T, ParamError> {
    T::from_value(value).ok_or_else(|| ParamError::TypeMismatch {
        name: name.to_string(),
        expected: T::TYPE_NAME,
        actual: value_kind(value),
    })
}

/// Read a parameter that must be present, of type `T`, and not `T`'s zero value.
pub fn required_value<T: ParamType>(args: &Arguments, name: &str) -> Result<T, ParamError> {
    let value = args
        .get(name)
        .ok_or_else(|| ParamError::MissingParameter(name.to_string()))?;

    let typed: T = convert(name, value)?;
    if typed == T::default() {
        return Err(ParamError::EmptyValue(name.to_string()));
    }
    Ok(typed)
}

/// Read an optional parameter, yielding `T::default()` when absent.
///
/// Explicit zero values (`""`, `0`) are returned as given.
pub fn optional_value<T: ParamType>(args: &Arguments, name: &str) -> Result<T, ParamError> {
    Ok(optional_value_presence(args, name)?.unwrap_or_default())
}

/// Like [`optional_value`], but tells "absent" apart from "present with the zero value".
///
/// `Ok(None)` means the key was absent. An `Err` is only possible when the
/// key was present.
pub fn optional_value_presence<T: ParamType>(
    args: &Arguments,
    name: &str,
) -> Result<Option<T>, ParamError> {
    match args.get(name) {
        None => Ok(None),
        Some(value) => convert(name, value).map(Some),
    }
}

/// Read an optional integer, accepting whole floats, native integers and integer strings.
///
/// Absent keys and empty strings yield `0`.
pub fn optional_integer(args: &Arguments, name: &str) -> Result<i64, ParamError> {
    let Some(value) = args.get(name) else {
        return Ok(0);
    };

    match value {
        Value::Number(number) => {
            if let Some(int) = number.as_i64() {
                return Ok(int);
            }
            match number.as_f64() {
                Some(float) if float.fract() != 0.0 => Err(ParamError::NotWholeNumber {
                    name: name.to_string(),
                    value: float,
                }),
                Some(float) if float >= i64::MIN as f64 && float < i64::MAX as f64 => {
                    Ok(float as i64)
                }
                _ => Err(ParamError::NotConvertible {
                    name: name.to_string(),
                    actual: "out-of-range number",
                }),
            }
        }
        Value::String(s) if s.is_empty() => Ok(0),
        Value::String(s) => s.parse::<i64>().map_err(|_| ParamError::InvalidInteger {
            name: name.to_string(),
            value: s.clone(),
        }),
        other => Err(ParamError::NotConvertible {
            name: name.to_string(),
            actual: value_kind(other),
        }),
    }
}

/// [`optional_integer`] with a fallback.
///
/// An explicit `0` is indistinguishable from an absent key and also yields
/// `default`. Use [`optional_value_presence`] where `0` is meaningful.
pub fn optional_integer_with_default(
    args: &Arguments,
    name: &str,
    default: i64,
) -> Result<i64, ParamError> {
    let value = optional_integer(args, name)?;
    Ok(if value == 0 { default } else { value })
}

/// Read an optional boolean flag.
///
/// `None` means the caller did not specify the flag (absent or `null`).
/// Strings are accepted case-insensitively: `true/1/t/yes/y` and
/// `false/0/f/no/n`.
pub fn optional_boolean(args: &Arguments, name: &str) -> Result<Option<bool>, ParamError> {
    match args.get(name) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Bool(b)) => Ok(Some(*b)),
        Some(Value::String(s)) => match s.to_ascii_lowercase().as_str() {
            "true" | "1" | "t" | "yes" | "y" => Ok(Some(true)),
            "false" | "0" | "f" | "no" | "n" => Ok(Some(false)),
            _ => Err(ParamError::NotBoolean {
                name: name.to_string(),
                actual: format!("'{}'", s),
            }),
        },
        Some(other) => Err(ParamError::NotBoolean {
            name: name.to_string(),
            actual: value_kind(other).to_string(),
        }),
    }
}

/// Read an optional RFC 3339 timestamp. Absent keys and empty strings yield `None`.
pub fn optional_timestamp(
    args: &Arguments,
    name: &str,
) -> Result<Option<DateTime<Utc>>, ParamError> {
    let raw: String = optional_value(args, name)?;
    if raw.is_empty() {
        return Ok(None);
    }

    DateTime::parse_from_rfc3339(&raw)
        .map(|ts| Some(ts.with_timezone(&Utc)))
        .map_err(|_| ParamError::InvalidTimestamp {
            name: name.to_string(),
            value: raw,
        })
}

/// Page selection for list endpoints. Serializes to the `page` and
/// `per_page` query parameters GitLab expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Pagination {
    /// 1-based page number
    pub page: i64,
    /// Items per page, within `1..=MAX_PAGE_SIZE`
    pub per_page: i64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: DEFAULT_PAGE_SIZE,
        }
    }
}

/// Read `page` and `per_page` (or `perPage`), clamped to the API limits.
///
/// Out-of-range values are corrected silently: `page < 1` becomes 1,
/// `per_page < 1` becomes [`DEFAULT_PAGE_SIZE`] and anything above
/// [`MAX_PAGE_SIZE`] is capped. Values of the wrong type are errors.
pub fn pagination_params(args: &Arguments) -> Result<Pagination, ParamError> {
    let wrap = |name: &str| {
        let name = name.to_string();
        move |source: ParamError| ParamError::InvalidPagination {
            name,
            source: Box::new(source),
        }
    };

    let page = optional_integer_with_default(args, "page", 1).map_err(wrap("page"))?;

    let per_page_key = if args.contains_key("per_page") || !args.contains_key("perPage") {
        "per_page"
    } else {
        "perPage"
    };
    let per_page = optional_integer_with_default(args, per_page_key, DEFAULT_PAGE_SIZE)
        .map_err(wrap(per_page_key))?;

    Ok(Pagination {
        page: page.max(1),
        per_page: if per_page < 1 {
            DEFAULT_PAGE_SIZE
        } else {
            per_page.min(MAX_PAGE_SIZE)
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn args(value: Value) -> Arguments {
        value.as_object().cloned().unwrap_or_default()
    }

    #[test]
    fn test_required_value_string() {
        let value: String = required_value(&args(json!({"x": "v"})), "x").unwrap();
        assert_eq!(value, "v");
    }

    #[test]
    fn test_required_value_missing() {
        let err = required_value::<String>(&args(json!({})), "x").unwrap_err();
        assert_eq!(err, ParamError::MissingParameter("x".into()));
        assert!(err.to_string().contains("missing required parameter"));
    }

    #[test]
    fn test_required_value_type_mismatch() {
        let err = required_value::<String>(&args(json!({"x": 5})), "x").unwrap_err();
        assert!(matches!(
            err,
            ParamError::TypeMismatch {
                expected: "string",
                actual: "number",
                ..
            }
        ));
        assert!(err
            .to_string()
            .contains("not of expected type string, got number"));
    }

    #[test]
    fn test_required_value_empty() {
        let err = required_value::<String>(&args(json!({"x": ""})), "x").unwrap_err();
        assert_eq!(err, ParamError::EmptyValue("x".into()));
        assert!(err.to_string().contains("cannot be empty or zero value"));

        let err = required_value::<f64>(&args(json!({"n": 0.0})), "n").unwrap_err();
        assert_eq!(err, ParamError::EmptyValue("n".into()));
    }

    #[test]
    fn test_required_value_number() {
        let value: f64 = required_value(&args(json!({"iid": 123})), "iid").unwrap();
        assert_eq!(value, 123.0);

        let value: f64 = required_value(&args(json!({"iid": 7.5})), "iid").unwrap();
        assert_eq!(value, 7.5);
    }

    #[test]
    fn test_required_value_integer_is_strict() {
        let value: i64 = required_value(&args(json!({"n": 9})), "n").unwrap();
        assert_eq!(value, 9);

        let err = required_value::<i64>(&args(json!({"n": 9.0})), "n").unwrap_err();
        assert!(matches!(err, ParamError::TypeMismatch { .. }));
    }

    #[test]
    fn test_optional_value() {
        let value: String = optional_value(&args(json!({"s": "open"})), "s").unwrap();
        assert_eq!(value, "open");

        let value: String = optional_value(&args(json!({})), "s").unwrap();
        assert_eq!(value, "");

        let value: i64 = optional_value(&args(json!({})), "n").unwrap();
        assert_eq!(value, 0);

        // Explicit zero values are fine for optional parameters
        let value: String = optional_value(&args(json!({"s": ""})), "s").unwrap();
        assert_eq!(value, "");

        let err = optional_value::<String>(&args(json!({"s": 123})), "s").unwrap_err();
        assert!(err
            .to_string()
            .contains("not of expected type string, got number"));
    }

    #[test]
    fn test_optional_value_presence() {
        let a = args(json!({"s": "value1", "empty": "", "wrong": 123}));

        assert_eq!(
            optional_value_presence::<String>(&a, "s").unwrap(),
            Some("value1".to_string())
        );
        assert_eq!(optional_value_presence::<String>(&a, "missing").unwrap(), None);
        assert_eq!(optional_value_presence::<i64>(&a, "missing").unwrap(), None);
        assert_eq!(
            optional_value_presence::<String>(&a, "empty").unwrap(),
            Some(String::new())
        );
        // Errors only arise for keys that were present
        assert!(optional_value_presence::<String>(&a, "wrong").is_err());
    }

    #[test]
    fn test_optional_integer() {
        let a = args(json!({
            "float": 42.0,
            "string": "123",
            "int": 55,
            "empty": "",
            "bool": true,
            "fraction": 42.5,
            "garbage": "abc",
            "negative": -7,
        }));

        assert_eq!(optional_integer(&a, "float").unwrap(), 42);
        assert_eq!(optional_integer(&a, "string").unwrap(), 123);
        assert_eq!(optional_integer(&a, "int").unwrap(), 55);
        assert_eq!(optional_integer(&a, "negative").unwrap(), -7);
        assert_eq!(optional_integer(&a, "missing").unwrap(), 0);
        assert_eq!(optional_integer(&a, "empty").unwrap(), 0);

        let err = optional_integer(&a, "bool").unwrap_err();
        assert!(err.to_string().contains("must be convertible to an integer"));

        let err = optional_integer(&a, "fraction").unwrap_err();
        assert!(matches!(err, ParamError::NotWholeNumber { .. }));
        assert!(err.to_string().contains("must be a whole number"));

        let err = optional_integer(&a, "garbage").unwrap_err();
        assert!(err.to_string().contains("must be a valid integer string"));
    }

    #[test]
    fn test_optional_integer_rejects_null() {
        let err = optional_integer(&args(json!({"n": null})), "n").unwrap_err();
        assert_eq!(
            err,
            ParamError::NotConvertible {
                name: "n".into(),
                actual: "null"
            }
        );
    }

    #[test]
    fn test_optional_integer_with_default() {
        let a = args(json!({
            "float": 42.0,
            "string": "123",
            "empty": "",
            "zero": 0.0,
            "bool": true,
            "garbage": "abc",
        }));

        assert_eq!(optional_integer_with_default(&a, "float", 10).unwrap(), 42);
        assert_eq!(optional_integer_with_default(&a, "string", 10).unwrap(), 123);
        assert_eq!(optional_integer_with_default(&a, "missing", 10).unwrap(), 10);
        assert_eq!(optional_integer_with_default(&a, "empty", 10).unwrap(), 10);
        // Explicit zero falls back to the default as well
        assert_eq!(optional_integer_with_default(&a, "zero", 10).unwrap(), 10);

        assert!(optional_integer_with_default(&a, "bool", 10)
            .unwrap_err()
            .to_string()
            .contains("must be convertible to an integer"));
        assert!(optional_integer_with_default(&a, "garbage", 10)
            .unwrap_err()
            .to_string()
            .contains("must be a valid integer string"));
    }

    #[test]
    fn test_optional_boolean() {
        let a = args(json!({
            "native_true": true,
            "native_false": false,
            "null": null,
            "yes": "YES",
            "one": "1",
            "t": "T",
            "no": "No",
            "zero": "0",
            "f": "f",
            "maybe": "maybe",
            "number": 1,
        }));

        assert_eq!(optional_boolean(&a, "missing").unwrap(), None);
        assert_eq!(optional_boolean(&a, "null").unwrap(), None);
        assert_eq!(optional_boolean(&a, "native_true").unwrap(), Some(true));
        assert_eq!(optional_boolean(&a, "native_false").unwrap(), Some(false));
        assert_eq!(optional_boolean(&a, "yes").unwrap(), Some(true));
        assert_eq!(optional_boolean(&a, "one").unwrap(), Some(true));
        assert_eq!(optional_boolean(&a, "t").unwrap(), Some(true));
        assert_eq!(optional_boolean(&a, "no").unwrap(), Some(false));
        assert_eq!(optional_boolean(&a, "zero").unwrap(), Some(false));
        assert_eq!(optional_boolean(&a, "f").unwrap(), Some(false));

        let err = optional_boolean(&a, "maybe").unwrap_err();
        assert!(matches!(err, ParamError::NotBoolean { .. }));
        assert!(err.to_string().contains("'maybe'"));

        assert!(matches!(
            optional_boolean(&a, "number").unwrap_err(),
            ParamError::NotBoolean { .. }
        ));
    }

    #[test]
    fn test_optional_timestamp() {
        let a = args(json!({
            "utc": "2024-01-15T10:30:00Z",
            "offset": "2024-01-15T12:30:00+02:00",
            "empty": "",
            "bad": "yesterday",
            "number": 1700000000,
        }));

        let utc = optional_timestamp(&a, "utc").unwrap().unwrap();
        assert_eq!(utc.to_rfc3339(), "2024-01-15T10:30:00+00:00");

        // Offsets are normalized to UTC
        let offset = optional_timestamp(&a, "offset").unwrap().unwrap();
        assert_eq!(offset, utc);

        assert_eq!(optional_timestamp(&a, "missing").unwrap(), None);
        assert_eq!(optional_timestamp(&a, "empty").unwrap(), None);

        let err = optional_timestamp(&a, "bad").unwrap_err();
        assert_eq!(
            err,
            ParamError::InvalidTimestamp {
                name: "bad".into(),
                value: "yesterday".into()
            }
        );

        assert!(matches!(
            optional_timestamp(&a, "number").unwrap_err(),
            ParamError::TypeMismatch { .. }
        ));
    }

    #[test]
    fn test_pagination_defaults() {
        let pagination = pagination_params(&args(json!({}))).unwrap();
        assert_eq!(pagination, Pagination::default());
        assert_eq!(pagination.page, 1);
        assert_eq!(pagination.per_page, DEFAULT_PAGE_SIZE);
    }

    #[test]
    fn test_pagination_values() {
        let p = pagination_params(&args(json!({"page": 5.0}))).unwrap();
        assert_eq!((p.page, p.per_page), (5, DEFAULT_PAGE_SIZE));

        let p = pagination_params(&args(json!({"page": "3"}))).unwrap();
        assert_eq!(p.page, 3);

        let p = pagination_params(&args(json!({"per_page": 50}))).unwrap();
        assert_eq!((p.page, p.per_page), (1, 50));

        let p = pagination_params(&args(json!({"page": 2, "per_page": "15"}))).unwrap();
        assert_eq!((p.page, p.per_page), (2, 15));
    }

    #[test]
    fn test_pagination_camel_case_key() {
        let p = pagination_params(&args(json!({"perPage": 40}))).unwrap();
        assert_eq!(p.per_page, 40);

        // snake_case wins when both are sent
        let p = pagination_params(&args(json!({"per_page": 10, "perPage": 40}))).unwrap();
        assert_eq!(p.per_page, 10);
    }

    #[test]
    fn test_pagination_clamping() {
        let p = pagination_params(&args(json!({"page": -5, "per_page": 0}))).unwrap();
        assert_eq!((p.page, p.per_page), (1, DEFAULT_PAGE_SIZE));

        let p = pagination_params(&args(json!({"page": 0}))).unwrap();
        assert_eq!(p.page, 1);

        let p = pagination_params(&args(json!({"per_page": -10}))).unwrap();
        assert_eq!(p.per_page, DEFAULT_PAGE_SIZE);

        let p = pagination_params(&args(json!({"per_page": MAX_PAGE_SIZE + 50}))).unwrap();
        assert_eq!(p.per_page, MAX_PAGE_SIZE);
    }

    #[test]
    fn test_pagination_errors() {
        let err = pagination_params(&args(json!({"page": true}))).unwrap_err();
        assert!(err.to_string().contains(
            "invalid 'page' parameter: parameter 'page' must be convertible to an integer"
        ));

        let err = pagination_params(&args(json!({"per_page": "invalid"}))).unwrap_err();
        assert!(err.to_string().contains(
            "invalid 'per_page' parameter: parameter 'per_page' must be a valid integer string"
        ));

        let err = pagination_params(&args(json!({"page": 1.5}))).unwrap_err();
        assert!(err
            .to_string()
            .contains("invalid 'page' parameter: parameter 'page' must be a whole number"));

        let err = pagination_params(&args(json!({"perPage": false}))).unwrap_err();
        assert!(err.to_string().starts_with("invalid 'perPage' parameter"));
    }
}
