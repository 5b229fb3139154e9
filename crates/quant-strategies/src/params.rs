//! Decoding of JSON strategy parameters.

use quant_core::error::StrategyError;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

/// Normalise a parameter value into a JSON object.
///
/// `null` means "all defaults". A key explicitly set to `null` is reported as
/// a missing parameter rather than silently falling back to its default.
pub(crate) fn parameter_map(params: &Value) -> Result<Map<String, Value>, StrategyError> {
    let map = match params {
        Value::Null => Map::new(),
        Value::Object(map) => map.clone(),
        other => {
            return Err(StrategyError::InvalidConfig(format!(
                "parameters must be a JSON object, got {other}"
            )))
        }
    };

    if let Some((key, _)) = map.iter().find(|(_, v)| v.is_null()) {
        return Err(StrategyError::MissingParameter(key.clone()));
    }

    Ok(map)
}

/// Deserialize a config struct from a parameter object.
pub(crate) fn decode<T: DeserializeOwned>(map: Map<String, Value>) -> Result<T, StrategyError> {
    serde_json::from_value(Value::Object(map))
        .map_err(|e| StrategyError::InvalidConfig(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_null_is_empty_object() {
        assert!(parameter_map(&Value::Null).unwrap().is_empty());
    }

    #[test]
    fn test_explicit_null_is_missing() {
        assert_eq!(
            parameter_map(&json!({ "period": null })),
            Err(StrategyError::MissingParameter("period".into()))
        );
    }

    #[test]
    fn test_non_object_rejected() {
        assert!(matches!(
            parameter_map(&json!([1, 2])),
            Err(StrategyError::InvalidConfig(_))
        ));
    }
}
