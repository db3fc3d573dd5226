//! Response envelope decoding and error classification.
//!
//! Every response is `{ success, data, message? }`, except where a resource
//! uses a different data key. `success: false` is a server error whatever the
//! HTTP status says; a missing `success` is taken as success.

use backoffice_core::{ClientError, ClientResult, RecordId};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::BTreeMap;

/// Parse a response body and classify failures.
pub(crate) fn check(status: StatusCode, body: &str, target: Option<&RecordId>) -> ClientResult<Value> {
    let value = if body.trim().is_empty() {
        Value::Null
    } else {
        match serde_json::from_str::<Value>(body) {
            Ok(value) => value,
            Err(err) if status.is_success() => {
                return Err(ClientError::server(
                    Some(status.as_u16()),
                    format!("Malformed response body: {}", err),
                ))
            }
            Err(_) => Value::String(body.trim().to_string()),
        }
    };

    if !status.is_success() {
        return Err(classify_status(status, &value, target));
    }

    if value.get("success").and_then(Value::as_bool) == Some(false) {
        return Err(ClientError::server(
            Some(status.as_u16()),
            message_of(&value).unwrap_or_else(|| "Request was not successful".to_string()),
        ));
    }

    Ok(value)
}

fn classify_status(status: StatusCode, value: &Value, target: Option<&RecordId>) -> ClientError {
    let message = message_of(value).unwrap_or_else(|| {
        status
            .canonical_reason()
            .unwrap_or("Request failed")
            .to_string()
    });
    match (status, target) {
        (StatusCode::NOT_FOUND, Some(id)) => ClientError::NotFound { id: id.clone() },
        (status, _) if status.is_client_error() => ClientError::Validation {
            message,
            fields: field_errors(value),
        },
        (status, _) => ClientError::server(Some(status.as_u16()), message),
    }
}

/// Decode the collection from an envelope (or a bare array).
pub(crate) fn collection<R: DeserializeOwned>(value: Value, key: &str) -> ClientResult<Vec<R>> {
    let items = match value {
        Value::Array(_) => value,
        Value::Object(mut map) => match map.remove(key) {
            Some(items @ Value::Array(_)) => items,
            Some(Value::Null) | None => {
                return Err(ClientError::server(
                    None,
                    format!("Response has no `{}` collection", key),
                ))
            }
            Some(_) => {
                return Err(ClientError::server(
                    None,
                    format!("Response field `{}` is not a list", key),
                ))
            }
        },
        _ => return Err(ClientError::server(None, "Response is not a JSON object")),
    };
    serde_json::from_value(items)
        .map_err(|e| ClientError::server(None, format!("Malformed collection: {}", e)))
}

/// Decode a single record from the first key that holds an object.
pub(crate) fn record<R: DeserializeOwned>(value: &Value, keys: &[String]) -> ClientResult<Option<R>> {
    let Some(found) = keys
        .iter()
        .filter_map(|key| value.get(key))
        .find(|candidate| candidate.is_object())
    else {
        return Ok(None);
    };
    serde_json::from_value(found.clone())
        .map(Some)
        .map_err(|e| ClientError::server(None, format!("Malformed record: {}", e)))
}

/// Id of a created record when the response only echoes it.
pub(crate) fn echoed_id(value: &Value) -> Option<RecordId> {
    ["_id", "id", "insertedId"]
        .iter()
        .filter_map(|key| value.get(key))
        .find_map(|id| id.as_str().map(RecordId::new))
}

fn message_of(value: &Value) -> Option<String> {
    match value {
        Value::String(text) if !text.is_empty() => Some(text.clone()),
        Value::Object(map) => ["message", "error", "msg"]
            .iter()
            .filter_map(|key| map.get(*key))
            .find_map(|v| v.as_str().map(str::to_string)),
        _ => None,
    }
}

/// Field-level messages from `errors`, as either `{ field: message }`,
/// `{ field: { message } }` or `[{ path|param|field, msg|message }]`.
fn field_errors(value: &Value) -> BTreeMap<String, String> {
    let mut fields = BTreeMap::new();
    match value.get("errors") {
        Some(Value::Object(map)) => {
            for (field, detail) in map {
                let message = match detail {
                    Value::String(text) => Some(text.clone()),
                    other => message_of(other),
                };
                if let Some(message) = message {
                    fields.insert(field.clone(), message);
                }
            }
        }
        Some(Value::Array(items)) => {
            for item in items {
                let field = ["path", "param", "field"]
                    .iter()
                    .find_map(|key| item.get(*key).and_then(Value::as_str));
                if let (Some(field), Some(message)) = (field, message_of(item)) {
                    fields.insert(field.to_string(), message);
                }
            }
        }
        _ => {}
    }
    fields
}

#[cfg(test)]
mod tests {
    use super::*;
    use backoffice_core::User;
    use serde_json::json;

    #[test]
    fn test_success_false_is_server_error_even_on_200() {
        let err = check(StatusCode::OK, r#"{"success":false,"message":"Course exists"}"#, None)
            .unwrap_err();
        assert_eq!(err, ClientError::server(Some(200), "Course exists"));
    }

    #[test]
    fn test_missing_success_flag_counts_as_success() {
        let value = check(StatusCode::OK, r#"{"attendance":[]}"#, None).unwrap();
        let sheets: Vec<User> = collection(value, "attendance").unwrap();
        assert!(sheets.is_empty());
    }

    #[test]
    fn test_malformed_success_body_is_server_error() {
        let err = check(StatusCode::OK, "<html>", None).unwrap_err();
        assert!(matches!(err, ClientError::Server { status: Some(200), .. }));
    }

    #[test]
    fn test_not_found_needs_a_target() {
        let id = RecordId::new("u1");
        let err = check(StatusCode::NOT_FOUND, r#"{"message":"User not found"}"#, Some(&id)).unwrap_err();
        assert_eq!(err, ClientError::NotFound { id });

        let err = check(StatusCode::NOT_FOUND, "Cannot GET /api/allusers", None).unwrap_err();
        assert!(matches!(err, ClientError::Validation { ref message, .. } if message == "Cannot GET /api/allusers"));
    }

    #[test]
    fn test_validation_fields_from_object_and_array() {
        let err = check(
            StatusCode::BAD_REQUEST,
            &json!({
                "message": "Validation failed",
                "errors": { "email": { "message": "Email is taken" }, "mobile": "Required" }
            })
            .to_string(),
            None,
        )
        .unwrap_err();
        assert_eq!(err.field_error("email"), Some("Email is taken"));
        assert_eq!(err.field_error("mobile"), Some("Required"));

        let err = check(
            StatusCode::UNPROCESSABLE_ENTITY,
            &json!({ "errors": [ { "path": "price", "msg": "Must be a number" } ] }).to_string(),
            None,
        )
        .unwrap_err();
        assert_eq!(err.field_error("price"), Some("Must be a number"));
    }

    #[test]
    fn test_server_errors_keep_status() {
        let err = check(StatusCode::BAD_GATEWAY, "", None).unwrap_err();
        assert_eq!(err, ClientError::server(Some(502), "Bad Gateway"));
    }

    #[test]
    fn test_record_tries_keys_in_order() {
        let value = json!({ "success": true, "message": "ok", "updatedUser": { "_id": "u1", "name": "A" } });
        let keys = vec!["updatedUser".to_string(), "data".to_string()];
        let user: Option<User> = record(&value, &keys).unwrap();
        assert_eq!(user.unwrap().name.as_deref(), Some("A"));

        let none: Option<User> = record(&json!({ "success": true }), &keys).unwrap();
        assert!(none.is_none());
    }

    #[test]
    fn test_bare_array_collection() {
        let users: Vec<User> = collection(json!([{ "_id": "1" }, { "_id": "2" }]), "data").unwrap();
        assert_eq!(users.len(), 2);
    }
}
