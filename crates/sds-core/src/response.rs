//! Response interpretation
//!
//! The appliance answers every REST call with a JSON array of flat objects.
//! Writes return `[{"ret_oid": "..."}]` on success, failures carry an
//! `errmsg` field, and info calls return the object's attributes in the
//! first element. A body that is not a JSON array is treated like an empty
//! array: there is nothing in it to succeed with.

use serde_json::{Map, Value};

use crate::http::RawResponse;

/// Field carrying the oid of a created or edited object
pub const OID_FIELD: &str = "ret_oid";

/// Field carrying the appliance error message
pub const ERROR_FIELD: &str = "errmsg";

/// One flat object from an appliance answer
pub type RemoteObject = Map<String, Value>;

/// Parse the body as an array of objects; anything else yields no objects
pub fn parse_objects(body: &str) -> Vec<RemoteObject> {
    match serde_json::from_str::<Vec<Value>>(body) {
        Ok(items) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::Object(map) => Some(map),
                _ => None,
            })
            .collect(),
        Err(e) => {
            if !body.trim().is_empty() {
                tracing::debug!("Appliance answer is not a JSON array of objects: {}", e);
            }
            Vec::new()
        }
    }
}

/// The `errmsg` of the first object, if any
pub fn error_message(objects: &[RemoteObject]) -> Option<String> {
    objects
        .first()
        .and_then(|first| first.get(ERROR_FIELD))
        .and_then(Value::as_str)
        .map(str::to_string)
}

/// String attribute of a remote object; missing or non-string gives `""`
pub fn field_str<'a>(object: &'a RemoteObject, key: &str) -> &'a str {
    object.get(key).and_then(Value::as_str).unwrap_or_default()
}

/// Result of a create/update call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOutcome {
    /// The appliance accepted the write and returned the object's oid
    Accepted(String),
    /// The appliance refused, with its message when it gave one
    Rejected(Option<String>),
}

/// Result of an info call
#[derive(Debug, Clone, PartialEq)]
pub enum ReadOutcome {
    /// The object's attributes
    Found(RemoteObject),
    /// Nothing usable came back, with the remote message when there was one
    Missing(Option<String>),
}

/// Interpret the answer to a create or update
///
/// Success needs status 200/201, a non-empty array and a string `ret_oid`
/// in its first element.
pub fn interpret_write(response: &RawResponse) -> WriteOutcome {
    let objects = parse_objects(&response.body);

    if response.is_write_success() {
        if let Some(oid) = objects
            .first()
            .and_then(|first| first.get(OID_FIELD))
            .and_then(Value::as_str)
        {
            return WriteOutcome::Accepted(oid.to_string());
        }
    }

    WriteOutcome::Rejected(error_message(&objects))
}

/// Interpret the answer to an info call (status 200 and a non-empty array)
pub fn interpret_read(response: &RawResponse) -> ReadOutcome {
    interpret_read_with(response, &[200])
}

/// Interpret the answer to an info call whose success statuses are `accepted`
pub fn interpret_read_with(response: &RawResponse, accepted: &[u16]) -> ReadOutcome {
    let mut objects = parse_objects(&response.body);

    if accepted.contains(&response.status) && !objects.is_empty() {
        return ReadOutcome::Found(objects.swap_remove(0));
    }

    ReadOutcome::Missing(error_message(&objects))
}

/// Interpret the answer to a deletion (status 200/204, body ignored)
pub fn interpret_delete(response: &RawResponse) -> Result<(), Option<String>> {
    if response.is_delete_success() {
        return Ok(());
    }

    Err(error_message(&parse_objects(&response.body)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_success_returns_oid() {
        let response = RawResponse::new(201, r#"[{"ret_oid":"42","ret_name":"zone"}]"#);
        assert_eq!(
            interpret_write(&response),
            WriteOutcome::Accepted("42".to_string())
        );
    }

    #[test]
    fn write_with_error_message_is_rejected() {
        let response = RawResponse::new(400, r#"[{"errno":"2003","errmsg":"Zone already exists"}]"#);
        assert_eq!(
            interpret_write(&response),
            WriteOutcome::Rejected(Some("Zone already exists".to_string()))
        );
    }

    #[test]
    fn malformed_write_answers_are_never_success() {
        for body in ["[]", "", "not json", r#"{"ret_oid":"42"}"#, r#"[{"ret_oid":42}]"#, r#"[{}]"#] {
            let response = RawResponse::new(200, body);
            assert_eq!(
                interpret_write(&response),
                WriteOutcome::Rejected(None),
                "body {:?} must not be accepted",
                body
            );
        }
    }

    #[test]
    fn write_with_oid_but_bad_status_is_rejected() {
        let response = RawResponse::new(500, r#"[{"ret_oid":"42"}]"#);
        assert_eq!(interpret_write(&response), WriteOutcome::Rejected(None));
    }

    #[test]
    fn read_returns_first_object() {
        let response = RawResponse::new(
            200,
            r#"[{"dnszone_name":"a.example.com"},{"dnszone_name":"b.example.com"}]"#,
        );
        match interpret_read(&response) {
            ReadOutcome::Found(object) => {
                assert_eq!(field_str(&object, "dnszone_name"), "a.example.com");
                assert_eq!(field_str(&object, "missing"), "");
            }
            other => panic!("expected Found, got {:?}", other),
        }
    }

    #[test]
    fn read_of_empty_array_is_missing() {
        assert_eq!(
            interpret_read(&RawResponse::new(200, "[]")),
            ReadOutcome::Missing(None)
        );
        assert_eq!(
            interpret_read(&RawResponse::new(204, "")),
            ReadOutcome::Missing(None)
        );
    }

    #[test]
    fn read_with_error_status_keeps_message() {
        let response = RawResponse::new(400, r#"[{"errmsg":"No object found"}]"#);
        assert_eq!(
            interpret_read(&response),
            ReadOutcome::Missing(Some("No object found".to_string()))
        );
    }

    #[test]
    fn read_with_extra_status() {
        let response = RawResponse::new(201, r#"[{"mac_addr":"aa:bb:cc:dd:ee:ff"}]"#);

        assert_eq!(interpret_read(&response), ReadOutcome::Missing(None));
        assert!(matches!(
            interpret_read_with(&response, &[200, 201]),
            ReadOutcome::Found(_)
        ));
    }

    #[test]
    fn delete_accepts_200_and_204() {
        assert!(interpret_delete(&RawResponse::new(200, "[]")).is_ok());
        assert!(interpret_delete(&RawResponse::new(204, "")).is_ok());
        assert_eq!(
            interpret_delete(&RawResponse::new(400, r#"[{"errmsg":"in use"}]"#)),
            Err(Some("in use".to_string()))
        );
        assert_eq!(interpret_delete(&RawResponse::new(500, "oops")), Err(None));
    }
}
