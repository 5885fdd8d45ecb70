//! Request-field extraction.
//!
//! Callers wrap the same fields in different ways: at the top level, under
//! `"request"`, or under `"body"`. Each field is looked up through
//! [`ENVELOPES`] in order and the first present value wins.

use serde_json::{Map, Value};

use trip_insight_core::{
    types::{LocationHint, RemoteImagesRequest, TripRequest},
    Error, Result,
};

/// One place a request field may live.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Envelope {
    /// Directly on the body object.
    TopLevel,
    /// One level down, under the given key.
    Wrapped(&'static str),
}

/// Lookup order for every field.
pub const ENVELOPES: &[Envelope] = &[
    Envelope::TopLevel,
    Envelope::Wrapped("request"),
    Envelope::Wrapped("body"),
];

impl Envelope {
    /// Look `field` up in this envelope. `null` and blank strings count as
    /// absent so the next envelope gets a chance.
    pub fn lookup<'a>(self, body: &'a Map<String, Value>, field: &str) -> Option<&'a Value> {
        let scope = match self {
            Self::TopLevel => body,
            Self::Wrapped(key) => body.get(key)?.as_object()?,
        };
        scope.get(field).filter(|value| !is_blank(value))
    }
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

fn field<'a>(body: &'a Map<String, Value>, name: &str) -> Option<&'a Value> {
    ENVELOPES
        .iter()
        .find_map(|envelope| envelope.lookup(body, name))
}

/// Parse a raw request body into a JSON object.
pub fn parse_body(bytes: &[u8]) -> Result<Map<String, Value>> {
    let value: Value = serde_json::from_slice(bytes)
        .map_err(|e| Error::invalid_request(format!("request body is not valid JSON: {}", e)))?;

    match value {
        Value::Object(map) => Ok(map),
        _ => Err(Error::invalid_request("request body must be a JSON object")),
    }
}

/// Extract `memberId`, `retripId` and the optional location hint.
pub fn parse_trip_request(body: &Map<String, Value>) -> Result<TripRequest> {
    let member_id = id_field(body, "memberId")?;
    let retrip_id = id_field(body, "retripId")?;

    let (Some(member_id), Some(retrip_id)) = (member_id, retrip_id) else {
        return Err(Error::invalid_request("memberId and retripId are required"));
    };

    Ok(TripRequest {
        member_id,
        retrip_id,
        location: location_hint(body)?,
    })
}

/// Extract `imageUrls` and the optional location hint.
pub fn parse_remote_request(body: &Map<String, Value>) -> Result<RemoteImagesRequest> {
    let urls = match field(body, "imageUrls") {
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| {
                item.as_str()
                    .map(|s| s.trim().to_string())
                    .ok_or_else(|| Error::invalid_request("imageUrls must contain only strings"))
            })
            .collect::<Result<Vec<_>>>()?,
        Some(_) => return Err(Error::invalid_request("imageUrls must be an array")),
        None => Vec::new(),
    };

    if urls.is_empty() {
        return Err(Error::invalid_request("imageUrls must not be empty"));
    }

    Ok(RemoteImagesRequest {
        urls,
        location: location_hint(body)?,
    })
}

/// Identifiers may arrive as strings or bare numbers.
fn id_field(body: &Map<String, Value>, name: &str) -> Result<Option<String>> {
    let id = match field(body, name) {
        None => return Ok(None),
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        Some(_) => {
            return Err(Error::invalid_request(format!("{} must be a string", name)));
        }
    };

    // A slash would move the request into another trip's folder.
    if id.contains('/') {
        return Err(Error::invalid_request(format!("{} must not contain '/'", name)));
    }
    Ok(Some(id))
}

fn coordinate(body: &Map<String, Value>, name: &str) -> Result<Option<f64>> {
    let invalid = || Error::invalid_request(format!("{} must be a number", name));

    match field(body, name) {
        None => Ok(None),
        Some(Value::Number(n)) => n.as_f64().map(Some).ok_or_else(invalid),
        Some(Value::String(s)) => s.trim().parse::<f64>().map(Some).map_err(|_| invalid()),
        Some(_) => Err(invalid()),
    }
}

fn location_hint(body: &Map<String, Value>) -> Result<Option<LocationHint>> {
    match (
        coordinate(body, "mainLocationLat")?,
        coordinate(body, "mainLocationLng")?,
    ) {
        (Some(lat), Some(lng)) => LocationHint::new(lat, lng).map(Some),
        (None, None) => Ok(None),
        (lat, lng) => {
            tracing::warn!(
                lat = ?lat,
                lng = ?lng,
                "Only one trip coordinate supplied, ignoring location hint"
            );
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn obj(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_top_level_fields() {
        let req = parse_trip_request(&obj(json!({
            "memberId": "u1",
            "retripId": "t1",
            "mainLocationLat": 35.102245,
            "mainLocationLng": 129.030598
        })))
        .unwrap();

        assert_eq!(req.prefix(), "u1/t1/");
        let hint = req.location.unwrap();
        assert_eq!(hint.latitude, 35.102245);
        assert_eq!(hint.longitude, 129.030598);
    }

    #[test]
    fn test_envelope_order() {
        let body = obj(json!({
            "retripId": "top",
            "request": {"memberId": "from-request", "retripId": "ignored"},
            "body": {"memberId": "ignored", "retripId": "ignored"}
        }));

        let req = parse_trip_request(&body).unwrap();
        assert_eq!(req.member_id, "from-request");
        assert_eq!(req.retrip_id, "top");
    }

    #[test]
    fn test_null_falls_through_to_next_envelope() {
        let body = obj(json!({
            "memberId": null,
            "retripId": "",
            "body": {"memberId": "u2", "retripId": 42}
        }));

        let req = parse_trip_request(&body).unwrap();
        assert_eq!(req.member_id, "u2");
        assert_eq!(req.retrip_id, "42");
    }

    #[test]
    fn test_missing_id_is_client_error() {
        let err = parse_trip_request(&obj(json!({"memberId": "u1"}))).unwrap_err();
        assert!(err.is_client_error());
        assert!(err.to_string().contains("retripId"));
    }

    #[test]
    fn test_slash_in_id_rejected() {
        let err = parse_trip_request(&obj(json!({"memberId": "u1/../u2", "retripId": "t1"})))
            .unwrap_err();
        assert!(err.is_client_error());
    }

    #[test]
    fn test_coordinates_as_strings() {
        let req = parse_trip_request(&obj(json!({
            "memberId": "u1",
            "retripId": "t1",
            "request": {"mainLocationLat": "37.5", "mainLocationLng": " 127.0 "}
        })))
        .unwrap();
        assert_eq!(req.location.unwrap().latitude, 37.5);
    }

    #[test]
    fn test_single_coordinate_is_ignored() {
        let req = parse_trip_request(&obj(json!({
            "memberId": "u1",
            "retripId": "t1",
            "mainLocationLat": 37.5
        })))
        .unwrap();
        assert!(req.location.is_none());
    }

    #[test]
    fn test_bad_coordinates_rejected() {
        for body in [
            json!({
                "memberId": "u1", "retripId": "t1",
                "mainLocationLat": 91, "mainLocationLng": 0
            }),
            json!({
                "memberId": "u1", "retripId": "t1",
                "mainLocationLat": "north", "mainLocationLng": 0
            }),
            json!({
                "memberId": "u1", "retripId": "t1",
                "mainLocationLat": 0, "mainLocationLng": [1]
            }),
        ] {
            assert!(parse_trip_request(&obj(body)).unwrap_err().is_client_error());
        }
    }

    #[test]
    fn test_body_must_be_object() {
        assert!(parse_body(b"{not json").unwrap_err().is_client_error());
        assert!(parse_body(b"[1, 2]").unwrap_err().is_client_error());
        assert!(parse_body(br#"{"memberId": "u1"}"#).is_ok());
    }

    #[test]
    fn test_remote_urls() {
        let req = parse_remote_request(&obj(json!({
            "body": {"imageUrls": ["https://a.example/1.jpg", " https://a.example/2 "]}
        })))
        .unwrap();
        assert_eq!(req.urls, vec!["https://a.example/1.jpg", "https://a.example/2"]);

        assert!(parse_remote_request(&obj(json!({"imageUrls": []}))).is_err());
        assert!(parse_remote_request(&obj(json!({"imageUrls": "x"}))).is_err());
        assert!(parse_remote_request(&obj(json!({"imageUrls": [1]}))).is_err());
        assert!(parse_remote_request(&obj(json!({}))).is_err());
    }
}
