use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use once_cell::sync::Lazy;
use reqwest::Client;
use serde_json::{Map, Value};

use crate::providers::FacilityRecord;

const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 12;
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 6;

static HTTP_CLIENT: Lazy<Client> = Lazy::new(|| {
    Client::builder()
        .user_agent("proximity-oracle/0.1")
        .timeout(Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS))
        .connect_timeout(Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS))
        .build()
        .expect("failed to build HTTP client")
});

pub async fn fetch_json(url: &str, auth_header: Option<(&str, &str)>) -> Result<Value> {
    let mut request = HTTP_CLIENT.get(url);
    if let Some((name, value)) = auth_header {
        request = request.header(name, value);
    }
    let response = request
        .send()
        .await
        .with_context(|| format!("failed GET request: {url}"))?;
    let status = response.status();
    let body = response
        .text()
        .await
        .with_context(|| format!("failed reading response body: {url}"))?;
    if !status.is_success() {
        let preview: String = body.chars().take(180).collect();
        return Err(anyhow!("GET {url} returned {status}: {preview}"));
    }
    serde_json::from_str(&body).with_context(|| format!("invalid JSON response: {url}"))
}

/// Pull facility records out of a loosely-shaped payload. Field names vary
/// between providers, so each field is resolved against an ordered list of
/// candidate paths; entries missing a name are dropped here.
pub fn parse_facility_records(
    value: &Value,
    name_paths: &[&str],
    lat_paths: &[&str],
    lng_paths: &[&str],
    distance_paths: &[&str],
    line_paths: &[&str],
    max_items: usize,
) -> Vec<FacilityRecord> {
    let mut out = Vec::new();
    for array in candidate_object_arrays(value) {
        for entry in array {
            let Some(object) = entry.as_object() else {
                continue;
            };
            let Some(name) = string_from_paths(object, name_paths) else {
                continue;
            };
            out.push(FacilityRecord {
                name,
                lat: number_from_paths(object, lat_paths),
                lng: number_from_paths(object, lng_paths),
                distance_m: number_from_paths(object, distance_paths),
                line: string_from_paths(object, line_paths),
            });
            if out.len() >= max_items {
                return out;
            }
        }
    }
    out
}

fn candidate_object_arrays(value: &Value) -> Vec<&Vec<Value>> {
    let mut arrays = Vec::new();
    if let Some(arr) = value.as_array() {
        if looks_like_object_array(arr) {
            arrays.push(arr);
        }
    }
    if let Some(object) = value.as_object() {
        for key in ["documents", "places", "items", "results", "data", "list"] {
            if let Some(v) = object_get_case_insensitive(object, key) {
                if let Some(arr) = v.as_array() {
                    if looks_like_object_array(arr) {
                        arrays.push(arr);
                    }
                } else if let Some(nested) = v.as_object() {
                    for nested_key in ["documents", "items", "list"] {
                        if let Some(inner) = object_get_case_insensitive(nested, nested_key) {
                            if let Some(arr) = inner.as_array() {
                                if looks_like_object_array(arr) {
                                    arrays.push(arr);
                                }
                            }
                        }
                    }
                }
            }
        }
    }
    arrays
}

fn looks_like_object_array(arr: &[Value]) -> bool {
    arr.iter().take(5).any(Value::is_object)
}

fn string_from_paths(object: &Map<String, Value>, paths: &[&str]) -> Option<String> {
    for path in paths {
        let Some(value) = object_path_value(object, path) else {
            continue;
        };
        match value {
            Value::String(s) => {
                if !s.trim().is_empty() {
                    return Some(s.trim().to_string());
                }
            }
            Value::Number(n) => return Some(n.to_string()),
            _ => {}
        }
    }
    None
}

fn number_from_paths(object: &Map<String, Value>, paths: &[&str]) -> Option<f64> {
    for path in paths {
        let Some(value) = object_path_value(object, path) else {
            continue;
        };
        if let Some(number) = to_f64(value) {
            return Some(number);
        }
    }
    None
}

fn object_path_value<'a>(object: &'a Map<String, Value>, path: &str) -> Option<&'a Value> {
    let mut segments = path.split('.');
    let first = segments.next()?;
    let mut current = object_get_case_insensitive(object, first)?;
    for segment in segments {
        let nested = current.as_object()?;
        current = object_get_case_insensitive(nested, segment)?;
    }
    Some(current)
}

fn object_get_case_insensitive<'a>(object: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    object.get(key).or_else(|| {
        object
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v)
    })
}

fn to_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let sanitized = s.trim().replace(',', "").replace('_', "");
            sanitized.parse::<f64>().ok()
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::parse_facility_records;

    #[test]
    fn parses_records_from_nested_documents() {
        let payload = json!({
            "documents": [
                {
                    "place_name": "Daechi Elementary",
                    "y": "37.4946",
                    "x": "127.0628",
                    "distance": "250"
                },
                {
                    "place_name": "Daehyun Middle School",
                    "y": 37.4921,
                    "x": 127.0585,
                    "distance": 830
                }
            ]
        });

        let records = parse_facility_records(
            &payload,
            &["place_name", "name"],
            &["y", "lat"],
            &["x", "lng"],
            &["distance"],
            &["line"],
            10,
        );
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].name, "Daechi Elementary");
        assert_eq!(records[0].distance_m, Some(250.0));
        assert_eq!(records[1].lat, Some(37.4921));
    }

    #[test]
    fn drops_entries_without_a_name_and_caps_items() {
        let payload = json!({
            "documents": [
                {"distance": "100"},
                {"place_name": "GS25 Yeoksam", "distance": "120"},
                {"place_name": "CU Teheran", "distance": "340"}
            ]
        });

        let records = parse_facility_records(
            &payload,
            &["place_name"],
            &["y"],
            &["x"],
            &["distance"],
            &[],
            1,
        );
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "GS25 Yeoksam");
    }
}
