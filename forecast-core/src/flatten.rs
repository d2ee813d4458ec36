//! Flattening of the provider's nested `days[].hours[]` timeline into hourly records.

use serde_json::{Map, Value};

use crate::{
    error::ForecastError,
    model::{ForecastResult, HourlyRecord},
};

/// Flatten a timeline response into one record per (day, hour) pair.
///
/// Each record starts as `{ "date": day.datetime, "time": hour.datetime }` and then
/// receives every field of the hour object. Hour fields are merged last, so if an
/// hour carries its own `date` or `time` key, the hour's value is kept.
///
/// Days without `hours` (absent, `null` or empty) contribute nothing, and a missing
/// or empty `days` list yields an empty result. Anything that cannot be walked
/// (non-array `days`/`hours`, non-object entries, a missing `datetime`) fails the
/// whole call; no partial result is returned.
pub fn parse_response(body: &Value) -> Result<ForecastResult, ForecastError> {
    let root = body
        .as_object()
        .ok_or_else(|| format_error("top-level value is not an object"))?;

    let days = match root.get("days") {
        None | Some(Value::Null) => return Ok(Vec::new()),
        Some(Value::Array(days)) => days,
        Some(_) => return Err(format_error("`days` is not an array")),
    };

    let mut records = Vec::new();

    for (day_idx, day) in days.iter().enumerate() {
        let day = day
            .as_object()
            .ok_or_else(|| format_error(format!("days[{day_idx}] is not an object")))?;
        let date = datetime_of(day, || format!("days[{day_idx}]"))?;

        let hours = match day.get("hours") {
            None | Some(Value::Null) => continue,
            Some(Value::Array(hours)) => hours,
            Some(_) => {
                return Err(format_error(format!("days[{day_idx}].hours is not an array")));
            }
        };

        for (hour_idx, hour) in hours.iter().enumerate() {
            let hour = hour.as_object().ok_or_else(|| {
                format_error(format!("days[{day_idx}].hours[{hour_idx}] is not an object"))
            })?;
            let time = datetime_of(hour, || format!("days[{day_idx}].hours[{hour_idx}]"))?;

            records.push(merge_hour(date, time, hour));
        }
    }

    Ok(records)
}

fn merge_hour(date: &str, time: &str, hour: &Map<String, Value>) -> HourlyRecord {
    let mut record = HourlyRecord::new();
    record.insert("date".to_string(), Value::String(date.to_string()));
    record.insert("time".to_string(), Value::String(time.to_string()));

    // Hour fields take precedence over the seeded keys.
    for (key, value) in hour {
        record.insert(key.clone(), value.clone());
    }

    record
}

fn datetime_of<'a>(
    obj: &'a Map<String, Value>,
    location: impl FnOnce() -> String,
) -> Result<&'a str, ForecastError> {
    obj.get("datetime")
        .and_then(Value::as_str)
        .ok_or_else(|| format_error(format!("{} has no string `datetime`", location())))
}

fn format_error(msg: impl Into<String>) -> ForecastError {
    ForecastError::ResponseFormat(msg.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn two_day_response() -> Value {
        json!({
            "resolvedAddress": "London, England, United Kingdom",
            "days": [
                {
                    "datetime": "2024-01-01",
                    "tempmax": 9.1,
                    "hours": [
                        { "datetime": "00:00:00", "temp": 5.0 },
                        { "datetime": "01:00:00", "temp": 4.5 },
                        { "datetime": "02:00:00", "temp": 4.2 }
                    ]
                },
                {
                    "datetime": "2024-01-02",
                    "hours": [
                        { "datetime": "00:00:00", "temp": 3.9 },
                        { "datetime": "01:00:00", "temp": 3.1 }
                    ]
                }
            ]
        })
    }

    #[test]
    fn flattens_days_then_hours_in_order() {
        let records = parse_response(&two_day_response()).unwrap();
        assert_eq!(records.len(), 5);

        let tags: Vec<(&str, &str)> = records
            .iter()
            .map(|r| (r["date"].as_str().unwrap(), r["time"].as_str().unwrap()))
            .collect();

        assert_eq!(
            tags,
            vec![
                ("2024-01-01", "00:00:00"),
                ("2024-01-01", "01:00:00"),
                ("2024-01-01", "02:00:00"),
                ("2024-01-02", "00:00:00"),
                ("2024-01-02", "01:00:00"),
            ]
        );
    }

    #[test]
    fn record_count_is_sum_of_hours() {
        let body = json!({
            "days": [
                { "datetime": "2024-01-01", "hours": [{ "datetime": "00:00:00" }] },
                { "datetime": "2024-01-02", "hours": [] },
                { "datetime": "2024-01-03", "hours": [
                    { "datetime": "00:00:00" }, { "datetime": "01:00:00" },
                    { "datetime": "02:00:00" }, { "datetime": "03:00:00" }
                ] }
            ]
        });
        assert_eq!(parse_response(&body).unwrap().len(), 5);
    }

    #[test]
    fn hour_fields_are_carried_over() {
        let records = parse_response(&two_day_response()).unwrap();
        let first = &records[0];

        assert_eq!(first["temp"], json!(5.0));
        assert_eq!(first["datetime"], json!("00:00:00"));
        // Day-level fields are not copied into hourly records.
        assert!(!first.contains_key("tempmax"));
    }

    #[test]
    fn hour_fields_win_on_key_collision() {
        let body = json!({
            "days": [{
                "datetime": "2024-01-01",
                "hours": [{ "datetime": "12:00:00", "date": "provider-date", "time": 1704110400 }]
            }]
        });

        let records = parse_response(&body).unwrap();
        assert_eq!(records[0]["date"], json!("provider-date"));
        assert_eq!(records[0]["time"], json!(1704110400));
    }

    #[test]
    fn empty_days_yields_empty_result() {
        assert!(parse_response(&json!({ "days": [] })).unwrap().is_empty());
    }

    #[test]
    fn missing_days_yields_empty_result() {
        assert!(parse_response(&json!({ "queryCost": 1 })).unwrap().is_empty());
    }

    #[test]
    fn day_without_hours_contributes_nothing() {
        let body = json!({
            "days": [
                { "datetime": "2024-01-01" },
                { "datetime": "2024-01-02", "hours": null },
                { "datetime": "2024-01-03", "hours": [{ "datetime": "06:00:00" }] }
            ]
        });

        let records = parse_response(&body).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["date"], json!("2024-01-03"));
    }

    #[test]
    fn days_must_be_an_array() {
        let err = parse_response(&json!({ "days": { "datetime": "2024-01-01" } })).unwrap_err();
        assert!(matches!(err, ForecastError::ResponseFormat(_)));
    }

    #[test]
    fn hours_must_be_an_array() {
        let body = json!({ "days": [{ "datetime": "2024-01-01", "hours": "none" }] });
        let err = parse_response(&body).unwrap_err();
        assert!(err.to_string().contains("days[0].hours is not an array"));
    }

    #[test]
    fn non_object_body_is_rejected() {
        let err = parse_response(&json!([1, 2, 3])).unwrap_err();
        assert!(matches!(err, ForecastError::ResponseFormat(_)));
    }

    #[test]
    fn hour_without_datetime_is_rejected() {
        let body = json!({
            "days": [{ "datetime": "2024-01-01", "hours": [{ "datetime": "00:00:00" }, { "temp": 1.0 }] }]
        });
        let err = parse_response(&body).unwrap_err();
        assert!(err.to_string().contains("days[0].hours[1]"));
    }
}
