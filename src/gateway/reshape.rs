//! Upstream payload → response record conversion
//!
//! Rounding is half to even (`f64::round_ties_even`), so 2.5 becomes 2.

use chrono::{DateTime, FixedOffset, NaiveDate, Offset, Utc};
use std::collections::BTreeMap;

use super::types::{
    Condition, CurrentConditions, DayCondition, ForecastDay, LocationMatch, SnapshotLocation,
    SunTimes, TemperatureRange, WeatherSnapshot, Wind,
};
use crate::error::UpstreamError;
use crate::upstream::{CurrentPayload, ForecastPayload, GeocodeHit};

pub fn snapshot(
    payload: CurrentPayload,
    lat: f64,
    lon: f64,
    fetched_at: DateTime<Utc>,
) -> Result<WeatherSnapshot, UpstreamError> {
    let offset = utc_offset(payload.timezone);
    let condition = payload
        .weather
        .into_iter()
        .next()
        .ok_or_else(|| UpstreamError::Malformed("current weather has no condition".to_string()))?;

    Ok(WeatherSnapshot {
        location: SnapshotLocation {
            name: payload.name,
            country: payload.sys.country.unwrap_or_default(),
            lat,
            lon,
        },
        current: CurrentConditions {
            temperature: round_int(payload.main.temp),
            feels_like: round_int(payload.main.feels_like.unwrap_or(payload.main.temp)),
            humidity: round_int(payload.main.humidity),
            pressure: round_int(payload.main.pressure.unwrap_or(0.0)),
            visibility_km: payload.visibility.unwrap_or(0.0) / 1000.0,
            wind: Wind {
                speed: payload.wind.speed,
                direction: payload.wind.deg.unwrap_or(0.0),
            },
            condition: Condition {
                main: condition.main,
                description: title_case(&condition.description),
                icon: condition.icon,
            },
        },
        sun: SunTimes {
            sunrise: local_clock(payload.sys.sunrise, offset)?,
            sunset: local_clock(payload.sys.sunset, offset)?,
        },
        fetched_at,
    })
}

#[derive(Default)]
struct DayAccumulator {
    temperatures: Vec<f64>,
    conditions: Vec<String>,
    descriptions: Vec<String>,
    humidity: Vec<f64>,
    wind_speed: Vec<f64>,
}

/// Bucket a time series by local calendar date and aggregate each day
///
/// Returns at most `days` buckets, earliest first.
pub fn forecast_days(payload: ForecastPayload, days: usize) -> Result<Vec<ForecastDay>, UpstreamError> {
    let offset = utc_offset(payload.utc_offset_seconds());
    let mut buckets: BTreeMap<NaiveDate, DayAccumulator> = BTreeMap::new();

    for point in payload.list {
        let date = local_datetime(point.dt, offset)?.date_naive();
        let condition = point.weather.into_iter().next().ok_or_else(|| {
            UpstreamError::Malformed(format!("forecast point {} has no condition", point.dt))
        })?;

        let day = buckets.entry(date).or_default();
        day.temperatures.push(point.main.temp);
        day.humidity.push(point.main.humidity);
        day.wind_speed.push(point.wind.speed);
        day.conditions.push(condition.main);
        day.descriptions.push(condition.description);
    }

    Ok(buckets
        .into_iter()
        .take(days)
        .map(|(date, day)| {
            let min = day.temperatures.iter().copied().fold(f64::INFINITY, f64::min);
            let max = day
                .temperatures
                .iter()
                .copied()
                .fold(f64::NEG_INFINITY, f64::max);

            ForecastDay {
                date,
                temperature: TemperatureRange {
                    min: round_int(min),
                    max: round_int(max),
                    avg: round_int(mean(&day.temperatures)),
                },
                condition: DayCondition {
                    main: modal(&day.conditions).unwrap_or_default().to_string(),
                    description: title_case(modal(&day.descriptions).unwrap_or_default()),
                },
                humidity: round_int(mean(&day.humidity)),
                wind_speed: round_to_tenth(mean(&day.wind_speed)),
            }
        })
        .collect())
}

/// Preserve geocoder order, cap at `limit`
pub fn location_matches(hits: Vec<GeocodeHit>, limit: usize) -> Vec<LocationMatch> {
    hits.into_iter()
        .take(limit)
        .map(|hit| LocationMatch {
            name: hit.name,
            country: hit.country,
            state: hit.state.filter(|s| !s.is_empty()),
            lat: hit.lat,
            lon: hit.lon,
        })
        .collect()
}

/// Most frequent value; ties go to whichever appeared first
pub fn modal(values: &[String]) -> Option<&str> {
    let mut counts: Vec<(&str, usize)> = Vec::new();
    for value in values {
        match counts.iter_mut().find(|(seen, _)| *seen == value.as_str()) {
            Some((_, count)) => *count += 1,
            None => counts.push((value.as_str(), 1)),
        }
    }

    let mut best: Option<(&str, usize)> = None;
    for (value, count) in counts {
        if best.map_or(true, |(_, best_count)| count > best_count) {
            best = Some((value, count));
        }
    }
    best.map(|(value, _)| value)
}

/// Uppercase the first letter of every word, lowercase the rest
pub fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut previous_is_letter = false;
    for ch in text.chars() {
        if previous_is_letter {
            out.extend(ch.to_lowercase());
        } else {
            out.extend(ch.to_uppercase());
        }
        previous_is_letter = ch.is_alphabetic();
    }
    out
}

fn utc_offset(seconds: Option<i32>) -> FixedOffset {
    seconds
        .and_then(FixedOffset::east_opt)
        .unwrap_or_else(|| Utc.fix())
}

fn local_datetime(unix_seconds: i64, offset: FixedOffset) -> Result<DateTime<FixedOffset>, UpstreamError> {
    DateTime::from_timestamp(unix_seconds, 0)
        .map(|utc| utc.with_timezone(&offset))
        .ok_or_else(|| UpstreamError::Malformed(format!("timestamp {unix_seconds} out of range")))
}

/// `HH:MM` at the given UTC offset
pub fn local_clock(unix_seconds: i64, offset: FixedOffset) -> Result<String, UpstreamError> {
    Ok(local_datetime(unix_seconds, offset)?.format("%H:%M").to_string())
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

fn round_int(value: f64) -> i64 {
    value.round_ties_even() as i64
}

fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0).round_ties_even() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::upstream::payload::{
        ConditionPayload, ForecastCity, ForecastPoint, MainReadings, WindReadings,
    };

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    fn point(dt: i64, temp: f64, main: &str, description: &str) -> ForecastPoint {
        ForecastPoint {
            dt,
            main: MainReadings {
                temp,
                feels_like: None,
                humidity: 70.0,
                pressure: None,
            },
            weather: vec![ConditionPayload {
                main: main.to_string(),
                description: description.to_string(),
                icon: String::new(),
            }],
            wind: WindReadings {
                speed: 3.0,
                deg: None,
            },
        }
    }

    #[test]
    fn test_modal_majority_wins() {
        assert_eq!(modal(&strings(&["Rain", "Rain", "Clear"])), Some("Rain"));
    }

    #[test]
    fn test_modal_tie_goes_to_first_seen() {
        assert_eq!(modal(&strings(&["Clear", "Rain"])), Some("Clear"));
        assert_eq!(modal(&strings(&["Rain", "Clear", "Clear", "Rain"])), Some("Rain"));
    }

    #[test]
    fn test_modal_empty() {
        assert_eq!(modal(&[]), None);
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("light rain"), "Light Rain");
        assert_eq!(title_case("OVERCAST clouds"), "Overcast Clouds");
        assert_eq!(title_case("thunderstorm with heavy-rain"), "Thunderstorm With Heavy-Rain");
    }

    #[test]
    fn test_rounding_is_half_to_even() {
        assert_eq!(round_int(2.5), 2);
        assert_eq!(round_int(3.5), 4);
        assert_eq!(round_int(-2.5), -2);
        assert_eq!(round_int(2.6), 3);
        assert_eq!(round_to_tenth(3.25), 3.2);
        assert_eq!(round_to_tenth(3.35), 3.4);
    }

    #[test]
    fn test_local_clock_applies_offset() {
        // 2023-11-14 22:13:20 UTC
        let ts = 1_700_000_000;
        let utc = FixedOffset::east_opt(0).unwrap();
        let tokyo = FixedOffset::east_opt(9 * 3600).unwrap();

        assert_eq!(local_clock(ts, utc).unwrap(), "22:13");
        assert_eq!(local_clock(ts, tokyo).unwrap(), "07:13");
    }

    #[test]
    fn test_forecast_buckets_by_local_date() {
        // 23:00 UTC on 2024-01-01 is 2024-01-02 in UTC+2
        let late = 1_704_150_000;
        let payload = ForecastPayload {
            list: vec![point(late, 10.0, "Clear", "clear sky")],
            city: Some(ForecastCity {
                timezone: Some(7200),
            }),
        };

        let days = forecast_days(payload, 5).unwrap();
        assert_eq!(days[0].date, NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
    }

    #[test]
    fn test_forecast_aggregates_a_day() {
        let base = 1_704_067_200; // 2024-01-01T00:00:00Z
        let payload = ForecastPayload {
            list: vec![
                point(base, 1.0, "Rain", "light rain"),
                point(base + 3 * 3600, 4.0, "Rain", "light rain"),
                point(base + 6 * 3600, 8.5, "Clouds", "few clouds"),
            ],
            city: None,
        };

        let days = forecast_days(payload, 5).unwrap();
        assert_eq!(days.len(), 1);
        let day = &days[0];
        assert_eq!(day.temperature.min, 1);
        assert_eq!(day.temperature.max, 8);
        assert_eq!(day.temperature.avg, 4);
        assert_eq!(day.condition.main, "Rain");
        assert_eq!(day.condition.description, "Light Rain");
        assert_eq!(day.humidity, 70);
        assert_eq!(day.wind_speed, 3.0);
    }

    #[test]
    fn test_forecast_average_on_half_rounds_to_even() {
        let base = 1_704_067_200;
        let payload = ForecastPayload {
            list: vec![
                point(base, 2.0, "Clear", "clear sky"),
                point(base + 3 * 3600, 3.0, "Clear", "clear sky"),
            ],
            city: None,
        };

        let days = forecast_days(payload, 1).unwrap();
        assert_eq!(days[0].temperature.avg, 2);
    }

    #[test]
    fn test_forecast_point_without_condition_is_malformed() {
        let mut bad = point(1_704_067_200, 1.0, "Rain", "rain");
        bad.weather.clear();
        let payload = ForecastPayload {
            list: vec![bad],
            city: None,
        };
        assert!(matches!(
            forecast_days(payload, 1),
            Err(UpstreamError::Malformed(_))
        ));
    }

    #[test]
    fn test_location_matches_truncate_in_order() {
        let hits = (0..5)
            .map(|i| GeocodeHit {
                name: format!("City{i}"),
                country: "GB".to_string(),
                state: Some(String::new()),
                lat: i as f64,
                lon: 0.0,
            })
            .collect();

        let matches = location_matches(hits, 3);
        let names: Vec<_> = matches.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["City0", "City1", "City2"]);
        assert_eq!(matches[0].state, None);
    }
}
