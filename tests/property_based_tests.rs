mod common;

use common::strategies::*;
use proptest::prelude::*;
use std::time::Duration;

use weather_gateway::cache::{QueryKey, TimedCache};
use weather_gateway::gateway::reshape::{modal, title_case};
use weather_gateway::gateway::validation::{validate_coordinates, validate_search};

proptest! {
    /// Property: identical queries always build identical keys
    #[test]
    fn keys_are_deterministic(lat in latitude_strategy(), lon in longitude_strategy(), days in forecast_days_strategy()) {
        let a = QueryKey::Forecast { lat, lon, days }.build();
        let b = QueryKey::Forecast { lat, lon, days }.build();
        prop_assert_eq!(a, b);
    }

    /// Property: query kinds never share a key
    #[test]
    fn query_kinds_never_collide(lat in latitude_strategy(), lon in longitude_strategy(), days in forecast_days_strategy()) {
        let current = QueryKey::CurrentConditions { lat, lon }.build();
        let forecast = QueryKey::Forecast { lat, lon, days }.build();
        prop_assert_ne!(current, forecast);
    }

    /// Property: day count and limit are part of the key
    #[test]
    fn response_shaping_parameters_change_the_key(
        lat in latitude_strategy(),
        lon in longitude_strategy(),
        days in 1u32..7,
        query in search_query_strategy(),
        limit in 1u32..20,
    ) {
        prop_assert_ne!(
            QueryKey::Forecast { lat, lon, days }.build(),
            QueryKey::Forecast { lat, lon, days: days + 1 }.build()
        );
        prop_assert_ne!(
            QueryKey::LocationSearch { query: &query, limit }.build(),
            QueryKey::LocationSearch { query: &query, limit: limit + 1 }.build()
        );
    }

    /// Property: surrounding whitespace and case never change a search key
    #[test]
    fn search_keys_ignore_case_and_padding(query in search_query_strategy(), limit in search_limit_strategy()) {
        let padded = QueryKey::LocationSearch { query: &query, limit }.build();
        let lowered = query.trim().to_lowercase();
        let canonical = QueryKey::LocationSearch { query: &lowered, limit }.build();
        prop_assert_eq!(padded, canonical);
    }

    /// Property: every in-range coordinate pair passes validation
    #[test]
    fn in_range_coordinates_accepted(lat in latitude_strategy(), lon in longitude_strategy()) {
        prop_assert!(validate_coordinates(lat, lon).is_ok());
    }

    /// Property: out-of-range latitudes are rejected
    #[test]
    fn out_of_range_latitude_rejected(excess in 0.0001f64..1000.0, lon in longitude_strategy()) {
        prop_assert!(validate_coordinates(90.0 + excess, lon).is_err());
        prop_assert!(validate_coordinates(-90.0 - excess, lon).is_err());
    }

    /// Property: validated queries come back trimmed
    #[test]
    fn validated_search_is_trimmed(query in search_query_strategy(), limit in search_limit_strategy()) {
        let trimmed = validate_search(&query, limit).unwrap();
        prop_assert_eq!(trimmed, query.trim());
    }

    /// Property: a fresh entry reads back exactly what was written
    #[test]
    fn cache_returns_what_was_stored(key in "[a-z_:0-9.]{1,40}", value in cache_value_strategy()) {
        let cache = TimedCache::new();
        cache.insert(&key, &value, Duration::from_secs(60));
        prop_assert_eq!(cache.get_fresh(&key), Some(value));
    }

    /// Property: title casing is idempotent on ASCII text
    #[test]
    fn title_case_is_idempotent(text in "[a-zA-Z ]{0,40}") {
        let once = title_case(&text);
        prop_assert_eq!(title_case(&once), once.clone());
    }

    /// Property: the modal value occurs at least as often as any other
    #[test]
    fn modal_is_a_most_frequent_value(values in prop::collection::vec("(Rain|Clouds|Clear|Snow)", 1..24)) {
        let winner = modal(&values).unwrap();
        let count = |v: &str| values.iter().filter(|x| x.as_str() == v).count();
        let best = count(winner);
        prop_assert!(values.iter().all(|v| count(v) <= best));
    }
}
