//! Proptest strategies for gateway inputs

use proptest::prelude::*;

pub fn latitude_strategy() -> impl Strategy<Value = f64> {
    -90.0f64..=90.0
}

pub fn longitude_strategy() -> impl Strategy<Value = f64> {
    -180.0f64..=180.0
}

pub fn forecast_days_strategy() -> impl Strategy<Value = u32> {
    1u32..=7
}

pub fn search_limit_strategy() -> impl Strategy<Value = u32> {
    1u32..=20
}

/// Place names with optional surrounding whitespace and mixed case
pub fn search_query_strategy() -> impl Strategy<Value = String> {
    ("[ ]{0,3}", "[A-Za-z][A-Za-z ]{1,20}[A-Za-z]", "[ ]{0,3}")
        .prop_map(|(lead, body, trail)| format!("{lead}{body}{trail}"))
}

pub fn cache_value_strategy() -> impl Strategy<Value = String> {
    "[ -~]{0,64}"
}
