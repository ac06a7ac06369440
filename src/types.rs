//! Request and response types for the tariff gateway

use serde::{Deserialize, Serialize};

/// Constant identifying the execution backend in responses
pub const ENGINE_NAME: &str = "dosbox";

/// Tariff regime modifier applied by the legacy engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Condition {
    Normal,
    Preferential,
    Penalty,
}

impl Condition {
    /// Map the wire code (1..=3) to a condition, `None` otherwise
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            1 => Some(Self::Normal),
            2 => Some(Self::Preferential),
            3 => Some(Self::Penalty),
            _ => None,
        }
    }

    /// Wire code echoed back in responses and passed to the engine
    pub fn code(self) -> u8 {
        match self {
            Self::Normal => 1,
            Self::Preferential => 2,
            Self::Penalty => 3,
        }
    }
}

/// Untyped request body as received on the wire
///
/// Fields must be integer-coercible: bare integers or integer-encoded
/// strings like "1" are accepted, anything else is rejected by the JSON
/// extractor before validation runs.
#[derive(Debug, Clone, Deserialize)]
pub struct RawTariffRequest {
    #[serde(deserialize_with = "coercible_int")]
    pub exporter: i64,
    #[serde(deserialize_with = "coercible_int")]
    pub importer: i64,
    #[serde(deserialize_with = "coercible_int")]
    pub category: i64,
    #[serde(deserialize_with = "coercible_int")]
    pub declared_value: i64,
    #[serde(deserialize_with = "coercible_int")]
    pub condition: i64,
}

/// Deserialize an integer that may arrive as a JSON number or as a string
fn coercible_int<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    struct IntOrString;

    impl serde::de::Visitor<'_> for IntOrString {
        type Value = i64;

        fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
            formatter.write_str("an integer or an integer-encoded string")
        }

        fn visit_i64<E: serde::de::Error>(self, value: i64) -> Result<i64, E> {
            Ok(value)
        }

        fn visit_u64<E: serde::de::Error>(self, value: u64) -> Result<i64, E> {
            i64::try_from(value).map_err(|_| E::custom("integer out of range"))
        }

        fn visit_str<E: serde::de::Error>(self, value: &str) -> Result<i64, E> {
            value
                .trim()
                .parse()
                .map_err(|_| E::custom(format!("invalid integer string {value:?}")))
        }
    }

    deserializer.deserialize_any(IntOrString)
}

/// Fully validated tariff request
///
/// Invariant: every field is range-checked before any external call is made.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TariffRequest {
    pub exporter: u8,
    pub importer: u8,
    pub category: u8,
    pub declared_value: u64,
    pub condition: Condition,
}

/// Parsed output of one legacy engine run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineOutput {
    /// e.g. "22.00%"
    pub base_tariff: String,
    /// e.g. "17.00%"
    pub effective_tariff: String,
    pub duty_payable: u64,
}

/// Success response body: echo of the inputs plus the engine results
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TariffResponse {
    pub exporter: u8,
    pub importer: u8,
    pub category: u8,
    pub declared_value: u64,
    pub condition: u8,
    pub base_tariff: String,
    pub effective_tariff: String,
    pub duty_payable: u64,
    pub engine: String,
    pub ai_assisted: bool,
}

impl TariffResponse {
    pub fn new(request: &TariffRequest, output: EngineOutput, ai_assisted: bool) -> Self {
        Self {
            exporter: request.exporter,
            importer: request.importer,
            category: request.category,
            declared_value: request.declared_value,
            condition: request.condition.code(),
            base_tariff: output.base_tariff,
            effective_tariff: output.effective_tariff,
            duty_payable: output.duty_payable,
            engine: ENGINE_NAME.to_string(),
            ai_assisted,
        }
    }
}
