//! Request validation
//!
//! Rules run in a fixed order and short-circuit on the first violation,
//! before any external call is made.

use crate::error::{GatewayError, GatewayResult};
use crate::types::{Condition, RawTariffRequest, TariffRequest};

/// Validate an untyped request body into a [`TariffRequest`]
pub fn validate(raw: RawTariffRequest) -> GatewayResult<TariffRequest> {
    if !(1..=10).contains(&raw.exporter) {
        return Err(GatewayError::validation(
            "exporter must be an integer between 1 and 10",
        ));
    }
    if !(1..=10).contains(&raw.importer) {
        return Err(GatewayError::validation(
            "importer must be an integer between 1 and 10",
        ));
    }
    if raw.exporter == raw.importer {
        return Err(GatewayError::validation(
            "exporter and importer cannot be the same country",
        ));
    }
    if !(1..=8).contains(&raw.category) {
        return Err(GatewayError::validation(
            "category must be an integer between 1 and 8",
        ));
    }
    if raw.declared_value <= 0 {
        return Err(GatewayError::validation(
            "declared_value must be a positive integer",
        ));
    }
    let condition = Condition::from_code(raw.condition).ok_or_else(|| {
        GatewayError::validation("condition must be 1 (Normal), 2 (Preferential), or 3 (Penalty)")
    })?;

    Ok(TariffRequest {
        exporter: raw.exporter as u8,
        importer: raw.importer as u8,
        category: raw.category as u8,
        declared_value: raw.declared_value as u64,
        condition,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(exporter: i64, importer: i64, category: i64, value: i64, condition: i64) -> RawTariffRequest {
        RawTariffRequest {
            exporter,
            importer,
            category,
            declared_value: value,
            condition,
        }
    }

    #[test]
    fn valid_request_passes() {
        let request = validate(raw(1, 2, 3, 100_000, 1)).unwrap();
        assert_eq!(request.exporter, 1);
        assert_eq!(request.importer, 2);
        assert_eq!(request.category, 3);
        assert_eq!(request.declared_value, 100_000);
        assert_eq!(request.condition, Condition::Normal);
    }

    #[test]
    fn same_country_fails_for_all_pairs() {
        // Regardless of the other fields being valid or not.
        for country in 1..=10 {
            for (value, condition) in [(100, 1), (0, 9)] {
                let err = validate(raw(country, country, 1, value, condition)).unwrap_err();
                assert_eq!(
                    err.to_string(),
                    "exporter and importer cannot be the same country"
                );
            }
        }
    }

    #[test]
    fn country_ids_are_range_checked() {
        for bad in [0, 11, -1, 1000] {
            let err = validate(raw(bad, 2, 1, 100, 1)).unwrap_err();
            assert_eq!(err.to_string(), "exporter must be an integer between 1 and 10");

            let err = validate(raw(2, bad, 1, 100, 1)).unwrap_err();
            assert_eq!(err.to_string(), "importer must be an integer between 1 and 10");
        }
    }

    #[test]
    fn category_is_range_checked() {
        for bad in [0, 9, -3] {
            let err = validate(raw(1, 2, bad, 100, 1)).unwrap_err();
            assert_eq!(err.to_string(), "category must be an integer between 1 and 8");
        }
        for good in 1..=8 {
            assert!(validate(raw(1, 2, good, 100, 1)).is_ok());
        }
    }

    #[test]
    fn declared_value_must_be_positive() {
        for bad in [0, -1, -100_000] {
            let err = validate(raw(1, 2, 1, bad, 1)).unwrap_err();
            assert_eq!(err.to_string(), "declared_value must be a positive integer");
        }
        for good in [1, 100_000, i64::MAX] {
            assert!(validate(raw(1, 2, 1, good, 1)).is_ok());
        }
    }

    #[test]
    fn condition_must_be_known_code() {
        for bad in [0, 4, -2] {
            let err = validate(raw(1, 2, 1, 100, bad)).unwrap_err();
            assert_eq!(
                err.to_string(),
                "condition must be 1 (Normal), 2 (Preferential), or 3 (Penalty)"
            );
        }
        assert_eq!(
            validate(raw(1, 2, 1, 100, 2)).unwrap().condition,
            Condition::Preferential
        );
        assert_eq!(
            validate(raw(1, 2, 1, 100, 3)).unwrap().condition,
            Condition::Penalty
        );
    }

    #[test]
    fn first_violation_wins() {
        // Both exporter and category are bad; the exporter message reports first.
        let err = validate(raw(0, 2, 99, -5, 9)).unwrap_err();
        assert_eq!(err.to_string(), "exporter must be an integer between 1 and 10");
    }
}
