use crate::arbitrage::ArbitragePolicy;
use crate::best_limit::BestLimitPolicy;
use crate::error::AlgoError;
use crate::execution::AlgoParams;
use crate::grid::GridPolicy;
use crate::iceberg::IcebergPolicy;
use crate::sniper::SniperPolicy;
use crate::stop::StopPolicy;
use crate::twap::TwapPolicy;
use crate::AlgoPolicy;
use core_types::AlgoKind;
use serde_json::{from_value, Value};

/// Creates a policy instance from the start request's JSON setting.
///
/// Each policy deserializes the setting into its typed parameter struct and
/// validates it; both a malformed setting and an invalid parameter value
/// fail the start request before any subscription or order placement.
pub fn create_policy(
    kind: AlgoKind,
    algo: &AlgoParams,
    setting: &Value,
) -> Result<Box<dyn AlgoPolicy>, AlgoError> {
    // The compiler will error here if a new AlgoKind is added but not handled.
    match kind {
        AlgoKind::Twap => Ok(Box::new(TwapPolicy::new(from_value(setting.clone())?, algo)?)),
        AlgoKind::Iceberg => Ok(Box::new(IcebergPolicy::new(from_value(setting.clone())?)?)),
        AlgoKind::Sniper => Ok(Box::new(SniperPolicy::new())),
        AlgoKind::Stop => Ok(Box::new(StopPolicy::new(from_value(setting.clone())?)?)),
        AlgoKind::BestLimit => Ok(Box::new(BestLimitPolicy::new(from_value(setting.clone())?)?)),
        AlgoKind::Grid => Ok(Box::new(GridPolicy::new(from_value(setting.clone())?)?)),
        AlgoKind::Arbitrage => Ok(Box::new(ArbitragePolicy::new(from_value(setting.clone())?)?)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::{Offset, OrderSide};
    use rust_decimal_macros::dec;
    use serde_json::json;

    fn algo() -> AlgoParams {
        AlgoParams {
            symbol: "IF2301".to_string(),
            side: OrderSide::Buy,
            offset: Offset::Open,
            price: dec!(100),
            volume: dec!(50),
        }
    }

    #[test]
    fn builds_every_kind_from_json() {
        let cases: Vec<(AlgoKind, Value)> = vec![
            (AlgoKind::Twap, json!({ "time": 600, "interval": 60 })),
            (AlgoKind::Iceberg, json!({ "display_volume": "10", "interval": 5 })),
            (AlgoKind::Sniper, json!({})),
            (AlgoKind::Stop, json!({ "price_add": "0.5" })),
            (AlgoKind::BestLimit, json!({ "min_volume": "1", "max_volume": "5" })),
            (
                AlgoKind::Grid,
                json!({ "step_price": "2", "step_volume": "1", "interval": 5 }),
            ),
            (
                AlgoKind::Arbitrage,
                json!({
                    "passive_symbol": "IF2306",
                    "spread_up": "5",
                    "spread_down": "5",
                    "max_pos": "10",
                    "interval": 5
                }),
            ),
        ];

        for (kind, setting) in cases {
            assert!(create_policy(kind, &algo(), &setting).is_ok(), "{kind} failed");
        }
    }

    #[test]
    fn malformed_setting_fails() {
        let err = create_policy(AlgoKind::Twap, &algo(), &json!({ "time": "soon" }));
        assert!(matches!(err, Err(AlgoError::Setting(_))));
    }

    #[test]
    fn invalid_parameters_fail() {
        let err = create_policy(
            AlgoKind::BestLimit,
            &algo(),
            &json!({ "min_volume": "10", "max_volume": "5" }),
        );
        assert!(matches!(err, Err(AlgoError::InvalidParameters(_))));
    }
}
