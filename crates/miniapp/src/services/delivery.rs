//! Delivery cost calculation.

use crate::config::DeliveryConfig;

/// Delivery cost for an order with the given goods subtotal.
///
/// Empty orders cost nothing to deliver, and orders at or above the free
/// delivery threshold ship free. Everything else pays the flat base cost.
#[must_use]
pub fn delivery_cost(config: &DeliveryConfig, subtotal: f64) -> f64 {
    if subtotal <= 0.0 || subtotal >= config.free_threshold {
        0.0
    } else {
        config.base_cost
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> DeliveryConfig {
        DeliveryConfig {
            base_cost: 300.0,
            free_threshold: 5000.0,
        }
    }

    #[test]
    fn test_below_threshold_pays_base_cost() {
        assert!((delivery_cost(&config(), 4999.99) - 300.0).abs() < f64::EPSILON);
        assert!((delivery_cost(&config(), 1.0) - 300.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_at_and_above_threshold_is_free() {
        assert!(delivery_cost(&config(), 5000.0).abs() < f64::EPSILON);
        assert!(delivery_cost(&config(), 12_000.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_empty_order_is_free() {
        assert!(delivery_cost(&config(), 0.0).abs() < f64::EPSILON);
    }
}
