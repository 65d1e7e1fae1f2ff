//! Electricity Price Watcher

use crate::PricingConfig;
use alerting::{AlertDispatcher, AlertError, AlertLevel, Subscriber};
use std::sync::Arc;
use tracing::{info, warn};

/// Tracks the electricity price and alerts on every update above the cost
/// threshold.
///
/// Unlike the temperature check there is no re-arm state: consecutive
/// expensive readings each raise their own alert.
pub struct PriceWatcher {
    current_price: f64,
    cost_threshold: f64,
    /// Every price seen, oldest first; the last entry is the current price
    history: Vec<f64>,
    dispatcher: Arc<AlertDispatcher>,
}

impl PriceWatcher {
    /// Create a watcher seeded with the configured initial price
    pub fn new(config: &PricingConfig, dispatcher: Arc<AlertDispatcher>) -> Self {
        Self {
            current_price: config.initial_price,
            cost_threshold: config.cost_threshold,
            history: vec![config.initial_price],
            dispatcher,
        }
    }

    /// Record a new price and alert `subscribers` if it exceeds the threshold.
    ///
    /// Returns `true` when an alert was raised.
    pub fn record_price(
        &mut self,
        new_price: f64,
        subscribers: &[Subscriber],
    ) -> Result<bool, AlertError> {
        self.current_price = new_price;
        self.history.push(new_price);
        info!("Electricity Price Updated: ${:.2}", new_price);

        // NaN never exceeds the threshold
        if new_price > self.cost_threshold {
            warn!(
                "Electricity price ${:.2} exceeds threshold ${:.2}",
                new_price, self.cost_threshold
            );
            self.dispatcher.raise(
                "Electricity Pricing",
                AlertLevel::Critical,
                "ElectricityPricing",
                subscribers,
            )?;
            return Ok(true);
        }
        Ok(false)
    }

    /// Most recently recorded price
    pub fn current_price(&self) -> f64 {
        self.current_price
    }

    /// Price above which an alert is raised
    pub fn cost_threshold(&self) -> f64 {
        self.cost_threshold
    }

    /// Copy of the price history
    pub fn price_history(&self) -> Vec<f64> {
        self.history.clone()
    }

    /// Current price formatted for display
    pub fn display_price(&self) -> String {
        format!("Current Electricity Price: ${:.2}", self.current_price)
    }
}
