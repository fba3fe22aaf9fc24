//! Price alerts with a re-trigger cooldown

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::shared::errors::AlertError;
use crate::shared::utils::generate_id;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertDirection {
    Above,
    Below,
}

impl FromStr for AlertDirection {
    type Err = AlertError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "above" => Ok(AlertDirection::Above),
            "below" => Ok(AlertDirection::Below),
            other => Err(AlertError::InvalidDirection(other.to_string())),
        }
    }
}

impl fmt::Display for AlertDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlertDirection::Above => write!(f, "above"),
            AlertDirection::Below => write!(f, "below"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceAlert {
    pub id: String,
    pub coin_id: String,
    pub price: f64,
    pub direction: AlertDirection,
    pub created: DateTime<Utc>,
    #[serde(default)]
    pub last_triggered: Option<DateTime<Utc>>,
}

impl PriceAlert {
    pub fn new(
        coin_id: &str,
        price: f64,
        direction: AlertDirection,
        now: DateTime<Utc>,
    ) -> Result<Self, AlertError> {
        if !price.is_finite() || price <= 0.0 {
            return Err(AlertError::InvalidPrice(price));
        }

        Ok(Self {
            id: generate_id(),
            coin_id: coin_id.to_string(),
            price,
            direction,
            created: now,
            last_triggered: None,
        })
    }

    pub fn condition_met(&self, current_price: f64) -> bool {
        match self.direction {
            AlertDirection::Above => current_price >= self.price,
            AlertDirection::Below => current_price <= self.price,
        }
    }

    /// Fire at most once per cooldown window; a firing is recorded on the alert.
    pub fn should_trigger(&mut self, current_price: f64, now: DateTime<Utc>, cooldown: Duration) -> bool {
        if let Some(last) = self.last_triggered {
            if now - last < cooldown {
                return false;
            }
        }

        if self.condition_met(current_price) {
            self.last_triggered = Some(now);
            true
        } else {
            false
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TriggeredAlert {
    pub alert_id: String,
    pub coin_id: String,
    pub direction: AlertDirection,
    pub target_price: f64,
    pub current_price: f64,
}

impl TriggeredAlert {
    pub fn message(&self) -> String {
        let verb = match self.direction {
            AlertDirection::Above => "broke above",
            AlertDirection::Below => "fell below",
        };
        format!(
            "{} {} {} (now {})",
            self.coin_id, verb, self.target_price, self.current_price
        )
    }
}

/// The full set of configured alerts
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AlertBook {
    alerts: Vec<PriceAlert>,
}

impl AlertBook {
    pub fn new(alerts: Vec<PriceAlert>) -> Self {
        Self { alerts }
    }

    pub fn alerts(&self) -> &[PriceAlert] {
        &self.alerts
    }

    pub fn is_empty(&self) -> bool {
        self.alerts.is_empty()
    }

    pub fn add(&mut self, alert: PriceAlert) -> &PriceAlert {
        self.alerts.push(alert);
        &self.alerts[self.alerts.len() - 1]
    }

    pub fn remove(&mut self, alert_id: &str) -> Result<PriceAlert, AlertError> {
        let index = self
            .alerts
            .iter()
            .position(|a| a.id == alert_id)
            .ok_or_else(|| AlertError::NotFound(alert_id.to_string()))?;
        Ok(self.alerts.remove(index))
    }

    /// Check every alert against current prices keyed by coin id.
    /// Coins without a price are skipped.
    pub fn check(
        &mut self,
        prices: &HashMap<String, f64>,
        now: DateTime<Utc>,
        cooldown: Duration,
    ) -> Vec<TriggeredAlert> {
        let mut triggered = Vec::new();

        for alert in self.alerts.iter_mut() {
            let Some(&current_price) = prices.get(&alert.coin_id) else {
                continue;
            };

            if alert.should_trigger(current_price, now, cooldown) {
                triggered.push(TriggeredAlert {
                    alert_id: alert.id.clone(),
                    coin_id: alert.coin_id.clone(),
                    direction: alert.direction,
                    target_price: alert.price,
                    current_price,
                });
            }
        }

        triggered
    }
}
