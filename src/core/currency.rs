//! Currency conversion abstractions

use crate::core::error::Result;
use async_trait::async_trait;
use std::fmt::Display;

#[async_trait]
pub trait CurrencyRateProvider: Send + Sync {
    /// Returns how many units of `quote` one unit of `base` buys.
    async fn get_rate(&self, base: &str, quote: &str) -> Result<f64>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Currency {
    Usd,
    Brl,
}

impl Currency {
    pub fn code(&self) -> &'static str {
        match self {
            Currency::Usd => "USD",
            Currency::Brl => "BRL",
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Currency::Usd => "$",
            Currency::Brl => "R$",
        }
    }
}

impl Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// The currency values are displayed in, together with the multiplier that
/// turns a USD amount into it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurrencyDisplay {
    currency: Currency,
    rate: f64,
}

impl CurrencyDisplay {
    pub fn usd() -> Self {
        Self {
            currency: Currency::Usd,
            rate: 1.0,
        }
    }

    /// Resolves the toggle state against the rate fetched so far.
    ///
    /// BRL is only shown once a usable rate is present; until then the
    /// display stays in USD.
    pub fn resolve(brl_enabled: bool, rate: Option<f64>) -> Self {
        match rate {
            Some(rate) if brl_enabled && rate.is_finite() && rate > 0.0 => Self {
                currency: Currency::Brl,
                rate,
            },
            _ => Self::usd(),
        }
    }

    pub fn currency(&self) -> Currency {
        self.currency
    }

    pub fn convert(&self, usd: f64) -> f64 {
        match self.currency {
            Currency::Usd => usd,
            Currency::Brl => usd * self.rate,
        }
    }
}

impl Default for CurrencyDisplay {
    fn default() -> Self {
        Self::usd()
    }
}
