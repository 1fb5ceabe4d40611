//! Earnings projection from price and sales volume
//!
//! Mirrors the gain-calculator screen: price and daily volume are clamped to
//! the slider ranges, projections are whole reais.

use serde::{Deserialize, Serialize};

pub const MIN_PRICE: u32 = 5;
pub const MAX_PRICE: u32 = 200;
pub const MIN_SALES_PER_DAY: u32 = 1;
pub const MAX_SALES_PER_DAY: u32 = 20;

/// Simulation input, clamped to the supported ranges on construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EarningsInput {
    price_per_sale: u32,
    sales_per_day: u32,
}

impl EarningsInput {
    pub fn new(price_per_sale: u32, sales_per_day: u32) -> Self {
        Self {
            price_per_sale: price_per_sale.clamp(MIN_PRICE, MAX_PRICE),
            sales_per_day: sales_per_day.clamp(MIN_SALES_PER_DAY, MAX_SALES_PER_DAY),
        }
    }

    pub fn price_per_sale(&self) -> u32 {
        self.price_per_sale
    }

    pub fn sales_per_day(&self) -> u32 {
        self.sales_per_day
    }

    pub fn project(&self) -> EarningsProjection {
        let daily = u64::from(self.price_per_sale) * u64::from(self.sales_per_day);
        EarningsProjection {
            daily,
            weekly: daily * 7,
            monthly: daily * 30,
            yearly: daily * 365,
        }
    }
}

impl Default for EarningsInput {
    /// The calculator's starting position: R$ 25 per service, 3 sales a day.
    fn default() -> Self {
        Self::new(25, 3)
    }
}

/// Projected earnings in whole reais.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EarningsProjection {
    pub daily: u64,
    pub weekly: u64,
    pub monthly: u64,
    pub yearly: u64,
}

/// Format a whole-real amount the way the screens display it, e.g.
/// `R$ 27.375,00`.
pub fn format_brl(amount: u64) -> String {
    let digits = amount.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(c);
    }
    format!("R$ {},00", grouped)
}
