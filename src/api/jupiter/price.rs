use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::Deserialize;
use serde_with::{DisplayFromStr, serde_as};

#[derive(Debug, Deserialize)]
pub(super) struct PriceResponse {
    #[serde(default)]
    pub data: HashMap<String, Option<PriceEntry>>,
}

#[serde_as]
#[derive(Debug, Deserialize)]
pub(super) struct PriceEntry {
    #[serde_as(as = "DisplayFromStr")]
    pub price: Decimal,
}

impl PriceResponse {
    pub(super) fn price_of(&self, mint: &str) -> Option<Decimal> {
        self.data
            .get(mint)
            .and_then(|entry| entry.as_ref())
            .map(|entry| entry.price)
    }
}
