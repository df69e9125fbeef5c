use serde::Serialize;

use crate::fields::{parse_amount, FieldError};

/// Cards listed on the account dashboard.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Overview {
    pub cards: Vec<Card>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Card {
    /// Either the name the card was given or its number.
    pub name: String,
    /// Balance in cents.
    pub balance: i64,
}

impl Card {
    /// Build a card from its name cell and balance cell.
    ///
    /// Cards can be renamed to almost anything, so the name is kept as is.
    pub fn from_cells(name: &str, balance: &str) -> Result<Self, FieldError> {
        Ok(Self {
            name: name.to_string(),
            balance: parse_amount(balance)?,
        })
    }
}
