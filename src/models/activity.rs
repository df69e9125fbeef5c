use chrono::DateTime;
use chrono_tz::Tz;
use serde::Serialize;

/// Which card, and which page of its history, to fetch.
///
/// Page 0 holds the most recent transactions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ActivityRequest {
    pub card_index: usize,
    pub page: usize,
}

impl ActivityRequest {
    pub fn new(card_index: usize) -> Self {
        Self {
            card_index,
            page: 0,
        }
    }

    pub fn with_page(mut self, page: usize) -> Self {
        self.page = page;
        self
    }
}

/// One page of a card's transaction history, in the order the portal
/// lists it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Activity {
    pub card_name: String,
    pub transactions: Vec<Transaction>,
}

/// A row of the activity table.
///
/// Numeric fields the portal left blank are zero; `mode` and
/// `fare_applied` may be empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Transaction {
    pub number: u32,
    pub when: DateTime<Tz>,
    /// "train", "bus", "ferry", ... when known.
    pub mode: String,
    pub details: String,
    /// Numbered within the week.
    pub journey_number: u32,
    /// e.g. "Off-peak", "Default fare".
    pub fare_applied: String,

    // In cents.
    pub fare: i64,
    pub discount: i64,
    /// Negative for debits.
    pub amount: i64,
}
