use crate::error::{Error, Page, Result};
use crate::html;
use crate::models::{Card, Overview};

use super::{document, table_by_id, tbody};

const ACTIVE_CARDS_TABLE: &str = "dashboard-active-cards";

// Rows look like [select control, card name, card type, balance, status].
const NAME_CELL: usize = 1;
const BALANCE_CELL: usize = 3;

/// Parse the account dashboard (`/registered/index`).
pub fn parse_overview(input: &[u8]) -> Result<Overview> {
    let doc = document(input);
    let table = table_by_id(&doc, Page::Overview, ACTIVE_CARDS_TABLE)?;
    let tbody = tbody(table, Page::Overview)?;

    // One entry per card row: (row number, name, balance).
    let mut card_rows = Vec::new();
    let mut row_number = 0;
    html::each_by_name(tbody, "tr", &mut |row| {
        row_number += 1;
        let mut cells = Vec::new();
        html::each_by_name(row, "td", &mut |td| {
            cells.push(html::text(td).trim().to_string());
            false
        });
        if let (Some(name), Some(balance)) = (cells.get(NAME_CELL), cells.get(BALANCE_CELL)) {
            card_rows.push((row_number, name.clone(), balance.clone()));
        }
        false
    });

    let cards = card_rows
        .into_iter()
        .map(|(row, name, balance)| {
            Card::from_cells(&name, &balance)
                .map_err(|err| Error::field(Page::Overview, format!("bad balance in card row {row}"), err))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(Overview { cards })
}
