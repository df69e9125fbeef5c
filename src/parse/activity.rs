use chrono_tz::Tz;
use scraper::ElementRef;

use crate::error::{Error, Page, Result};
use crate::fields::{optional, parse_amount, parse_decimal, parse_timestamp, FieldError};
use crate::html;
use crate::models::{Activity, Transaction};

use super::{document, table_by_id, tbody};

const TRANSACTIONS_TABLE: &str = "transaction-data";

/// Cells per transaction row.
const ROW_CELLS: usize = 9;

/// Parse a page of card activity, reading timestamps as wall-clock time
/// in `zone`.
pub fn parse_activity(input: &[u8], zone: Tz) -> Result<Activity> {
    let doc = document(input);
    let table = table_by_id(&doc, Page::Activity, TRANSACTIONS_TABLE)?;

    // The caption looks like
    //   <caption><span>My Opal activity: 314159</span></caption>
    let caption = html::find_by_name(table, "caption")
        .ok_or_else(|| Error::missing(Page::Activity, "<caption>"))?;
    let caption = html::text(caption);
    let card_name = match caption.split_once(':') {
        Some((_, name)) => name.trim().to_string(),
        None => caption.trim().to_string(),
    };

    let tbody = tbody(table, Page::Activity)?;

    let mut transactions = Vec::new();
    let mut failure = None;
    let mut row_number = 0;
    html::each_by_name(tbody, "tr", &mut |row| {
        if failure.is_some() {
            return false;
        }
        row_number += 1;
        match parse_transaction(row, row_number, zone) {
            Ok(transaction) => transactions.push(transaction),
            Err(err) => failure = Some(err),
        }
        false
    });
    if let Some(err) = failure {
        return Err(err);
    }

    Ok(Activity {
        card_name,
        transactions,
    })
}

/// The value of one `<td>`: the alt text of a leading image (the mode
/// icons), otherwise the trimmed text.
fn cell_value(cell: ElementRef<'_>) -> String {
    let first = cell.children().find(|node| {
        let value = node.value();
        !value.is_comment() && value.as_text().map_or(true, |text| !text.trim().is_empty())
    });
    match first.and_then(ElementRef::wrap) {
        Some(img) if img.value().name() == "img" => {
            html::attr(img, "alt").unwrap_or_default().to_string()
        }
        _ => html::text(cell).trim().to_string(),
    }
}

fn parse_transaction(row: ElementRef<'_>, row_number: usize, zone: Tz) -> Result<Transaction> {
    let cells: Vec<String> = html::children_named(row, "td").map(cell_value).collect();
    if cells.len() != ROW_CELLS {
        return Err(Error::structure(
            Page::Activity,
            format!(
                "transaction row {row_number} has {} cells, want {ROW_CELLS}",
                cells.len()
            ),
        ));
    }

    let bad = |what: &str| {
        let context = format!("bad {what} in transaction row {row_number}");
        move |err: FieldError| Error::field(Page::Activity, context, err)
    };

    let number = parse_decimal(&cells[0]).map_err(bad("transaction number"))?;
    // The cell is "Tue<br>29/09/2015<br>07:47".
    let when = cells[1].split_whitespace().collect::<Vec<_>>().join(" ");
    let when = parse_timestamp(&when, zone).map_err(bad("time"))?;

    // The rest may be blank.
    let journey_number = optional(&cells[4], parse_decimal).map_err(bad("journey number"))?;
    let fare = optional(&cells[6], parse_amount).map_err(bad("fare"))?;
    let discount = optional(&cells[7], parse_amount).map_err(bad("discount"))?;
    let amount = optional(&cells[8], parse_amount).map_err(bad("amount"))?;

    Ok(Transaction {
        number,
        when,
        mode: cells[2].clone(),
        // Long place names carry soft hyphens for line breaking.
        details: cells[3].replace('\u{ad}', "").trim().to_string(),
        journey_number: journey_number.unwrap_or_default(),
        fare_applied: cells[5].clone(),
        fare: fare.unwrap_or_default(),
        discount: discount.unwrap_or_default(),
        amount: amount.unwrap_or_default(),
    })
}
