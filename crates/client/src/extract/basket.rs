//! Basket extraction from the "products to collect" page.
//!
//! The page carries a `table#table-summary` whose first row holds one header
//! cell per distribution date and whose second row holds, in the same column
//! order, the products to collect on that date:
//!
//! ```html
//! <table id="table-summary">
//!   <tr><th>vendredi 10 mai</th><th>vendredi 17 mai</th></tr>
//!   <tr>
//!     <td><div class="product"><div class="product-quantity">2</div>oranges</div></td>
//!     <td></td>
//!   </tr>
//! </table>
//! ```

use scraper::{ElementRef, Html, Selector};

use super::stripped_text;
use amap_core::{BasketSnapshot, Error};

/// Name used when a product block has no name text.
const DEFAULT_PRODUCT_NAME: &str = "Produit";

/// Parse the summary table into a snapshot.
///
/// # Errors
///
/// `Error::Parse` when the table is missing or has fewer than two rows.
pub fn extract_basket(html: &str) -> Result<BasketSnapshot, Error> {
    let document = Html::parse_document(html);
    let table_sel = Selector::parse("table#table-summary").expect("invalid selector");
    let row_sel = Selector::parse("tr").expect("invalid selector");
    let th_sel = Selector::parse("th").expect("invalid selector");
    let td_sel = Selector::parse("td").expect("invalid selector");

    let table = document
        .select(&table_sel)
        .next()
        .ok_or_else(|| Error::Parse("summary table not found".into()))?;

    let rows: Vec<ElementRef<'_>> = table.select(&row_sel).collect();
    let [header, cells_row, ..] = rows.as_slice() else {
        return Err(Error::Parse(format!("summary table has {} row(s), expected at least 2", rows.len())));
    };

    let labels = header
        .select(&th_sel)
        .map(|th| stripped_text(&th))
        .filter(|label| !label.is_empty());
    let cells: Vec<ElementRef<'_>> = cells_row.select(&td_sel).collect();

    let snapshot: BasketSnapshot = labels
        .zip(cells.iter())
        .map(|(label, cell)| (label, products_in(cell)))
        .collect();

    tracing::debug!(dates = snapshot.len(), "parsed basket summary");
    Ok(snapshot)
}

/// "quantity x name" for each product block of a cell, in document order.
fn products_in(cell: &ElementRef<'_>) -> Vec<String> {
    let product_sel = Selector::parse("div.product").expect("invalid selector");
    let quantity_sel = Selector::parse("div.product-quantity").expect("invalid selector");

    cell.select(&product_sel)
        .filter_map(|product| {
            let quantity = product.select(&quantity_sel).next()?;
            let name = quantity
                .next_sibling()
                .and_then(|node| node.value().as_text())
                .map(|text| text.trim())
                .filter(|text| !text.is_empty())
                .unwrap_or(DEFAULT_PRODUCT_NAME);
            Some(format!("{} x {}", stripped_text(&quantity), name))
        })
        .collect()
}
