//! Gnuplot-style dump of a market's clearing curves.
//!
//! Renders both cumulative curves as staircase line data: the ask curve
//! rises left-to-right, the bid curve is walked from its best (highest)
//! price down and extended to the price axis. Purely diagnostic output.

use std::fmt::Write;

use clearex_types::PricePoint;

/// Render the two depth curves as a two-dataset gnuplot block.
#[must_use]
pub fn plot_curves(bids: &[PricePoint], asks: &[PricePoint]) -> String {
    let mut out = String::new();
    out.push_str("\"Ask\"\n");

    for (i, entry) in asks.iter().enumerate() {
        if i == 0 {
            let _ = writeln!(out, "{} 0", entry.price);
        } else {
            let _ = writeln!(out, "{} {}", entry.price, asks[i - 1].quantity);
        }
        let _ = writeln!(out, "{} {}", entry.price, entry.quantity);
    }

    out.push_str("\n\n");
    out.push_str("\"Bid\"\n");

    for (i, entry) in bids.iter().enumerate().rev() {
        if i == bids.len() - 1 {
            let _ = writeln!(out, "{} 0", entry.price);
        } else {
            let _ = writeln!(out, "{} {}", entry.price, bids[i + 1].quantity);
        }
        let _ = writeln!(out, "{} {}", entry.price, entry.quantity);
        if i == 0 {
            let _ = writeln!(out, "0 {}", entry.quantity);
        }
    }

    out
}
