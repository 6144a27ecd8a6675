//! Text rendering of catalog cards in grid or list layout.

use std::fmt::Write as _;

use catalog_core::CatalogSnapshot;
use clap::ValueEnum;
use shared::domain::{Product, Rating};

const CURRENCY: &str = "₹";
const GRID_COLUMNS: usize = 2;
const GRID_CARD_WIDTH: usize = 34;
const GRID_GUTTER: &str = "   ";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Layout {
    Grid,
    List,
}

impl Layout {
    pub fn toggled(self) -> Self {
        match self {
            Layout::Grid => Layout::List,
            Layout::List => Layout::Grid,
        }
    }
}

pub fn stars(rating: &Rating) -> String {
    let filled = rating.filled_stars();
    let mut out = "★".repeat(filled);
    out.push_str(&"☆".repeat(Rating::MAX_STARS - filled));
    out
}

pub fn format_price(price: f64) -> String {
    format!("{CURRENCY}{price:.2}")
}

/// Upper-cases the first letter of every whitespace-separated word.
pub fn capitalize_words(text: &str) -> String {
    text.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn fit(text: &str, width: usize) -> String {
    let count = text.chars().count();
    if count <= width {
        let mut out = text.to_string();
        out.push_str(&" ".repeat(width - count));
        return out;
    }
    let mut out: String = text.chars().take(width.saturating_sub(1)).collect();
    out.push('…');
    out
}

fn card_lines(product: &Product, width: usize) -> Vec<String> {
    vec![
        fit(&product.title, width),
        fit(&format_price(product.price), width),
        fit(&capitalize_words(&product.category), width),
        fit(
            &format!("{} ({})", stars(&product.rating), product.rating.count),
            width,
        ),
    ]
}

fn render_grid(products: &[Product], out: &mut String) {
    for row in products.chunks(GRID_COLUMNS) {
        let cards: Vec<Vec<String>> = row
            .iter()
            .map(|product| card_lines(product, GRID_CARD_WIDTH))
            .collect();
        let height = cards.iter().map(Vec::len).max().unwrap_or(0);
        for line in 0..height {
            let joined = cards
                .iter()
                .map(|card| card.get(line).map(String::as_str).unwrap_or_default())
                .collect::<Vec<_>>()
                .join(GRID_GUTTER);
            let _ = writeln!(out, "{}", joined.trim_end());
        }
        out.push('\n');
    }
}

fn render_list(products: &[Product], out: &mut String) {
    for product in products {
        let _ = writeln!(
            out,
            "#{:<4} {} | {} | {} | {}",
            product.id.0,
            product.title,
            format_price(product.price),
            capitalize_words(&product.category),
            stars(&product.rating),
        );
    }
}

pub fn render_catalog(snapshot: &CatalogSnapshot, layout: Layout) -> String {
    let mut out = String::new();
    if let Some(error) = &snapshot.last_error {
        let _ = writeln!(out, "! {error}");
    }
    if snapshot.query.is_empty() {
        let _ = writeln!(out, "{} products", snapshot.filtered.len());
    } else {
        let _ = writeln!(
            out,
            "{} of {} products match \"{}\"",
            snapshot.filtered.len(),
            snapshot.products.len(),
            snapshot.query
        );
    }
    out.push('\n');

    match layout {
        Layout::Grid => render_grid(&snapshot.filtered, &mut out),
        Layout::List => render_list(&snapshot.filtered, &mut out),
    }
    out
}

#[cfg(test)]
#[path = "tests/render_tests.rs"]
mod tests;
