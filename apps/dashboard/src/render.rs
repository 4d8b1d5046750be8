//! Text rendering of a dashboard snapshot.

use std::fmt::Write as _;

use client_core::DashboardState;
use shared::domain::{EditMode, Product};

pub fn submit_label(mode: EditMode) -> &'static str {
    match mode {
        EditMode::Create => "Add Product",
        EditMode::Update(_) => "Update Product",
    }
}

/// Prices are stored unrounded; two decimals is display only.
pub fn product_line(product: &Product) -> String {
    format!("#{} {} - ${:.2}", product.id, product.name, product.price)
}

pub fn render(state: &DashboardState) -> String {
    let mut out = String::from("Product CRUD Dashboard\n");

    if let Some(message) = state.error_message() {
        let _ = writeln!(out, "! {message}");
    }

    let mode = state.mode();
    let editing = match mode {
        EditMode::Create => String::new(),
        EditMode::Update(id) => format!(" (editing #{id})"),
    };
    let _ = writeln!(
        out,
        "[name: {}] [price: {}] <{}>{editing}",
        state.draft.name,
        state.draft.price,
        submit_label(mode)
    );

    if state.is_loading() {
        out.push_str("Loading products...\n");
    }

    for product in &state.products {
        out.push_str("  ");
        out.push_str(&product_line(product));
        out.push('\n');
    }

    out
}
