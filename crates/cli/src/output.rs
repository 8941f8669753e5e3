//! Terminal rendering.
//!
//! Results go to stdout; notices about failures go to stderr.

#![allow(clippy::print_stdout, clippy::print_stderr)]

use qkart_client::{CartView, CheckoutReceipt, Session, Severity};
use qkart_core::{AddressBook, Product};

use crate::error::CliError;

const fn label(severity: Severity) -> &'static str {
    match severity {
        Severity::Info => "info",
        Severity::Success => "ok",
        Severity::Warning => "warning",
        Severity::Error => "error",
    }
}

/// Print a one-line notice.
pub fn notice(severity: Severity, message: &str) {
    match severity {
        Severity::Info | Severity::Success => println!("[{}] {message}", label(severity)),
        Severity::Warning | Severity::Error => eprintln!("[{}] {message}", label(severity)),
    }
}

/// Print the notice for a failed command.
pub fn failure(err: &CliError) {
    notice(err.severity(), &err.user_message());
}

pub fn products(products: &[Product]) {
    if products.is_empty() {
        notice(Severity::Info, "No products found");
        return;
    }
    for product in products {
        println!(
            "{:<18} {:<40} {:<14} {:>8}  {}/5",
            product.id,
            product.name,
            product.category,
            product.cost.to_string(),
            product.rating.value()
        );
    }
}

pub fn cart(view: &CartView) {
    if view.is_empty() {
        notice(
            Severity::Info,
            "Cart is empty. Add more items to the cart to checkout",
        );
        return;
    }
    for item in &view.items {
        println!(
            "{:<18} {:<40} {:>3} x {:>8} = {:>9}",
            item.product.id,
            item.product.name,
            item.qty.get(),
            item.product.cost.to_string(),
            item.subtotal().to_string()
        );
    }
    println!("Items: {}", view.total_count);
    println!("Total: {}", view.total_value);
}

pub fn addresses(book: &AddressBook) {
    if book.is_empty() {
        notice(Severity::Info, "No addresses found for this account");
        return;
    }
    let selected = book.selected();
    for address in book.all() {
        let marker = if Some(&address.id) == selected { '*' } else { ' ' };
        println!("{marker} {:<18} {}", address.id, address.address);
    }
}

pub fn receipt(receipt: &CheckoutReceipt) {
    notice(Severity::Success, "Order placed successfully");
    println!("Shipping to: {}", receipt.address_id);
    println!("Charged:     {}", receipt.total_value);
    println!("Balance:     {}", receipt.remaining_balance);
}

pub fn session(session: Option<&Session>) {
    match session {
        Some(session) => {
            println!("Logged in as {}", session.username());
            println!("Wallet balance: {}", session.balance());
        }
        None => notice(Severity::Info, "Not logged in"),
    }
}
