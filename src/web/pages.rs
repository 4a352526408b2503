use rand::seq::IndexedRandom;
use rand::Rng;

use crate::models::Order;

// ============================================================================
// HTML pages
// ============================================================================

const FIRST_NAMES: &[&str] = &[
    "Alice", "Bruno", "Chloe", "Dmitri", "Emma", "Farah", "Gustavo", "Hana", "Ivan", "Julia",
    "Kenji", "Lena", "Mateo", "Nadia", "Oscar", "Priya",
];

const LAST_NAMES: &[&str] = &[
    "Smith", "Garcia", "Nakamura", "Okafor", "Novak", "Jensen", "Silva", "Moreau", "Kowalski",
    "Haddad", "Larsen", "Ivanova",
];

/// Random sample values used to prefill the order form.
pub fn sample_customer_and_amount() -> (String, String) {
    let mut rng = rand::rng();
    let first = FIRST_NAMES.choose(&mut rng).copied().unwrap_or("Alice");
    let last = LAST_NAMES.choose(&mut rng).copied().unwrap_or("Smith");
    let amount: f64 = rng.random_range(0.0..100.0);
    (format!("{first} {last}"), format!("{amount:.2}"))
}

pub fn escape_html(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn layout(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head><meta charset=\"utf-8\"><title>{}</title></head>\n<body>\n{}\n</body>\n</html>\n",
        escape_html(title),
        body
    )
}

pub fn order_form(customer: &str, amount: &str) -> String {
    layout(
        "Submit an order",
        &format!(
            "<h1>Submit an order</h1>\n\
             <form method=\"post\" action=\"/\">\n\
             <label>Customer <input type=\"text\" name=\"customer\" value=\"{}\"></label>\n\
             <label>Amount <input type=\"text\" name=\"amount\" value=\"{}\"></label>\n\
             <button type=\"submit\">Send</button>\n\
             </form>",
            escape_html(customer),
            escape_html(amount)
        ),
    )
}

pub fn order_view(order: &Order) -> String {
    layout(
        "Order",
        &format!(
            "<h1>Order</h1>\n<dl>\n\
             <dt>Id</dt><dd>{}</dd>\n\
             <dt>Customer</dt><dd>{}</dd>\n\
             <dt>Amount</dt><dd>{}</dd>\n\
             </dl>\n<a href=\"/\">New order</a>",
            order.id,
            escape_html(&order.customer),
            escape_html(&order.amount)
        ),
    )
}

pub fn error_page(title: &str, message: &str) -> String {
    layout(
        title,
        &format!(
            "<h1>{}</h1>\n<p>{}</p>\n<a href=\"/\">Back</a>",
            escape_html(title),
            escape_html(message)
        ),
    )
}
