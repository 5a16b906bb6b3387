//! FAQ handler.

use axum::Json;
use serde_json::{Value, json};

use crate::error::Result;

/// Question and answer pairs shown in the mini-app help screen.
const FAQ_ENTRIES: &[(&str, &str)] = &[
    (
        "How do I place an order?",
        "Add products to your cart, open the cart and press Checkout. \
         We will contact you to confirm delivery details.",
    ),
    (
        "How much does delivery cost?",
        "Delivery is a flat fee, and orders above the free delivery \
         threshold ship for free. The exact amounts are shown at checkout.",
    ),
    (
        "How long does delivery take?",
        "Usually 1 to 3 business days depending on your location.",
    ),
    (
        "Can I change my order after placing it?",
        "Yes, contact us as soon as possible and we will adjust the order \
         before it ships.",
    ),
    (
        "How do I buy wholesale?",
        "Open the Wholesale section, leave your name and contact and we \
         will get back to you with terms and pricing.",
    ),
    (
        "How do I get notified about new products?",
        "Enable the subscription toggle in your profile and the bot will \
         message you about new arrivals and promotions.",
    ),
];

/// `GET /api/faq`
pub async fn faq() -> Result<Json<Value>> {
    let entries: Vec<Value> = FAQ_ENTRIES
        .iter()
        .map(|(question, answer)| json!({ "question": question, "answer": answer }))
        .collect();

    Ok(Json(json!({ "success": true, "faq": entries })))
}
