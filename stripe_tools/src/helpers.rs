use crate::NewCheckoutSession;

/// Encodes a session request in Stripe's bracketed form syntax, e.g. `line_items[0][price_data][currency]=usd`.
pub fn checkout_session_form(session: &NewCheckoutSession) -> Vec<(String, String)> {
    let mut form = vec![
        ("mode".to_string(), "payment".to_string()),
        ("payment_method_types[0]".to_string(), "card".to_string()),
        ("success_url".to_string(), session.success_url.clone()),
        ("cancel_url".to_string(), session.cancel_url.clone()),
        ("expires_at".to_string(), session.expires_at.timestamp().to_string()),
    ];
    for (i, item) in session.line_items.iter().enumerate() {
        let prefix = format!("line_items[{i}]");
        form.push((format!("{prefix}[price_data][currency]"), session.currency.clone()));
        form.push((format!("{prefix}[price_data][product_data][name]"), item.name.clone()));
        if !item.description.is_empty() {
            form.push((format!("{prefix}[price_data][product_data][description]"), item.description.clone()));
        }
        form.push((format!("{prefix}[price_data][unit_amount]"), item.unit_amount.to_string()));
        form.push((format!("{prefix}[quantity]"), item.quantity.to_string()));
    }
    for (key, value) in &session.metadata {
        form.push((format!("metadata[{key}]"), value.clone()));
    }
    form
}

/// Stripe object ids are ASCII letters, digits and underscores only. Anything else never reaches a URL path.
pub fn is_valid_session_id(session_id: &str) -> bool {
    !session_id.is_empty() && session_id.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_')
}
