use sockify_engine::{db_types::Address, order_objects::OrderConfirmation};

pub const EMAIL_SENDER_NAME: &str = "Sockify team";

pub fn order_confirmation_subject(confirmation: &OrderConfirmation) -> String {
    format!("Order confirmation ({})", confirmation.invoice_number)
}

pub fn order_confirmation_text(confirmation: &OrderConfirmation) -> String {
    let items = confirmation
        .items
        .iter()
        .map(|item| format!("- {} (Size: {}) x{} - {}\n", item.name, item.size, item.quantity, item.price))
        .collect::<String>();
    let (street, locality) = address_lines(&confirmation.address);
    format!(
        "Hello,\n\nThank you for your order!\n\nInvoice #: {invoice}\nStatus: {status}\nDate: {date}\n\nShipping \
         address:\n{street}\n{locality}\n\nItems:\n{items}\nTotal: {total}\n\nThank you for shopping with us!\n\nBest \
         regards,\n{EMAIL_SENDER_NAME}\n",
        invoice = confirmation.invoice_number,
        status = confirmation.status,
        date = confirmation.created_at.format("%Y-%m-%d %H:%M UTC"),
        total = confirmation.total,
    )
}

pub fn order_confirmation_html(confirmation: &OrderConfirmation) -> String {
    const CELL: &str = "padding: 8px; border: 1px solid #ddd;";
    let rows = confirmation
        .items
        .iter()
        .map(|item| {
            format!(
                "<tr><td style=\"{CELL}\">{}</td><td style=\"{CELL}\">{}</td><td style=\"{CELL}\">{}</td><td \
                 style=\"{CELL} text-align: right;\">{}</td></tr>",
                escape_html(&item.name),
                item.size,
                item.quantity,
                item.price
            )
        })
        .collect::<String>();
    let (street, locality) = address_lines(&confirmation.address);
    format!(
        "<html><body><h2>Thank you for your order!</h2><p><strong>Invoice #:</strong> {invoice}</p><p><strong>Status:\
         </strong> {status}</p><p><strong>Date:</strong> {date}</p><h3>Shipping address:</h3><p>{street}<br>{locality}\
         </p><h3>Items:</h3><table style=\"width:100%; border-collapse: collapse;\"><thead><tr><th \
         style=\"{CELL}\">Item</th><th style=\"{CELL}\">Size</th><th style=\"{CELL}\">Quantity</th><th \
         style=\"{CELL}\">Price</th></tr></thead><tbody>{rows}</tbody></table><h4>Total: {total}</h4><p>Thank you for \
         shopping with us!</p><p>Best regards,<br>{EMAIL_SENDER_NAME}</p></body></html>",
        invoice = confirmation.invoice_number,
        status = confirmation.status,
        date = confirmation.created_at.format("%Y-%m-%d %H:%M UTC"),
        street = escape_html(&street),
        locality = escape_html(&locality),
        total = confirmation.total,
    )
}

fn address_lines(address: &Address) -> (String, String) {
    let street = match address.apt_unit.as_deref().filter(|s| !s.is_empty()) {
        Some(apt) => format!("{}, {apt}", address.street),
        None => address.street.clone(),
    };
    (street, format!("{}, {}", address.state, address.zipcode))
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;").replace('"', "&quot;")
}
