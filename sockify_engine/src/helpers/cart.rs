use std::collections::HashMap;

use crate::{
    db_types::{NewOrderItem, SockVariant},
    engine_api::{checkout_objects::CartItem, errors::CheckoutError},
};

/// Collapses lines for the same variant into one, keeping the order in which variants first appear.
///
/// Fails on an empty cart, on any line with a non-positive quantity, or when merged lines overflow.
pub fn merge_cart_lines(items: &[CartItem]) -> Result<Vec<CartItem>, CheckoutError> {
    if items.is_empty() {
        return Err(CheckoutError::EmptyCart);
    }
    let mut merged: Vec<CartItem> = Vec::with_capacity(items.len());
    for item in items {
        if item.quantity <= 0 {
            return Err(CheckoutError::InvalidQuantity { variant_id: item.sock_variant_id, quantity: item.quantity });
        }
        match merged.iter_mut().find(|m| m.sock_variant_id == item.sock_variant_id) {
            Some(existing) => {
                existing.quantity = existing.quantity.checked_add(item.quantity).ok_or(
                    CheckoutError::InvalidQuantity { variant_id: item.sock_variant_id, quantity: item.quantity },
                )?;
            },
            None => merged.push(*item),
        }
    }
    Ok(merged)
}

/// Snapshots the current name, size and price of each variant into order items.
///
/// This is the fast-fail stock check: it rejects lines whose variant is unknown or whose requested quantity exceeds
/// what was in stock when `variants` was read. The authoritative check happens again when the stock is reserved.
pub fn price_cart_lines(lines: &[CartItem], variants: &[SockVariant]) -> Result<Vec<NewOrderItem>, CheckoutError> {
    let by_id = variants.iter().map(|v| (v.id, v)).collect::<HashMap<i64, &SockVariant>>();
    lines
        .iter()
        .map(|line| {
            let variant = by_id.get(&line.sock_variant_id).ok_or(CheckoutError::VariantNotFound(line.sock_variant_id))?;
            if variant.quantity < line.quantity {
                return Err(CheckoutError::InsufficientStock {
                    variant_id: variant.id,
                    requested: line.quantity,
                    available: variant.quantity,
                });
            }
            Ok(NewOrderItem {
                sock_variant_id: variant.id,
                name: variant.sock_name.clone(),
                size: variant.size,
                price: variant.price,
                quantity: line.quantity,
            })
        })
        .collect()
}
