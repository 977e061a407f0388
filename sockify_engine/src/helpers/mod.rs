//! Pure helper functions used by the checkout workflow.
mod cart;

pub use cart::{merge_cart_lines, price_cart_lines};
