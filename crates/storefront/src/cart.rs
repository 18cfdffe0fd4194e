//! In-memory shopping cart.
//!
//! # Invariants
//!
//! - At most one line per product id.
//! - Every line has a quantity of at least 1. The delta path removes a line
//!   whose quantity would drop to zero or below instead of keeping it.
//! - Lines keep first-add order; quantity changes never reorder them.
//! - Totals are computed from the lines on every read.
//!
//! The cart lives only as long as the process. It is owned by the
//! coordinator and mutated through `&mut self`, so operations never
//! interleave.

use kkomi_core::{Price, Product, ProductId};
use tracing::debug;

use crate::checkout::OrderItem;

/// One product in the cart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartLine {
    product: Product,
    quantity: u32,
}

impl CartLine {
    /// Snapshot of the product taken when it was first added.
    #[must_use]
    pub const fn product(&self) -> &Product {
        &self.product
    }

    #[must_use]
    pub const fn product_id(&self) -> ProductId {
        self.product.id
    }

    /// Always at least 1.
    #[must_use]
    pub const fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Unit price times quantity.
    #[must_use]
    pub fn subtotal(&self) -> Price {
        self.product.price.times(self.quantity)
    }
}

/// Result of a successful [`Cart::add`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddOutcome {
    /// Quantity of the line after the add.
    pub quantity: u32,
    /// Whether the product was already in the cart.
    pub merged: bool,
}

/// Result of [`Cart::update_quantity`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuantityChange {
    /// The line now has this quantity.
    Updated(u32),
    /// The quantity reached zero or below and the line was removed.
    Removed,
    /// No line for that product.
    Missing,
}

/// The shopping cart.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    #[must_use]
    pub const fn new() -> Self {
        Self { lines: Vec::new() }
    }

    /// Add `quantity` units of `product`, merging into an existing line.
    ///
    /// Returns `None` (and changes nothing) when `quantity` is zero.
    pub fn add(&mut self, product: Product, quantity: u32) -> Option<AddOutcome> {
        if quantity == 0 {
            return None;
        }

        let outcome = if let Some(line) = self.line_mut(product.id) {
            line.quantity = line.quantity.saturating_add(quantity);
            AddOutcome {
                quantity: line.quantity,
                merged: true,
            }
        } else {
            self.lines.push(CartLine { product, quantity });
            AddOutcome {
                quantity,
                merged: false,
            }
        };

        debug!(
            quantity = outcome.quantity,
            merged = outcome.merged,
            lines = self.lines.len(),
            "Added to cart"
        );
        Some(outcome)
    }

    /// Drop the line for `product_id` regardless of its quantity.
    pub fn remove(&mut self, product_id: ProductId) -> Option<CartLine> {
        let index = self.lines.iter().position(|l| l.product.id == product_id)?;
        Some(self.lines.remove(index))
    }

    /// Add a signed `delta` to a line's quantity. A result of zero or below
    /// removes the line.
    pub fn update_quantity(&mut self, product_id: ProductId, delta: i64) -> QuantityChange {
        let Some(line) = self.line_mut(product_id) else {
            return QuantityChange::Missing;
        };

        let next = i64::from(line.quantity).saturating_add(delta);
        if next <= 0 {
            self.remove(product_id);
            return QuantityChange::Removed;
        }

        line.quantity = u32::try_from(next).unwrap_or(u32::MAX);
        QuantityChange::Updated(line.quantity)
    }

    /// Remove every line.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Lines in first-add order.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// The line for `product_id`, if any.
    #[must_use]
    pub fn line(&self, product_id: ProductId) -> Option<&CartLine> {
        self.lines.iter().find(|l| l.product.id == product_id)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Number of distinct products.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Sum of quantities.
    #[must_use]
    pub fn total_items(&self) -> u64 {
        self.lines.iter().map(|l| u64::from(l.quantity)).sum()
    }

    /// Sum of price times quantity.
    #[must_use]
    pub fn total_price(&self) -> Price {
        self.lines.iter().map(CartLine::subtotal).sum()
    }

    /// Product id and quantity for each line, in cart order.
    #[must_use]
    pub fn to_order_items(&self) -> Vec<OrderItem> {
        self.lines
            .iter()
            .map(|l| OrderItem {
                product_id: l.product.id,
                quantity: l.quantity,
            })
            .collect()
    }

    fn line_mut(&mut self, product_id: ProductId) -> Option<&mut CartLine> {
        self.lines.iter_mut().find(|l| l.product.id == product_id)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashSet;

    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    use super::*;

    fn product(id: i64, price: i64) -> Product {
        Product {
            id: ProductId::new(id),
            name: format!("Product {id}"),
            description: None,
            price: Price::from_rupiah(price),
            stock: 100,
            image_url: None,
            category: None,
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn test_add_same_product_merges() {
        let mut cart = Cart::new();
        let first = cart.add(product(7, 1_000), 3).unwrap();
        let second = cart.add(product(7, 1_000), 2).unwrap();

        assert!(!first.merged);
        assert_eq!(second, AddOutcome { quantity: 5, merged: true });
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.line(ProductId::new(7)).unwrap().quantity(), 5);
    }

    #[test]
    fn test_add_zero_is_ignored() {
        let mut cart = Cart::new();
        assert!(cart.add(product(1, 1_000), 0).is_none());
        assert!(cart.is_empty());
    }

    #[test]
    fn test_totals_example() {
        let mut cart = Cart::new();
        cart.add(product(1, 10_000), 2);
        cart.add(product(5, 5_000), 1);

        assert_eq!(cart.total_price(), Price::from_rupiah(25_000));
        assert_eq!(cart.total_items(), 3);

        cart.remove(ProductId::new(1));
        assert_eq!(cart.total_price(), Price::from_rupiah(5_000));
        assert_eq!(cart.total_items(), 1);
    }

    #[test]
    fn test_decrement_to_zero_removes_line() {
        let mut cart = Cart::new();
        cart.add(product(1, 500), 1);
        assert_eq!(
            cart.update_quantity(ProductId::new(1), -1),
            QuantityChange::Removed
        );
        assert!(cart.is_empty());
    }

    #[test]
    fn test_decrement_below_zero_removes_line() {
        let mut cart = Cart::new();
        cart.add(product(1, 500), 2);
        assert_eq!(
            cart.update_quantity(ProductId::new(1), -10),
            QuantityChange::Removed
        );
        assert!(cart.line(ProductId::new(1)).is_none());
    }

    #[test]
    fn test_update_unknown_is_noop() {
        let mut cart = Cart::new();
        cart.add(product(1, 500), 2);
        let before = cart.clone();
        assert_eq!(
            cart.update_quantity(ProductId::new(99), 1),
            QuantityChange::Missing
        );
        assert_eq!(cart, before);
    }

    #[test]
    fn test_order_is_stable_on_update() {
        let mut cart = Cart::new();
        cart.add(product(3, 100), 1);
        cart.add(product(1, 100), 1);
        cart.add(product(2, 100), 1);
        cart.update_quantity(ProductId::new(3), 4);
        cart.add(product(1, 100), 1);

        let ids: Vec<i64> = cart.lines().iter().map(|l| l.product_id().as_i64()).collect();
        assert_eq!(ids, vec![3, 1, 2]);
    }

    #[test]
    fn test_to_order_items() {
        let mut cart = Cart::new();
        cart.add(product(4, 100), 2);
        cart.add(product(9, 100), 1);
        assert_eq!(
            cart.to_order_items(),
            vec![
                OrderItem {
                    product_id: ProductId::new(4),
                    quantity: 2
                },
                OrderItem {
                    product_id: ProductId::new(9),
                    quantity: 1
                },
            ]
        );
    }

    #[test]
    fn test_random_sequences_keep_invariants() {
        let mut rng = StdRng::seed_from_u64(0x6b6b_6f6d_69);

        for _ in 0..200 {
            let mut cart = Cart::new();
            for _ in 0..50 {
                let id = rng.random_range(1..=6);
                let price = id * 1_500;
                match rng.random_range(0..3) {
                    0 => {
                        cart.add(product(id, price), rng.random_range(0..4));
                    }
                    1 => {
                        cart.remove(ProductId::new(id));
                    }
                    _ => {
                        cart.update_quantity(ProductId::new(id), rng.random_range(-3..=3));
                    }
                }

                let mut seen = HashSet::new();
                for line in cart.lines() {
                    assert!(seen.insert(line.product_id()), "duplicate line");
                    assert!(line.quantity() >= 1, "line at quantity 0");
                }

                let expected: Price = cart
                    .lines()
                    .iter()
                    .map(|l| l.product().price.times(l.quantity()))
                    .sum();
                assert_eq!(cart.total_price(), expected);
                assert_eq!(cart.total_price(), cart.total_price());
                assert_eq!(
                    cart.total_items(),
                    cart.lines().iter().map(|l| u64::from(l.quantity())).sum::<u64>()
                );
            }
        }
    }
}
