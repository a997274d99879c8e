//! Derivative orders that callers request from an evaluator.

use serde::{Deserialize, Serialize};

/// A single derivative (sensitivity) order.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Order {
    /// Scalar objective value.
    Value,
    /// First derivative, one entry per coordinate of the point.
    Gradient,
    /// Second derivative. Passed through by wrappers, never cached.
    Hessian,
}

impl Order {
    /// All orders, lowest first.
    pub const ALL: [Order; 3] = [Order::Value, Order::Gradient, Order::Hessian];

    fn bit(self) -> u8 {
        match self {
            Order::Value => 0b001,
            Order::Gradient => 0b010,
            Order::Hessian => 0b100,
        }
    }
}

impl std::fmt::Display for Order {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Order::Value => write!(f, "value"),
            Order::Gradient => write!(f, "gradient"),
            Order::Hessian => write!(f, "hessian"),
        }
    }
}

/// A set of requested derivative orders.
///
/// Serialized as a sorted list such as `["value", "gradient"]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(into = "Vec<Order>", from = "Vec<Order>")]
pub struct OrderSet(u8);

impl OrderSet {
    /// No orders. Never a valid request.
    pub const EMPTY: OrderSet = OrderSet(0);
    /// `{VALUE}`
    pub const VALUE: OrderSet = OrderSet(0b001);
    /// `{GRADIENT}`
    pub const GRADIENT: OrderSet = OrderSet(0b010);
    /// `{VALUE, GRADIENT}`
    pub const VALUE_AND_GRADIENT: OrderSet = OrderSet(0b011);
    /// `{HESSIAN}`
    pub const HESSIAN: OrderSet = OrderSet(0b100);

    /// Builds a set from a list of orders; duplicates are ignored.
    pub fn from_orders(orders: &[Order]) -> Self {
        orders.iter().fold(Self::EMPTY, |set, order| set.with(*order))
    }

    /// Returns the set with `order` added.
    pub fn with(self, order: Order) -> Self {
        OrderSet(self.0 | order.bit())
    }

    pub fn contains(&self, order: Order) -> bool {
        self.0 & order.bit() != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// True when every order in `self` is also in `other`.
    pub fn is_subset(&self, other: OrderSet) -> bool {
        self.0 & !other.0 == 0
    }

    /// Iterates the orders in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = Order> {
        let set = *self;
        Order::ALL.into_iter().filter(move |o| set.contains(*o))
    }

    /// One of the three combinations an order-≤1 evaluator can be asked for:
    /// `{VALUE}`, `{GRADIENT}` or `{VALUE, GRADIENT}`.
    pub fn is_first_order_request(&self) -> bool {
        matches!(
            *self,
            OrderSet::VALUE | OrderSet::GRADIENT | OrderSet::VALUE_AND_GRADIENT
        )
    }
}

impl From<Order> for OrderSet {
    fn from(order: Order) -> Self {
        OrderSet(order.bit())
    }
}

impl From<Vec<Order>> for OrderSet {
    fn from(orders: Vec<Order>) -> Self {
        Self::from_orders(&orders)
    }
}

impl From<OrderSet> for Vec<Order> {
    fn from(set: OrderSet) -> Self {
        set.iter().collect()
    }
}

impl std::fmt::Display for OrderSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<String> = self.iter().map(|o| o.to_string()).collect();
        write!(f, "{{{}}}", names.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_orders_ignores_duplicates() {
        let set = OrderSet::from_orders(&[Order::Gradient, Order::Value, Order::Gradient]);
        assert_eq!(set, OrderSet::VALUE_AND_GRADIENT);
    }

    #[test]
    fn test_subset() {
        assert!(OrderSet::VALUE.is_subset(OrderSet::VALUE_AND_GRADIENT));
        assert!(!OrderSet::HESSIAN.is_subset(OrderSet::VALUE_AND_GRADIENT));
    }

    #[test]
    fn test_first_order_requests() {
        assert!(OrderSet::VALUE.is_first_order_request());
        assert!(OrderSet::GRADIENT.is_first_order_request());
        assert!(OrderSet::VALUE_AND_GRADIENT.is_first_order_request());
        assert!(!OrderSet::EMPTY.is_first_order_request());
        assert!(!OrderSet::HESSIAN.is_first_order_request());
        assert!(!OrderSet::VALUE.with(Order::Hessian).is_first_order_request());
    }

    #[test]
    fn test_display() {
        assert_eq!(OrderSet::VALUE_AND_GRADIENT.to_string(), "{value, gradient}");
        assert_eq!(OrderSet::EMPTY.to_string(), "{}");
    }

    #[test]
    fn test_serde_as_list() {
        let json = serde_json::to_string(&OrderSet::VALUE_AND_GRADIENT).unwrap();
        assert_eq!(json, r#"["value","gradient"]"#);

        let parsed: OrderSet = serde_json::from_str(r#"["gradient"]"#).unwrap();
        assert_eq!(parsed, OrderSet::GRADIENT);
    }
}
