// Mappers module
// Inbound payload validation and upstream response shaping

pub mod balances;
pub mod orders;

pub use balances::{shape_balances, BalanceRecord};
pub use orders::{CancelOrderQuery, CreateOrderRequest, ListOrdersQuery, OrderStatus};
