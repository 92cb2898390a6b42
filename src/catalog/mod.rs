//! Catalog logic that is independent of storage and transport.

pub mod filter;
pub mod reconcile;

pub use filter::{FilterBounds, FilterState, featured, filter, max_price, new_arrivals};
pub use reconcile::{ImageReconciler, InlinePayload, ReconcilePlan, Reconciliation};
