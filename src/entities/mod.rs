//! Entity type definitions

pub mod lenient;
pub mod order;

pub use order::{
    BuyerSegment, MilestoneDates, Order, OrderBook, OrderFile, OrderFileShape, PaymentStatus,
    PricingSnapshot, Priority, StageTransitionEvent,
};
