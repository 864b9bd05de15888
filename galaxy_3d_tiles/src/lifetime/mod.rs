//! Resource lifetime module
//!
//! Deferred destruction of device resources released by tiles.

mod amortized_destructor;

pub use amortized_destructor::{AmortizedDestructor, DestroyableResource, PendingKey};
