//! PIX Todo Dia seller tools
//!
//! Pure domain logic behind the member-facing tooling screens:
//! - Earnings projection from price and daily sales volume
//! - Templated service-text generation for the six catalog service types

pub mod earnings;
pub mod generator;

pub use earnings::{EarningsInput, EarningsProjection};
pub use generator::ServiceKind;
