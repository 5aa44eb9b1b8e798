//! Price validation and price-to-pulse mapping
//!
//! Both stages are pure: the validator decides whether a polled price may
//! move the dial, the mapper turns an accepted price into a pulse width.

pub mod mapper;
pub mod validator;

pub use mapper::PositionMapper;
pub use validator::{Accepted, ClampWarning, Rejected, ValueValidator, NO_VALUE_SENTINEL};
