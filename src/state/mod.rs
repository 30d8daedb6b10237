//! State Module - Input state machines
//!
//! The state machines that sit between raw simulated input and the
//! device models:
//!
//! - **Button** - Press/bump/release gesture decoding, latches, waiters
//! - **Analog** - Sampling capability and quantized change detection

pub mod analog;
pub mod button;

pub use analog::*;
pub use button::*;
