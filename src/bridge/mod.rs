//! IRC-Discord bridge core.
//!
//! ## Module Structure
//!
//! - `envelope`: relay envelope formatting
//! - `outbound`: send contracts implemented by each network handle
//! - `relay`: the relay coordinator (`Relay`)

pub mod envelope;
pub mod outbound;
pub mod relay;

pub use relay::Relay;
