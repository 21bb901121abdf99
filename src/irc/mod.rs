//! IRC side of the bridge.
//!
//! ## Module Structure
//!
//! - `codec`: line framing and parsing
//! - `handle`: process-lifetime sending handle (`IrcHandle`)
//! - `session`: one connection, from registration to disconnect
//! - `supervisor`: reconnect loop and link state

pub mod codec;
pub mod handle;
pub mod session;
pub mod supervisor;

pub use handle::IrcHandle;
pub use session::IrcSession;
pub use supervisor::{LinkState, Supervisor};
