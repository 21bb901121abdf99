//! IRC bot commands: registry, prefix dispatcher and built-ins.

pub mod builtin;
pub mod dispatcher;
pub mod registry;

pub use builtin::builtin_dispatcher;
pub use dispatcher::Dispatcher;
