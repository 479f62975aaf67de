//! Request dispatch: registry, handlers, and the shared context.

pub mod context;
pub mod handlers;
pub mod registry;
