//! Slipway-Resolver: Object Resolution Layer
//!
//! Resolves the implicit relationships of the delivery graph. The store
//! enforces no foreign keys, so every edge between objects is inferred from
//! a name reference, an identity label, or membership in an embedded list.
//!
//! ## Key Components
//!
//! - `GraphResolver`: the resolution capability, one method per operation
//! - `StoreResolver`: real resolution against an `ObjectStore`
//! - `StubResolver` / `StubSet` / `StubSlot`: typed per-operation stubbing
//!   with fall-through to real resolution
//!
//! Dependencies are injected by parameter passing: call sites hold a
//! `&dyn GraphResolver` and pass a store handle per call. Tests swap in a
//! `StubResolver` for exactly the operations they need to control.

mod error;
mod resolver;
mod stub;

pub use error::{ResolveError, ResolveResult};
pub use resolver::{GraphResolver, StoreResolver, SANDBOX_PROVISIONER};
pub use stub::{Operation, StubResolver, StubSet, StubSlot};
