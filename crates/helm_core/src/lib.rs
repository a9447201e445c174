//! # helm_core - Helm Editor Core
//!
//! Zero-dependency primitives shared by the Helm overlay runtime:
//! - Generational handles for non-owning references into runtime containers
//! - Pointer event types delivered by the host event loop
//! - Identity newtypes for editor spaces, regions, parts and operators

pub mod event;
pub mod handle;
pub mod id;

pub use event::*;
pub use handle::*;
pub use id::*;
