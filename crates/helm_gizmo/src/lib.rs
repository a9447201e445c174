//! # helm_gizmo - Gizmo-Map Runtime
//!
//! Per-region runtime for interactive viewport gizmos (translate/rotate/
//! scale handles, selection markers, ...):
//! - Process-wide registry of map types keyed by (space, region)
//! - Per-frame visibility/refresh/draw pipeline with depth batching
//! - Pointer hit-testing, 2D priority over two-pass 3D picking
//! - Modal interaction state machine driving host operators
//! - Deferred (un)registration so live type edits converge on next use
//!
//! The host editor supplies every external capability (renderer, picking
//! buffer, operator framework, key configuration) through the traits in
//! [`context`], [`draw`], [`pick`] and [`keymap`].

pub mod context;
pub mod draw;
pub mod error;
pub mod gizmo;
pub mod group;
pub mod interaction;
pub mod keymap;
pub mod map;
pub mod pick;
pub mod registry;
pub mod settings;
pub mod update;

pub use context::{HostContext, OperatorOutcome};
pub use draw::{DrawBackend, DrawStep};
pub use error::GizmoError;
pub use gizmo::{Gizmo, GizmoOptions, GizmoState, GizmoType, HookSet, ModalFlags, OperatorBinding};
pub use group::{GizmoGroup, GizmoGroupType, GroupHooks, GroupTypeFlags};
pub use interaction::{cursor_set, handled_modal_update, SelectAction};
pub use keymap::{KeyConfig, KeymapId};
pub use map::{GizmoMap, GizmoRef};
pub use pick::{PickBackend, PickPass, PickRect, SelectId};
pub use registry::{GizmoMapType, GizmoMapTypeRegistry, GroupTypeRef};
pub use settings::GizmoSettings;
pub use update::{run_pending_updates, PendingUpdates, UpdateFlags};
