//! Error types for the gizmo-map runtime.

use thiserror::Error;

/// Errors surfaced by the gizmo-map runtime.
///
/// Most runtime operations are infallible: "nothing hit" and "nothing
/// highlighted" are `Option`s, contract violations are asserted. Errors
/// exist where the host-facing registration surface or a group type's
/// own initializer can legitimately fail.
#[derive(Debug, Error)]
pub enum GizmoError {
    /// A group type with this idname is already linked into the map type.
    #[error("gizmo group type `{0}` is already registered for this map type")]
    DuplicateGroupType(&'static str),

    /// No group type with this idname is linked into the map type.
    #[error("gizmo group type `{0}` is not registered for this map type")]
    UnknownGroupType(&'static str),

    /// A group type's initializer failed; the group is left absent.
    #[error("gizmo group `{group}` failed to initialize: {reason}")]
    GroupInit {
        group: &'static str,
        reason: String,
    },
}
