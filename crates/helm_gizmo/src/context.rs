//! Host context capability consumed by the runtime.
//!
//! The gizmo map never talks to a window system, renderer or operator
//! framework directly; every side effect the interaction state machine
//! needs is requested through this trait.

use std::any::Any;

use helm_core::{CursorKind, OperatorId, PointerEvent};

/// What became of an operator invocation requested during modal activation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OperatorOutcome {
    /// The operator started a modal session and now owns the interaction.
    Running,
    /// The operator ran to completion synchronously.
    Finished,
    /// The operator refused to run.
    Rejected,
}

/// Services the host editor provides to the gizmo-map runtime.
///
/// `as_any`/`as_any_mut` let concrete gizmo types reach host state from
/// their callbacks without the runtime knowing its shape.
pub trait HostContext {
    /// Tag the current region for redraw.
    fn request_redraw(&mut self);

    /// Set the pointer cursor shape.
    fn set_cursor(&mut self, cursor: CursorKind);

    /// Lock the pointer to the region (no OS cursor movement) or release it.
    fn grab_cursor(&mut self, grab: bool);

    /// Queue a synthetic pointer-move event so highlight state re-evaluates.
    fn push_pointer_move(&mut self);

    /// Invoke an operator on behalf of a gizmo being made modal.
    fn invoke_operator(
        &mut self,
        op: OperatorId,
        props: &serde_json::Value,
        event: &PointerEvent,
    ) -> OperatorOutcome;

    /// Whether the host runs without a display (deferred updates short-circuit).
    fn is_headless(&self) -> bool {
        false
    }

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}
