//! Gizmo instances and the gizmo-type capability interface.

use std::any::Any;
use std::ops::{BitOr, BitOrAssign};
use std::sync::Arc;

use helm_core::{CursorKind, OperatorId, PartId, PointerEvent};

use crate::context::HostContext;
use crate::draw::DrawBackend;
use crate::interaction::SelectAction;
use crate::pick::{PickBackend, SelectId};

/// Optional hooks a gizmo type declares (bitflags-style).
///
/// The runtime checks for a hook here before calling it; a hook that is
/// implemented but not declared is never invoked.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct HookSet(u16);

impl HookSet {
    /// No optional hooks
    pub const NONE: Self = Self(0);
    /// Per-frame state recompute ([`GizmoType::update`])
    pub const UPDATE: Self = Self(1 << 0);
    /// Selection-buffer rendering for 3D picking ([`GizmoType::draw_select`])
    pub const DRAW_SELECT: Self = Self(1 << 1);
    /// Direct 2D intersection test ([`GizmoType::test_select`])
    pub const TEST_SELECT: Self = Self(1 << 2);
    /// Interaction start ([`GizmoType::invoke`])
    pub const INVOKE: Self = Self(1 << 3);
    /// Per-event modal handling ([`GizmoType::modal`])
    pub const MODAL: Self = Self(1 << 4);
    /// Selection notification ([`GizmoType::select`])
    pub const SELECT: Self = Self(1 << 5);
    /// Pointer cursor resolution ([`GizmoType::cursor`])
    pub const CURSOR: Self = Self(1 << 6);

    pub const fn contains(self, other: Self) -> bool {
        (self.0 & other.0) == other.0
    }
}

impl BitOr for HookSet {
    type Output = Self;
    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for HookSet {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

/// Interaction state bits of one gizmo instance.
///
/// Only the interaction state machine mutates these.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[repr(transparent)]
pub struct GizmoState(u8);

impl GizmoState {
    pub const HIGHLIGHT: Self = Self(1 << 0);
    pub const MODAL: Self = Self(1 << 1);
    pub const SELECT: Self = Self(1 << 2);

    pub const fn contains(self, other: Self) -> bool {
        (self.0 & other.0) == other.0
    }

    pub(crate) fn insert(&mut self, other: Self) {
        self.0 |= other.0;
    }

    pub(crate) fn remove(&mut self, other: Self) {
        self.0 &= !other.0;
    }
}

/// Per-instance draw options.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[repr(transparent)]
pub struct GizmoOptions(u8);

impl GizmoOptions {
    pub const NONE: Self = Self(0);
    /// Never update or draw this gizmo
    pub const HIDDEN: Self = Self(1 << 0);
    /// Keep drawing this gizmo while it is modal
    pub const DRAW_MODAL: Self = Self(1 << 1);
    /// Only draw this gizmo while it is highlighted or selected
    pub const DRAW_HOVER: Self = Self(1 << 2);

    pub const fn contains(self, other: Self) -> bool {
        (self.0 & other.0) == other.0
    }

    pub fn insert(&mut self, other: Self) {
        self.0 |= other.0;
    }

    pub fn remove(&mut self, other: Self) {
        self.0 &= !other.0;
    }
}

impl BitOr for GizmoOptions {
    type Output = Self;
    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// Tweak flags passed into [`GizmoType::modal`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[repr(transparent)]
pub struct ModalFlags(u8);

impl ModalFlags {
    pub const NONE: Self = Self(0);
    /// Finer-grained input mapping requested
    pub const PRECISE: Self = Self(1 << 0);
    /// Snap values to host-defined increments
    pub const SNAP: Self = Self(1 << 1);

    pub const fn contains(self, other: Self) -> bool {
        (self.0 & other.0) == other.0
    }
}

/// Tri-state draw classification of one gizmo for the current frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum DrawVisibility {
    /// Not updated, not drawn
    Skip,
    /// Updated so hover/pick state stays correct, but not drawn
    UpdateOnly,
    /// Updated and drawn
    Draw,
}

/// Operator bound to a gizmo: invoked when the gizmo becomes modal.
#[derive(Clone, Debug)]
pub struct OperatorBinding {
    /// Operator to invoke through the host
    pub op: OperatorId,
    /// Property values forwarded with the invocation
    pub props: serde_json::Value,
}

impl OperatorBinding {
    pub fn new(op: OperatorId) -> Self {
        Self {
            op,
            props: serde_json::Value::Null,
        }
    }

    pub fn with_props(op: OperatorId, props: serde_json::Value) -> Self {
        Self { op, props }
    }
}

/// Behavior of a class of gizmos.
///
/// Only [`draw`](Self::draw) is required. Every other hook is optional:
/// implement it *and* declare it in [`hooks`](Self::hooks), otherwise the
/// runtime will not call it.
pub trait GizmoType: Send + Sync {
    /// Stable identifier, also used to deduplicate select-all collection.
    fn idname(&self) -> &'static str;

    /// Which optional hooks this type implements.
    fn hooks(&self) -> HookSet {
        HookSet::NONE
    }

    /// Draw the gizmo into the overlay.
    fn draw(&self, ctx: &mut dyn HostContext, gizmo: &Gizmo, backend: &mut dyn DrawBackend);

    /// Render the gizmo into the selection buffer for 3D picking.
    ///
    /// Implementations report hits as `id.with_part(part)`.
    fn draw_select(
        &self,
        _ctx: &mut dyn HostContext,
        _gizmo: &Gizmo,
        _id: SelectId,
        _backend: &mut dyn PickBackend,
    ) {
    }

    /// Direct intersection test for 2D gizmos.
    fn test_select(
        &self,
        _ctx: &mut dyn HostContext,
        _gizmo: &Gizmo,
        _event: &PointerEvent,
    ) -> Option<PartId> {
        None
    }

    /// Recompute derived per-instance state before drawing.
    /// `force` is set while the owning map has a refresh pending.
    fn update(&self, _ctx: &mut dyn HostContext, _gizmo: &mut Gizmo, _force: bool) {}

    /// Interaction is starting on this gizmo.
    fn invoke(&self, _ctx: &mut dyn HostContext, _gizmo: &mut Gizmo, _event: &PointerEvent) {}

    /// Handle an input event while this gizmo is modal.
    fn modal(
        &self,
        _ctx: &mut dyn HostContext,
        _gizmo: &mut Gizmo,
        _event: &PointerEvent,
        _flags: ModalFlags,
    ) {
    }

    /// The gizmo's selection state was changed by select-all.
    fn select(&self, _ctx: &mut dyn HostContext, _gizmo: &mut Gizmo, _action: SelectAction) {}

    /// Pointer cursor to show while this gizmo is highlighted.
    fn cursor(&self, _gizmo: &Gizmo) -> CursorKind {
        CursorKind::Default
    }
}

/// One interactive on-screen control, owned by a [`GizmoGroup`].
///
/// [`GizmoGroup`]: crate::group::GizmoGroup
pub struct Gizmo {
    name: String,
    ty: Arc<dyn GizmoType>,
    pub(crate) state: GizmoState,
    pub(crate) highlight_part: PartId,
    options: GizmoOptions,
    /// Drag state stashed by the type's invoke hook, released when the
    /// modal session ends.
    pub(crate) interaction: Option<Box<dyn Any + Send>>,
    op_binding: Option<OperatorBinding>,
}

impl Gizmo {
    pub fn new(name: impl Into<String>, ty: Arc<dyn GizmoType>) -> Self {
        Self {
            name: name.into(),
            ty,
            state: GizmoState::default(),
            highlight_part: PartId::NONE,
            options: GizmoOptions::NONE,
            interaction: None,
            op_binding: None,
        }
    }

    /// Bind an operator invoked when this gizmo becomes modal.
    pub fn with_operator(mut self, binding: OperatorBinding) -> Self {
        self.op_binding = Some(binding);
        self
    }

    pub fn with_options(mut self, options: GizmoOptions) -> Self {
        self.options = options;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn gizmo_type(&self) -> &Arc<dyn GizmoType> {
        &self.ty
    }

    pub(crate) fn ty_arc(&self) -> Arc<dyn GizmoType> {
        Arc::clone(&self.ty)
    }

    pub fn is_highlighted(&self) -> bool {
        self.state.contains(GizmoState::HIGHLIGHT)
    }

    pub fn is_modal(&self) -> bool {
        self.state.contains(GizmoState::MODAL)
    }

    pub fn is_selected(&self) -> bool {
        self.state.contains(GizmoState::SELECT)
    }

    /// Part of this gizmo the pointer currently highlights.
    pub fn highlight_part(&self) -> PartId {
        self.highlight_part
    }

    pub fn options(&self) -> GizmoOptions {
        self.options
    }

    pub fn set_hidden(&mut self, hidden: bool) {
        if hidden {
            self.options.insert(GizmoOptions::HIDDEN);
        } else {
            self.options.remove(GizmoOptions::HIDDEN);
        }
    }

    pub fn operator_binding(&self) -> Option<&OperatorBinding> {
        self.op_binding.as_ref()
    }

    /// Stash custom interaction data; the runtime drops it when the modal
    /// session ends.
    pub fn set_interaction_data(&mut self, data: Box<dyn Any + Send>) {
        self.interaction = Some(data);
    }

    pub fn interaction_data(&self) -> Option<&(dyn Any + Send)> {
        self.interaction.as_deref()
    }

    pub fn interaction_data_mut(&mut self) -> Option<&mut (dyn Any + Send)> {
        self.interaction.as_deref_mut()
    }

    /// Classify this gizmo for the current frame.
    pub(crate) fn visibility(&self) -> DrawVisibility {
        if self.options.contains(GizmoOptions::HIDDEN) {
            return DrawVisibility::Skip;
        }
        // don't draw while modal (dragging) unless opted in
        if self.is_modal() && !self.options.contains(GizmoOptions::DRAW_MODAL) {
            return DrawVisibility::UpdateOnly;
        }
        // hover-only gizmos still draw while selected
        if self.options.contains(GizmoOptions::DRAW_HOVER)
            && !self.is_highlighted()
            && !self.is_selected()
        {
            return DrawVisibility::UpdateOnly;
        }
        DrawVisibility::Draw
    }

    /// Whether this gizmo can participate in pointer picking.
    pub(crate) fn is_intersectable(&self) -> bool {
        if self.options.contains(GizmoOptions::HIDDEN) {
            return false;
        }
        let hooks = self.ty.hooks();
        hooks.contains(HookSet::DRAW_SELECT) || hooks.contains(HookSet::TEST_SELECT)
    }
}

impl std::fmt::Debug for Gizmo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Gizmo")
            .field("name", &self.name)
            .field("type", &self.ty.idname())
            .field("state", &self.state)
            .field("part", &self.highlight_part)
            .finish()
    }
}
