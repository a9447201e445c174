//! Interaction state machine: highlight, modal ownership, selection.
//!
//! All gizmo state bits are mutated here and nowhere else. At most one
//! gizmo per map holds the highlight bit, at most one holds the modal
//! bit, and the selected vector never keeps stale entries.

use std::collections::HashMap;

use helm_core::{OperatorId, PartId, PointerEvent};

use crate::context::{HostContext, OperatorOutcome};
use crate::gizmo::{GizmoState, HookSet, ModalFlags};
use crate::group::GroupTypeFlags;
use crate::map::{GizmoMap, GizmoRef};

/// Action for [`GizmoMap::select_all`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SelectAction {
    Select,
    Deselect,
}

impl GizmoMap {
    /// Gizmo currently under the pointer.
    pub fn highlight(&self) -> Option<GizmoRef> {
        self.interaction.highlight
    }

    /// Gizmo currently owning input exclusively.
    pub fn modal(&self) -> Option<GizmoRef> {
        self.interaction.modal
    }

    /// Move the highlight to `target` (or clear it with `None`).
    ///
    /// A no-op when the target gizmo and part are already current. The
    /// previous highlight's state bit is always cleared before the new one
    /// is set, so at most one gizmo carries it. With a context available
    /// this requests a cursor update and a region redraw.
    pub fn highlight_set(
        &mut self,
        ctx: Option<&mut dyn HostContext>,
        target: Option<GizmoRef>,
        part: PartId,
    ) {
        let unchanged = target == self.interaction.highlight
            && match target {
                Some(gref) => self
                    .gizmo(gref)
                    .map(|g| g.highlight_part() == part)
                    .unwrap_or(true),
                None => true,
            };
        if unchanged {
            return;
        }

        if let Some(prev) = self.interaction.highlight {
            if let Some(gizmo) = self.gizmo_mut(prev) {
                gizmo.state.remove(GizmoState::HIGHLIGHT);
                gizmo.highlight_part = PartId::NONE;
            }
        }

        self.interaction.highlight = target;

        match target {
            Some(gref) => {
                let Some(gizmo) = self.gizmo_mut(gref) else {
                    log::warn!("highlight target is stale, clearing");
                    self.interaction.highlight = None;
                    return;
                };
                gizmo.state.insert(GizmoState::HIGHLIGHT);
                gizmo.highlight_part = part;

                if let Some(ctx) = ctx {
                    let ty = self.gizmo(gref).map(|g| g.ty_arc());
                    if let Some(ty) = ty {
                        if ty.hooks().contains(HookSet::CURSOR) {
                            let cursor = ty.cursor(self.gizmo(gref).expect("gizmo resolved above"));
                            ctx.set_cursor(cursor);
                        }
                    }
                    ctx.request_redraw();
                }
            }
            None => {
                if let Some(ctx) = ctx {
                    ctx.set_cursor(helm_core::CursorKind::Default);
                    ctx.request_redraw();
                }
            }
        }
    }

    /// Hand exclusive input ownership to `target`, or release it with
    /// `None`.
    ///
    /// Activation invokes the gizmo's bound operator when it carries one;
    /// if the invocation does not leave a running modal session the
    /// activation is rolled back and the map is unchanged. Deactivation is
    /// the single release path, used for completion and cancellation
    /// alike.
    pub fn modal_set(
        &mut self,
        ctx: &mut dyn HostContext,
        event: &PointerEvent,
        target: Option<GizmoRef>,
    ) {
        match target {
            Some(gref) => self.modal_activate(ctx, event, gref),
            None => self.modal_deactivate(ctx),
        }
    }

    fn modal_activate(&mut self, ctx: &mut dyn HostContext, event: &PointerEvent, gref: GizmoRef) {
        let Some(gizmo) = self.gizmo_mut(gref) else {
            debug_assert!(false, "modal target is stale");
            log::warn!("modal target is stale, ignoring activation");
            return;
        };
        gizmo.state.insert(GizmoState::MODAL);
        let ty = gizmo.ty_arc();
        let hooks = ty.hooks();
        let binding = gizmo.operator_binding().cloned();
        self.interaction.modal = Some(gref);

        // the invoke hook only runs for types that also take modal events;
        // invoke-only types are driven entirely by their operator
        let wants_invoke = hooks.contains(HookSet::INVOKE) && hooks.contains(HookSet::MODAL);

        if let Some(binding) = binding {
            if wants_invoke {
                let gizmo = self.gizmo_mut(gref).expect("gizmo resolved above");
                ty.invoke(ctx, gizmo, event);
            }

            let outcome = ctx.invoke_operator(binding.op, &binding.props, event);

            if outcome != OperatorOutcome::Running {
                // the operator ran to completion or was rejected; restore
                // the pre-activation state
                log::debug!(
                    "operator `{}` did not start a modal session, rolling back",
                    binding.op
                );
                if let Some(gizmo) = self.gizmo_mut(gref) {
                    gizmo.state.remove(GizmoState::MODAL);
                    gizmo.interaction = None;
                }
                self.interaction.modal = None;
            }
            return;
        }

        if wants_invoke {
            let gizmo = self.gizmo_mut(gref).expect("gizmo resolved above");
            ty.invoke(ctx, gizmo, event);
        }
        ctx.grab_cursor(true);
    }

    fn modal_deactivate(&mut self, ctx: &mut dyn HostContext) {
        if let Some(gref) = self.interaction.modal.take() {
            if let Some(gizmo) = self.gizmo_mut(gref) {
                gizmo.state.remove(GizmoState::MODAL);
                gizmo.interaction = None;
            }
        }
        ctx.grab_cursor(false);
        ctx.request_redraw();
        // re-evaluate highlight against the now modal-free map
        ctx.push_pointer_move();
    }

    /// Select or deselect every selectable gizmo. Returns whether any
    /// gizmo's selection state actually changed; any change queues a
    /// synthetic pointer-move so highlight state re-evaluates.
    pub fn select_all(&mut self, ctx: &mut dyn HostContext, action: SelectAction) -> bool {
        let changed = match action {
            SelectAction::Select => self.select_all_intern(ctx),
            SelectAction::Deselect => self.deselect_all(),
        };
        if changed {
            ctx.push_pointer_move();
        }
        changed
    }

    fn select_all_intern(&mut self, ctx: &mut dyn HostContext) -> bool {
        // collect by name so duplicates collapse; collection order is not
        // part of the contract
        let mut by_name: HashMap<String, GizmoRef> = HashMap::new();
        for &group_handle in &self.order {
            let Some(group) = self.groups.get(group_handle) else {
                continue;
            };
            if !group.group_type().flags().contains(GroupTypeFlags::SELECT) {
                continue;
            }
            if !group.is_visible(&*ctx) {
                continue;
            }
            for (gizmo_handle, gizmo) in group.gizmos() {
                by_name.insert(
                    gizmo.name().to_string(),
                    GizmoRef {
                        group: group_handle,
                        gizmo: gizmo_handle,
                    },
                );
            }
        }

        let selected: Vec<GizmoRef> = by_name.into_values().collect();
        let mut changed = false;
        for &gref in &selected {
            let Some(gizmo) = self.gizmo_mut(gref) else {
                continue;
            };
            if !gizmo.is_selected() {
                changed = true;
            }
            gizmo.state.insert(GizmoState::SELECT);
            let ty = gizmo.ty_arc();
            if ty.hooks().contains(HookSet::SELECT) {
                let gizmo = self.gizmo_mut(gref).expect("gizmo resolved above");
                ty.select(ctx, gizmo, SelectAction::Select);
            }
        }
        self.interaction.selected = selected;

        if let Some(first) = self.interaction.selected.first().copied() {
            let part = self
                .gizmo(first)
                .map(|g| g.highlight_part())
                .unwrap_or(PartId::NONE);
            self.highlight_set(Some(ctx), Some(first), part);
        }
        changed
    }

    /// Clear the selection. Reports a change whenever it was non-empty.
    fn deselect_all(&mut self) -> bool {
        if self.interaction.selected.is_empty() {
            return false;
        }
        for gref in std::mem::take(&mut self.interaction.selected) {
            if let Some(gizmo) = self.gizmo_mut(gref) {
                gizmo.state.remove(GizmoState::SELECT);
            }
        }
        true
    }
}

/// Resolve the pointer cursor across a chain of maps (e.g. overlapping
/// regions): the first map whose highlighted gizmo declares a cursor hook
/// wins. Returns whether a cursor was set.
pub fn cursor_set(maps: &[&GizmoMap], ctx: &mut dyn HostContext) -> bool {
    for map in maps {
        let Some(gref) = map.highlight() else {
            continue;
        };
        let Some(gizmo) = map.gizmo(gref) else {
            continue;
        };
        let ty = gizmo.ty_arc();
        if ty.hooks().contains(HookSet::CURSOR) {
            ctx.set_cursor(ty.cursor(gizmo));
            return true;
        }
    }
    false
}

/// Drive the modal gizmo while its bound operator runs.
///
/// While `running_op` matches the modal gizmo's binding, events are
/// forwarded to its modal hook. Once the operator has ended
/// (`running_op` is `None`) the highlight and modal state are released.
/// A handler whose region map has disappeared (render windows, region
/// rebuilds) is a silent skip.
pub fn handled_modal_update(
    map: Option<&mut GizmoMap>,
    ctx: &mut dyn HostContext,
    event: &PointerEvent,
    running_op: Option<OperatorId>,
) {
    let Some(map) = map else {
        log::debug!("modal gizmo handler without a live region map, skipping");
        return;
    };

    match running_op {
        Some(op) => {
            let Some(gref) = map.modal() else {
                return;
            };
            let Some(gizmo) = map.gizmo_mut(gref) else {
                return;
            };
            if gizmo.operator_binding().map(|b| b.op) != Some(op) {
                return;
            }
            let ty = gizmo.ty_arc();
            if ty.hooks().contains(HookSet::MODAL) {
                ty.modal(ctx, gizmo, event, ModalFlags::NONE);
            }
        }
        None => {
            map.highlight_set(Some(&mut *ctx), None, PartId::NONE);
            map.modal_set(ctx, event, None);
        }
    }
}
