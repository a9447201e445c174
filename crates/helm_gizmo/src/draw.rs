//! Per-frame draw pipeline.
//!
//! Each call classifies every gizmo (skip / update-only / draw), assembles
//! a draw list, then drains it in one pass batched by depth-test state.
//! The list never survives a call: it is asserted empty on return.

use std::any::Any;

use crate::context::HostContext;
use crate::gizmo::{DrawVisibility, HookSet};
use crate::group::{GroupHooks, GroupTypeFlags};
use crate::map::{GizmoMap, GizmoRef};

/// Coarse phase selector for overlay rendering: 3D gizmos draw with the
/// view, 2D gizmos draw as a post-view screen overlay.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DrawStep {
    View3d,
    View2d,
}

/// Renderer state the draw pipeline drives directly.
///
/// Gizmo types downcast through `as_any_mut` to reach the host's concrete
/// renderer for their own geometry.
pub trait DrawBackend {
    /// Toggle scene depth testing. Called only on batch boundaries.
    fn set_depth_test(&mut self, enabled: bool);

    /// Toggle multisampling around the overlay pass.
    fn set_multisample(&mut self, _enabled: bool) {}

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl GizmoMap {
    /// Draw all visible gizmos for the given step.
    pub fn draw(&mut self, ctx: &mut dyn HostContext, step: DrawStep, backend: &mut dyn DrawBackend) {
        let mut draw_list: Vec<GizmoRef> = Vec::new();
        self.prepare_drawing(ctx, step, &mut draw_list);
        self.draw_list(ctx, backend, &mut draw_list);
        assert!(
            draw_list.is_empty(),
            "gizmo draw list must drain within one draw call"
        );
    }

    /// Update gizmos and collect those that should be drawn this frame.
    fn prepare_drawing(
        &mut self,
        ctx: &mut dyn HostContext,
        step: DrawStep,
        draw_list: &mut Vec<GizmoRef>,
    ) {
        if self.order.is_empty() {
            return;
        }

        // only the active gizmo needs updating while one is modal, unless
        // its group opts into full-group modal drawing
        if let Some(modal_ref) = self.interaction.modal {
            let draw_all = self
                .group(modal_ref.group)
                .map(|g| g.group_type().flags().contains(GroupTypeFlags::DRAW_MODAL_ALL))
                .unwrap_or(false);
            if !draw_all {
                self.prepare_gizmo(ctx, modal_ref, draw_list);
                // refresh stays pending until a full traversal runs
                return;
            }
        }

        for group_handle in self.order.clone() {
            {
                let Some(group) = self.groups.get(group_handle) else {
                    continue;
                };
                // check the draw step first to avoid the poll call
                if !group.visible_in_step(step) || !group.is_visible(&*ctx) {
                    continue;
                }
            }

            let group = self
                .groups
                .get_mut(group_handle)
                .expect("group vanished during traversal");
            group.ensure_initialized(ctx);
            let group_type = std::sync::Arc::clone(group.group_type());
            if self.refresh_pending && group_type.hooks().contains(GroupHooks::REFRESH) {
                group_type.refresh(ctx, group);
            }
            if group_type.hooks().contains(GroupHooks::DRAW_PREPARE) {
                group_type.draw_prepare(ctx, group);
            }

            let handles = group.handles().to_vec();
            for gizmo_handle in handles {
                self.prepare_gizmo(
                    ctx,
                    GizmoRef {
                        group: group_handle,
                        gizmo: gizmo_handle,
                    },
                    draw_list,
                );
            }
        }

        self.refresh_pending = false;
    }

    /// Classify one gizmo; updates it if visible and queues it if drawable.
    fn prepare_gizmo(
        &mut self,
        ctx: &mut dyn HostContext,
        gref: GizmoRef,
        draw_list: &mut Vec<GizmoRef>,
    ) {
        let force = self.refresh_pending;
        let Some(gizmo) = self.gizmo_mut(gref) else {
            return;
        };
        let visibility = gizmo.visibility();
        if visibility == DrawVisibility::Skip {
            return;
        }
        let ty = gizmo.ty_arc();
        if ty.hooks().contains(HookSet::UPDATE) {
            ty.update(ctx, gizmo, force);
        }
        if visibility == DrawVisibility::Draw {
            draw_list.push(gref);
        }
    }

    /// Drain the draw list, last-queued first, batching depth-test state.
    fn draw_list(
        &mut self,
        ctx: &mut dyn HostContext,
        backend: &mut dyn DrawBackend,
        draw_list: &mut Vec<GizmoRef>,
    ) {
        if draw_list.is_empty() {
            return;
        }

        let multisample = self.settings().multisample;
        if multisample {
            backend.set_multisample(true);
        }

        let mut depth_prev = false;
        while let Some(gref) = draw_list.pop() {
            let Some(gizmo) = self.gizmo(gref) else {
                continue;
            };
            let group_flags = self
                .group(gref.group)
                .map(|g| g.group_type().flags())
                .unwrap_or(GroupTypeFlags::NONE);

            let mut is_depth = group_flags.contains(GroupTypeFlags::DEPTH_3D);
            // highlighted gizmos always stay visible through geometry
            if is_depth && gizmo.is_highlighted() {
                is_depth = false;
            }
            if is_depth != depth_prev {
                backend.set_depth_test(is_depth);
                depth_prev = is_depth;
            }

            let ty = gizmo.ty_arc();
            let gizmo = self.gizmo(gref).expect("gizmo vanished during draw");
            ty.draw(ctx, gizmo, backend);
        }

        if depth_prev {
            backend.set_depth_test(false);
        }
        if multisample {
            backend.set_multisample(false);
        }
    }
}
