//! Pointer hit-testing.
//!
//! 2D groups are tested first in map order and the first hit wins
//! outright. Only when no 2D gizmo is hit are the 3D candidates rendered
//! into the host's selection buffer: a coarse pass over the pointer
//! hotspot, then a tighter refinement pass when the backend supports one.

use helm_core::{Handle, PartId, PointerEvent};

use crate::context::HostContext;
use crate::gizmo::{Gizmo, HookSet};
use crate::group::GroupTypeFlags;
use crate::map::{GizmoMap, GizmoRef};

/// Encoded selection-buffer id for one pick candidate.
///
/// Internally packs the candidate's list index into the high bits and a
/// gizmo-local part id into the low 8 bits; consumers only ever see the
/// `(index, part)` pair through the accessors.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SelectId(u32);

impl SelectId {
    pub(crate) fn from_index(index: usize) -> Self {
        Self((index as u32) << 8)
    }

    /// This candidate's id with a part attached; gizmo types report each
    /// pickable part this way from their select-draw hook.
    pub fn with_part(self, part: PartId) -> Self {
        Self((self.0 & !0xff) | part.0 as u32)
    }

    pub fn index(self) -> usize {
        (self.0 >> 8) as usize
    }

    pub fn part(self) -> PartId {
        PartId((self.0 & 0xff) as u8)
    }
}

/// Pixel window around the pointer that a pick pass renders.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PickRect {
    /// Pointer position in region-local pixels
    pub center: [i32; 2],
    /// Half-width of the window
    pub radius: i32,
}

/// Which pick pass is running.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PickPass {
    /// Coarse pass over the full hotspot, nearest hit first
    Nearest,
    /// Tighter re-render to disambiguate overlapping candidates
    Refine,
}

/// Selection-buffer renderer supplied by the host.
///
/// The engine drives `begin`/`end` around a select-draw loop; gizmo types
/// report candidate parts through [`record`](Self::record) (a software
/// backend scores them directly, a GPU backend rasterizes id geometry and
/// resolves the nearest fragment). Gizmo types downcast through `as_any`
/// to reach the concrete backend for their own select geometry.
pub trait PickBackend {
    /// Whether a second, tighter pass is worth running.
    fn supports_refinement(&self) -> bool {
        false
    }

    /// Toggle scene depth testing, batched like the visual draw loop.
    fn set_depth_test(&mut self, enabled: bool);

    /// Start collecting hits inside `rect`.
    fn begin(&mut self, rect: PickRect, pass: PickPass);

    /// Report one candidate part and its depth.
    fn record(&mut self, id: SelectId, depth: f32);

    /// Finish the pass and return the winning hit, if any.
    fn end(&mut self) -> Option<SelectId>;

    fn as_any(&self) -> &dyn std::any::Any;

    fn as_any_mut(&mut self) -> &mut dyn std::any::Any;
}

impl GizmoMap {
    /// Find the gizmo under the pointer. 2D intersections have priority
    /// over 3D ones. Returns the gizmo and the hit part; `None` means
    /// nothing is under the pointer.
    pub fn highlight_find(
        &self,
        ctx: &mut dyn HostContext,
        event: &PointerEvent,
        pick: &mut dyn PickBackend,
    ) -> Option<(GizmoRef, PartId)> {
        let mut candidates_3d: Vec<GizmoRef> = Vec::new();

        for &group_handle in &self.order {
            let Some(group) = self.groups.get(group_handle) else {
                continue;
            };
            if !group.is_visible(&*ctx) {
                continue;
            }
            if group.group_type().flags().contains(GroupTypeFlags::IS_3D) {
                let mut handles: Vec<Handle<Gizmo>> = Vec::new();
                group.intersectable_handles(&mut handles);
                candidates_3d.extend(handles.into_iter().map(|gizmo| GizmoRef {
                    group: group_handle,
                    gizmo,
                }));
            } else if let Some((gizmo, part)) = group.find_intersected(ctx, event) {
                return Some((
                    GizmoRef {
                        group: group_handle,
                        gizmo,
                    },
                    part,
                ));
            }
        }

        if candidates_3d.is_empty() {
            return None;
        }
        self.find_intersected_3d(ctx, event, pick, &candidates_3d)
    }

    /// Two-pass selection-buffer pick over the collected 3D candidates.
    fn find_intersected_3d(
        &self,
        ctx: &mut dyn HostContext,
        event: &PointerEvent,
        pick: &mut dyn PickBackend,
        candidates: &[GizmoRef],
    ) -> Option<(GizmoRef, PartId)> {
        let coarse_radius = 0.5 * self.settings().hotspot;

        let mut hit = self.pick_pass(ctx, event, pick, candidates, coarse_radius, PickPass::Nearest)?;

        if pick.supports_refinement() {
            let refine_radius = coarse_radius * self.settings().refine_scale;
            if let Some(refined) =
                self.pick_pass(ctx, event, pick, candidates, refine_radius, PickPass::Refine)
            {
                hit = refined;
            }
        }

        let gref = *candidates.get(hit.index())?;
        Some((gref, hit.part()))
    }

    /// Render every candidate into the selection buffer once.
    fn pick_pass(
        &self,
        ctx: &mut dyn HostContext,
        event: &PointerEvent,
        pick: &mut dyn PickBackend,
        candidates: &[GizmoRef],
        radius: f32,
        pass: PickPass,
    ) -> Option<SelectId> {
        pick.begin(
            PickRect {
                center: event.pixel(),
                radius: radius.round().max(1.0) as i32,
            },
            pass,
        );

        let mut depth_prev = false;
        for (index, &gref) in candidates.iter().enumerate() {
            let Some(gizmo) = self.gizmo(gref) else {
                continue;
            };
            let is_depth = self
                .group(gref.group)
                .map(|g| g.group_type().flags().contains(GroupTypeFlags::DEPTH_3D))
                .unwrap_or(false);
            if is_depth != depth_prev {
                pick.set_depth_test(is_depth);
                depth_prev = is_depth;
            }

            let ty = gizmo.ty_arc();
            if ty.hooks().contains(HookSet::DRAW_SELECT) {
                ty.draw_select(ctx, gizmo, SelectId::from_index(index), pick);
            }
        }
        if depth_prev {
            pick.set_depth_test(false);
        }

        pick.end()
    }
}
