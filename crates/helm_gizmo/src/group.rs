//! Gizmo groups and the group-type capability interface.
//!
//! A group is a cohesive set of gizmos instantiated together from one
//! group type inside one map. Insertion order is visual priority for 2D
//! hit-testing: earlier gizmos win.

use std::ops::{BitOr, BitOrAssign};
use std::sync::Arc;

use helm_core::{Handle, HandleMap, PartId, PointerEvent};

use crate::context::HostContext;
use crate::draw::DrawStep;
use crate::error::GizmoError;
use crate::gizmo::{Gizmo, HookSet};
use crate::keymap::{KeyConfig, KeymapId};

/// Behavior flags of a group type (bitflags-style).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[repr(transparent)]
pub struct GroupTypeFlags(u8);

impl GroupTypeFlags {
    pub const NONE: Self = Self(0);
    /// Gizmos live in the 3D scene and are picked through the selection buffer
    pub const IS_3D: Self = Self(1 << 0);
    /// Gizmos of this group participate in select-all
    pub const SELECT: Self = Self(1 << 1);
    /// Draw 3D gizmos with scene depth testing
    pub const DEPTH_3D: Self = Self(1 << 2);
    /// Keep drawing the whole group while one of its gizmos is modal
    pub const DRAW_MODAL_ALL: Self = Self(1 << 3);

    pub const fn contains(self, other: Self) -> bool {
        (self.0 & other.0) == other.0
    }
}

impl BitOr for GroupTypeFlags {
    type Output = Self;
    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for GroupTypeFlags {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

/// Optional hooks a group type declares.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[repr(transparent)]
pub struct GroupHooks(u8);

impl GroupHooks {
    pub const NONE: Self = Self(0);
    /// Visibility predicate ([`GizmoGroupType::poll`])
    pub const POLL: Self = Self(1 << 0);
    /// One-time population ([`GizmoGroupType::init`])
    pub const INIT: Self = Self(1 << 1);
    /// Data re-sync when the map is tagged ([`GizmoGroupType::refresh`])
    pub const REFRESH: Self = Self(1 << 2);
    /// Per-frame pre-draw pass ([`GizmoGroupType::draw_prepare`])
    pub const DRAW_PREPARE: Self = Self(1 << 3);

    pub const fn contains(self, other: Self) -> bool {
        (self.0 & other.0) == other.0
    }
}

impl BitOr for GroupHooks {
    type Output = Self;
    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// Behavior of a class of gizmo groups.
///
/// Shared by every map instance of the matching map type. Optional hooks
/// follow the same rule as [`GizmoType`](crate::gizmo::GizmoType): declare
/// them in [`hooks`](Self::hooks) or they are never called.
pub trait GizmoGroupType: Send + Sync {
    /// Stable identifier, unique within one map type.
    fn idname(&self) -> &'static str;

    fn flags(&self) -> GroupTypeFlags;

    fn hooks(&self) -> GroupHooks {
        GroupHooks::NONE
    }

    /// Whether the group applies in the current context.
    fn poll(&self, _ctx: &dyn HostContext) -> bool {
        true
    }

    /// Populate the group with gizmos; runs once, lazily, on first draw.
    ///
    /// A failing init is logged and leaves the group absent (empty);
    /// population is best-effort.
    fn init(&self, _ctx: &mut dyn HostContext, _group: &mut GizmoGroup) -> Result<(), GizmoError> {
        Ok(())
    }

    /// Re-sync gizmos with edited scene data.
    fn refresh(&self, _ctx: &mut dyn HostContext, _group: &mut GizmoGroup) {}

    /// Per-frame preparation before the group's gizmos draw.
    fn draw_prepare(&self, _ctx: &mut dyn HostContext, _group: &mut GizmoGroup) {}

    /// Build the group's runtime keymap. The default registers an
    /// item-less keymap under the group's idname.
    fn setup_keymap(&self, keyconf: &mut dyn KeyConfig) -> KeymapId {
        keyconf.find_or_create(self.idname())
    }
}

/// A set of gizmos instantiated from one group type inside one map.
pub struct GizmoGroup {
    ty: Arc<dyn GizmoGroupType>,
    gizmos: HandleMap<Gizmo>,
    /// Insertion order; earlier entries have 2D hit-test priority.
    order: Vec<Handle<Gizmo>>,
    keymap: Option<KeymapId>,
    initialized: bool,
}

impl GizmoGroup {
    pub(crate) fn new(ty: Arc<dyn GizmoGroupType>, keymap: Option<KeymapId>) -> Self {
        Self {
            ty,
            gizmos: HandleMap::new(),
            order: Vec::new(),
            keymap,
            initialized: false,
        }
    }

    pub fn group_type(&self) -> &Arc<dyn GizmoGroupType> {
        &self.ty
    }

    pub fn keymap(&self) -> Option<KeymapId> {
        self.keymap
    }

    pub(crate) fn set_keymap(&mut self, keymap: Option<KeymapId>) {
        self.keymap = keymap;
    }

    /// Add a gizmo to the group, behind all existing ones.
    pub fn add(&mut self, gizmo: Gizmo) -> Handle<Gizmo> {
        let handle = self.gizmos.insert(gizmo);
        self.order.push(handle);
        handle
    }

    pub fn get(&self, handle: Handle<Gizmo>) -> Option<&Gizmo> {
        self.gizmos.get(handle)
    }

    pub fn get_mut(&mut self, handle: Handle<Gizmo>) -> Option<&mut Gizmo> {
        self.gizmos.get_mut(handle)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Gizmo handles in insertion order.
    pub fn handles(&self) -> &[Handle<Gizmo>] {
        &self.order
    }

    /// Iterate gizmos in insertion order.
    pub fn gizmos(&self) -> impl Iterator<Item = (Handle<Gizmo>, &Gizmo)> {
        self.order
            .iter()
            .filter_map(move |&h| self.gizmos.get(h).map(|g| (h, g)))
    }

    /// Find a gizmo by name.
    pub fn find(&self, name: &str) -> Option<Handle<Gizmo>> {
        self.gizmos()
            .find(|(_, g)| g.name() == name)
            .map(|(h, _)| h)
    }

    /// Run the group type's one-time init if it hasn't run yet.
    pub(crate) fn ensure_initialized(&mut self, ctx: &mut dyn HostContext) {
        if self.initialized {
            return;
        }
        self.initialized = true;
        let ty = Arc::clone(&self.ty);
        if !ty.hooks().contains(GroupHooks::INIT) {
            return;
        }
        if let Err(err) = ty.init(ctx, self) {
            log::warn!(
                "gizmo group `{}` failed to initialize: {err}",
                ty.idname()
            );
            self.gizmos.clear();
            self.order.clear();
        }
    }

    /// Whether this group participates in the given draw step.
    pub(crate) fn visible_in_step(&self, step: DrawStep) -> bool {
        let is_3d = self.ty.flags().contains(GroupTypeFlags::IS_3D);
        match step {
            DrawStep::View3d => is_3d,
            DrawStep::View2d => !is_3d,
        }
    }

    /// Whether this group is visible per its poll predicate.
    pub(crate) fn is_visible(&self, ctx: &dyn HostContext) -> bool {
        !self.ty.hooks().contains(GroupHooks::POLL) || self.ty.poll(ctx)
    }

    /// 2D intersection: first hit in insertion order wins.
    pub(crate) fn find_intersected(
        &self,
        ctx: &mut dyn HostContext,
        event: &PointerEvent,
    ) -> Option<(Handle<Gizmo>, PartId)> {
        for &handle in &self.order {
            let Some(gizmo) = self.gizmos.get(handle) else {
                continue;
            };
            if !gizmo.is_intersectable() {
                continue;
            }
            let ty = gizmo.ty_arc();
            if !ty.hooks().contains(HookSet::TEST_SELECT) {
                continue;
            }
            if let Some(part) = ty.test_select(ctx, gizmo, event) {
                return Some((handle, part));
            }
        }
        None
    }

    /// Collect handles of gizmos that can participate in 3D picking,
    /// in insertion order.
    pub(crate) fn intersectable_handles(&self, out: &mut Vec<Handle<Gizmo>>) {
        for &handle in &self.order {
            if let Some(gizmo) = self.gizmos.get(handle) {
                if gizmo.is_intersectable() {
                    out.push(handle);
                }
            }
        }
    }
}
