//! The per-region gizmo map: active groups plus interaction context.

use std::sync::Arc;

use helm_core::{Handle, HandleMap, MapIdentity, PartId};

use crate::gizmo::{Gizmo, GizmoState};
use crate::group::{GizmoGroup, GizmoGroupType};
use crate::keymap::KeymapId;
use crate::registry::GizmoMapTypeRegistry;
use crate::settings::GizmoSettings;

/// Non-owning reference to a gizmo inside a map, resolved only through
/// the owning containers. Stale refs resolve to `None`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GizmoRef {
    pub group: Handle<GizmoGroup>,
    pub gizmo: Handle<Gizmo>,
}

/// Interaction context of one map.
#[derive(Default)]
pub(crate) struct InteractionCtx {
    /// Gizmo under the pointer, if any
    pub(crate) highlight: Option<GizmoRef>,
    /// Gizmo exclusively owning input, if any
    pub(crate) modal: Option<GizmoRef>,
    /// Currently selected gizmos
    pub(crate) selected: Vec<GizmoRef>,
}

/// Runtime gizmo state of one editor region.
///
/// Owns the active groups (and through them every gizmo instance) plus
/// the interaction context. All access is single-threaded by contract:
/// the host event/render loop drives it.
pub struct GizmoMap {
    identity: MapIdentity,
    pub(crate) groups: HandleMap<GizmoGroup>,
    /// Group traversal order (registration order)
    pub(crate) order: Vec<Handle<GizmoGroup>>,
    pub(crate) interaction: InteractionCtx,
    /// Set by [`tag_refresh`](Self::tag_refresh); cleared by a full draw pass
    pub(crate) refresh_pending: bool,
    settings: GizmoSettings,
}

impl GizmoMap {
    /// Create a map with one group per group type registered for
    /// `identity`, creating the map type on first use.
    ///
    /// Group population is best-effort: a group whose init later fails is
    /// simply absent, without failing map construction.
    pub fn new_from_type(
        registry: &mut GizmoMapTypeRegistry,
        identity: MapIdentity,
        settings: GizmoSettings,
    ) -> Self {
        let mut map = Self {
            identity,
            groups: HandleMap::new(),
            order: Vec::new(),
            interaction: InteractionCtx::default(),
            refresh_pending: true,
            settings,
        };
        let map_type = registry.ensure(identity);
        for type_ref in map_type.refs() {
            map.add_group(Arc::clone(type_ref.group_type()), type_ref.keymap());
        }
        map
    }

    pub fn identity(&self) -> MapIdentity {
        self.identity
    }

    pub fn settings(&self) -> &GizmoSettings {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut GizmoSettings {
        &mut self.settings
    }

    /// Request a refresh pass on the next full draw. Safe to call from
    /// any host mutation (an operator finishing, scene edits, ...).
    pub fn tag_refresh(&mut self) {
        self.refresh_pending = true;
    }

    pub fn needs_refresh(&self) -> bool {
        self.refresh_pending
    }

    /// Group handles in traversal order.
    pub fn group_handles(&self) -> &[Handle<GizmoGroup>] {
        &self.order
    }

    /// Iterate groups in traversal order.
    pub fn groups(&self) -> impl Iterator<Item = (Handle<GizmoGroup>, &GizmoGroup)> {
        self.order
            .iter()
            .filter_map(move |&h| self.groups.get(h).map(|g| (h, g)))
    }

    pub fn group(&self, handle: Handle<GizmoGroup>) -> Option<&GizmoGroup> {
        self.groups.get(handle)
    }

    pub fn group_mut(&mut self, handle: Handle<GizmoGroup>) -> Option<&mut GizmoGroup> {
        self.groups.get_mut(handle)
    }

    /// Resolve a weak gizmo reference.
    pub fn gizmo(&self, gref: GizmoRef) -> Option<&Gizmo> {
        self.groups.get(gref.group)?.get(gref.gizmo)
    }

    pub fn gizmo_mut(&mut self, gref: GizmoRef) -> Option<&mut Gizmo> {
        self.groups.get_mut(gref.group)?.get_mut(gref.gizmo)
    }

    /// Find the group instantiated from the given group type, if any.
    pub fn find_group_of_type(&self, idname: &str) -> Option<Handle<GizmoGroup>> {
        self.order
            .iter()
            .copied()
            .find(|&h| {
                self.groups
                    .get(h)
                    .map(|g| g.group_type().idname() == idname)
                    .unwrap_or(false)
            })
    }

    pub fn selected(&self) -> &[GizmoRef] {
        &self.interaction.selected
    }

    pub fn is_any_selected(&self) -> bool {
        !self.interaction.selected.is_empty()
    }

    /// Free every group and clear the interaction context. Equivalent to
    /// dropping the map, for hosts that tear a region down explicitly.
    pub fn clear(&mut self) {
        self.order.clear();
        self.groups.clear();
        self.interaction = InteractionCtx::default();
    }

    /// Instantiate a group from `ty` behind all existing groups.
    pub(crate) fn add_group(
        &mut self,
        ty: Arc<dyn GizmoGroupType>,
        keymap: Option<KeymapId>,
    ) -> Handle<GizmoGroup> {
        let handle = self.groups.insert(GizmoGroup::new(ty, keymap));
        self.order.push(handle);
        handle
    }

    /// Instantiate a group from `ty` unless one already exists, refreshing
    /// the existing group's keymap handle otherwise.
    pub(crate) fn ensure_group_of_type(
        &mut self,
        ty: &Arc<dyn GizmoGroupType>,
        keymap: Option<KeymapId>,
    ) -> Handle<GizmoGroup> {
        if let Some(handle) = self.find_group_of_type(ty.idname()) {
            if let Some(group) = self.groups.get_mut(handle) {
                group.set_keymap(keymap);
            }
            return handle;
        }
        self.add_group(Arc::clone(ty), keymap)
    }

    /// Remove the group instantiated from the named group type, clearing
    /// any interaction-context references into it first.
    pub(crate) fn remove_group_type(&mut self, idname: &str) -> bool {
        let Some(handle) = self.find_group_of_type(idname) else {
            return false;
        };
        self.clear_refs_into_group(handle);
        self.order.retain(|&h| h != handle);
        self.groups.remove(handle);
        true
    }

    /// Drop highlight/modal/selection references pointing into `handle`,
    /// resetting the referenced gizmos' state bits directly (no host side
    /// effects; this runs during teardown paths without a context).
    fn clear_refs_into_group(&mut self, handle: Handle<GizmoGroup>) {
        if let Some(gref) = self.interaction.highlight {
            if gref.group == handle {
                if let Some(gizmo) = self.gizmo_mut(gref) {
                    gizmo.state.remove(GizmoState::HIGHLIGHT);
                    gizmo.highlight_part = PartId::NONE;
                }
                self.interaction.highlight = None;
            }
        }
        if let Some(gref) = self.interaction.modal {
            if gref.group == handle {
                if let Some(gizmo) = self.gizmo_mut(gref) {
                    gizmo.state.remove(GizmoState::MODAL);
                    gizmo.interaction = None;
                }
                self.interaction.modal = None;
            }
        }
        let selected = std::mem::take(&mut self.interaction.selected);
        self.interaction.selected = selected
            .into_iter()
            .filter(|gref| {
                if gref.group != handle {
                    return true;
                }
                if let Some(gizmo) = self.groups.get_mut(gref.group).and_then(|g| g.get_mut(gref.gizmo)) {
                    gizmo.state.remove(GizmoState::SELECT);
                }
                false
            })
            .collect();
    }
}
