//! Process-wide registry of gizmo map types.
//!
//! A map type exists per (space, region) pair and records which group
//! types are bound to it. The registry is explicitly owned by the host:
//! created at startup, [`free_all`](GizmoMapTypeRegistry::free_all) at
//! shutdown, no hidden static state.

use std::sync::Arc;

use helm_core::MapIdentity;

use crate::error::GizmoError;
use crate::group::GizmoGroupType;
use crate::keymap::{KeyConfig, KeymapId};
use crate::update::{PendingUpdates, UpdateFlags};

/// One group type bound into a map type, with its deferred-update flags
/// and the keymap built for it.
pub struct GroupTypeRef {
    ty: Arc<dyn GizmoGroupType>,
    pub(crate) update: UpdateFlags,
    pub(crate) keymap: Option<KeymapId>,
}

impl GroupTypeRef {
    pub fn group_type(&self) -> &Arc<dyn GizmoGroupType> {
        &self.ty
    }

    pub fn keymap(&self) -> Option<KeymapId> {
        self.keymap
    }
}

/// Registered map type for one (space, region) pair.
pub struct GizmoMapType {
    identity: MapIdentity,
    pub(crate) refs: Vec<GroupTypeRef>,
    pub(crate) update: UpdateFlags,
}

impl GizmoMapType {
    pub fn identity(&self) -> MapIdentity {
        self.identity
    }

    /// Bound group types, in registration order.
    pub fn refs(&self) -> &[GroupTypeRef] {
        &self.refs
    }

    /// Find a live ref by idname. Refs already tagged for removal don't
    /// count: the idname may be re-registered before the flush runs.
    fn find_ref(&self, idname: &str) -> Option<usize> {
        self.refs
            .iter()
            .position(|r| r.ty.idname() == idname && !r.update.contains(UpdateFlags::REMOVE))
    }
}

/// All registered map types. One per process.
#[derive(Default)]
pub struct GizmoMapTypeRegistry {
    types: Vec<GizmoMapType>,
}

impl GizmoMapTypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Find the map type for `identity`, if registered.
    pub fn find(&self, identity: MapIdentity) -> Option<&GizmoMapType> {
        self.types.iter().find(|t| t.identity == identity)
    }

    /// Return the map type for `identity`, creating it on first request.
    pub fn ensure(&mut self, identity: MapIdentity) -> &mut GizmoMapType {
        if let Some(index) = self.types.iter().position(|t| t.identity == identity) {
            return &mut self.types[index];
        }
        self.types.insert(
            0,
            GizmoMapType {
                identity,
                refs: Vec::new(),
                update: UpdateFlags::NONE,
            },
        );
        &mut self.types[0]
    }

    pub fn types(&self) -> &[GizmoMapType] {
        &self.types
    }

    pub(crate) fn types_mut(&mut self) -> &mut [GizmoMapType] {
        &mut self.types
    }

    /// Unconditional teardown of every map type and group-type ref.
    /// Called once at host shutdown.
    pub fn free_all(&mut self) {
        self.types.clear();
    }

    /// Bind a group type into the map type for `identity`, deferring
    /// keymap build and runtime init to the next flush.
    pub fn group_type_register(
        &mut self,
        identity: MapIdentity,
        ty: Arc<dyn GizmoGroupType>,
        pending: &mut PendingUpdates,
    ) -> Result<(), GizmoError> {
        let idname = ty.idname();
        let map_type = self.ensure(identity);
        if map_type.find_ref(idname).is_some() {
            debug_assert!(false, "duplicate gizmo group type `{idname}`");
            log::error!("duplicate gizmo group type `{idname}`, registration ignored");
            return Err(GizmoError::DuplicateGroupType(idname));
        }
        map_type.refs.push(GroupTypeRef {
            ty,
            update: UpdateFlags::INIT | UpdateFlags::KEYMAP_INIT,
            keymap: None,
        });
        map_type.update |= UpdateFlags::INIT | UpdateFlags::KEYMAP_INIT;
        pending.tag_init();
        Ok(())
    }

    /// Tag a bound group type for removal on the next flush.
    pub fn group_type_unregister(
        &mut self,
        identity: MapIdentity,
        idname: &'static str,
        pending: &mut PendingUpdates,
    ) -> Result<(), GizmoError> {
        let map_type = self
            .types
            .iter_mut()
            .find(|t| t.identity == identity)
            .ok_or(GizmoError::UnknownGroupType(idname))?;
        let index = map_type
            .find_ref(idname)
            .ok_or(GizmoError::UnknownGroupType(idname))?;
        map_type.refs[index].update |= UpdateFlags::REMOVE;
        map_type.update |= UpdateFlags::REMOVE;
        pending.tag_remove();
        Ok(())
    }

    /// Rebuild keymaps for every registered group type. Used by the host
    /// when the key configuration is reloaded wholesale.
    pub fn keymap_rebuild_all(&mut self, keyconf: &mut dyn KeyConfig) {
        // item-less parent keymap that group keymaps nest under
        keyconf.find_or_create("Gizmo Groups");

        for map_type in &mut self.types {
            for type_ref in &mut map_type.refs {
                type_ref.keymap = Some(type_ref.ty.setup_keymap(keyconf));
            }
        }
    }
}
