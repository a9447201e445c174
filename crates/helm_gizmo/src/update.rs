//! Deferred updates for dynamic group-type (un)registration.
//!
//! Registering or removing group types during live editing does not touch
//! runtime state immediately; the work is tagged here and applied once by
//! [`run_pending_updates`], so repeated edits converge on next use.

use std::ops::{BitOr, BitOrAssign};

use crate::context::HostContext;
use crate::keymap::KeyConfig;
use crate::map::GizmoMap;
use crate::registry::GizmoMapTypeRegistry;

/// Deferred-update bits carried per map type and per group-type ref.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[repr(transparent)]
pub struct UpdateFlags(u8);

impl UpdateFlags {
    pub const NONE: Self = Self(0);
    /// Run the group type's runtime init on next flush
    pub const INIT: Self = Self(1 << 0);
    /// Build the group type's keymap on next flush
    pub const KEYMAP_INIT: Self = Self(1 << 1);
    /// Unlink the group type on next flush
    pub const REMOVE: Self = Self(1 << 2);

    pub const fn contains(self, other: Self) -> bool {
        (self.0 & other.0) == other.0
    }

    pub const fn intersects(self, other: Self) -> bool {
        (self.0 & other.0) != 0
    }

    pub(crate) fn remove(&mut self, other: Self) {
        self.0 &= !other.0;
    }
}

impl BitOr for UpdateFlags {
    type Output = Self;
    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for UpdateFlags {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

/// The two global pending bits, as an explicit value object so update
/// processing is testable without live global state.
#[derive(Clone, Copy, Debug, Default)]
pub struct PendingUpdates {
    init: bool,
    remove: bool,
}

impl PendingUpdates {
    pub fn tag_init(&mut self) {
        self.init = true;
    }

    pub fn tag_remove(&mut self) {
        self.remove = true;
    }

    pub fn is_empty(&self) -> bool {
        !self.init && !self.remove
    }
}

/// Apply all tagged registration work. Runs often; exits early when
/// nothing is pending or the host is headless.
///
/// Removals are fully drained before any init runs, so a type tagged both
/// "removed by a previous edit" and "added again" observes a clean unlink
/// before its re-init.
///
/// `maps` are the live maps the host currently owns; unlinked group types
/// lose their group instances in them, newly initialized group types gain
/// instances in maps of matching identity.
pub fn run_pending_updates(
    pending: &mut PendingUpdates,
    registry: &mut GizmoMapTypeRegistry,
    keyconf: &mut dyn KeyConfig,
    maps: &mut [&mut GizmoMap],
    ctx: &dyn HostContext,
) {
    if ctx.is_headless() {
        return;
    }
    if pending.is_empty() {
        return;
    }

    if pending.remove {
        let mut unlinked = Vec::new();
        for map_type in registry.types_mut() {
            if !map_type.update.contains(UpdateFlags::REMOVE) {
                continue;
            }
            map_type.update.remove(UpdateFlags::REMOVE);
            let identity = map_type.identity();
            map_type.refs.retain(|type_ref| {
                if type_ref.update.contains(UpdateFlags::REMOVE) {
                    unlinked.push((identity, type_ref.group_type().idname()));
                    false
                } else {
                    true
                }
            });
        }
        for (identity, idname) in unlinked {
            for map in maps.iter_mut() {
                if map.identity() == identity {
                    map.remove_group_type(idname);
                }
            }
        }
        pending.remove = false;
    }

    if pending.init {
        for map_type in registry.types_mut() {
            if !map_type
                .update
                .intersects(UpdateFlags::INIT | UpdateFlags::KEYMAP_INIT)
            {
                continue;
            }
            map_type.update.remove(UpdateFlags::INIT | UpdateFlags::KEYMAP_INIT);
            let identity = map_type.identity();
            for type_ref in &mut map_type.refs {
                if type_ref.update.contains(UpdateFlags::KEYMAP_INIT) {
                    type_ref.update.remove(UpdateFlags::KEYMAP_INIT);
                    type_ref.keymap = Some(type_ref.group_type().setup_keymap(keyconf));
                }
                if type_ref.update.contains(UpdateFlags::INIT) {
                    type_ref.update.remove(UpdateFlags::INIT);
                    for map in maps.iter_mut() {
                        if map.identity() == identity {
                            map.ensure_group_of_type(type_ref.group_type(), type_ref.keymap);
                            map.tag_refresh();
                        }
                    }
                }
            }
        }
        pending.init = false;
    }
}
