//! Keymap binding for gizmo group types.
//!
//! Keymap storage and data format belong to the host; the runtime only
//! guarantees that every registered group type ends up with a keymap
//! handle, built through the [`KeyConfig`] collaborator.

/// Handle to a keymap object owned by the host key configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct KeymapId(pub u32);

/// Host key-configuration storage consumed during keymap setup.
pub trait KeyConfig {
    /// Return the keymap registered under `name`, creating it if missing.
    fn find_or_create(&mut self, name: &str) -> KeymapId;
}
