//! Overlay runtime settings.

use serde::{Deserialize, Serialize};

/// Tunables for gizmo picking and drawing, one set per map.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct GizmoSettings {
    /// Pixel tolerance window around the pointer for 3D picking.
    /// Pick passes render a window of half this value per side.
    pub hotspot: f32,
    /// Scale applied to the coarse pick radius for the refinement pass.
    pub refine_scale: f32,
    /// Enable multisampling while drawing the gizmo overlay.
    pub multisample: bool,
}

impl Default for GizmoSettings {
    fn default() -> Self {
        Self {
            hotspot: 14.0,
            refine_scale: 0.4,
            multisample: false,
        }
    }
}
