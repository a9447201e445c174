//! Pointer events and cursor kinds delivered by the host event loop.

/// Mouse button identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

/// Modifier key state at the time of an event.
#[derive(Clone, Copy, Debug, Default)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
}

/// Pointer event forwarded into the overlay runtime.
#[derive(Clone, Debug)]
pub struct PointerEvent {
    /// Position in region-local pixels
    pub position: [f32; 2],
    /// Movement since the previous event
    pub delta: [f32; 2],
    /// Button involved, if this is a press/release
    pub button: Option<MouseButton>,
    /// Whether the button was pressed (false = released)
    pub pressed: bool,
    pub modifiers: Modifiers,
}

impl PointerEvent {
    /// A motion-only event at the given region-local position.
    pub fn motion(position: [f32; 2]) -> Self {
        Self {
            position,
            delta: [0.0, 0.0],
            button: None,
            pressed: false,
            modifiers: Modifiers::default(),
        }
    }

    /// Position rounded to whole pixels, for pick-window arithmetic.
    pub fn pixel(&self) -> [i32; 2] {
        [self.position[0].round() as i32, self.position[1].round() as i32]
    }
}

/// Pointer cursor shapes the runtime can request from the host.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CursorKind {
    #[default]
    Default,
    Crosshair,
    Move,
    Hand,
    ResizeHorizontal,
    ResizeVertical,
}
