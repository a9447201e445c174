//! Shared fixtures: a recording host context, fake draw/pick backends and
//! minimal gizmo/group types driven entirely in software.

// each test binary uses a different subset of the fixtures
#![allow(dead_code)]

use std::any::Any;
use std::sync::{Arc, Mutex};

use helm_core::{CursorKind, MapIdentity, OperatorId, PartId, PointerEvent, RegionKind, SpaceKind};
use helm_gizmo::{
    DrawBackend, Gizmo, GizmoGroup, GizmoGroupType, GizmoType, GroupHooks, GroupTypeFlags,
    HostContext, HookSet, KeyConfig, KeymapId, OperatorOutcome, PickBackend, PickPass, PickRect,
    SelectId,
};

pub const VIEW3D_MAIN: MapIdentity = MapIdentity::new(SpaceKind(1), RegionKind(1));

/// Host context that records every side effect the runtime requests.
pub struct TestHost {
    pub redraws: usize,
    pub cursors: Vec<CursorKind>,
    pub grabs: Vec<bool>,
    pub pointer_moves: usize,
    pub invoked: Vec<OperatorId>,
    /// Outcome reported for the next operator invocation
    pub outcome: OperatorOutcome,
    pub headless: bool,
}

impl Default for TestHost {
    fn default() -> Self {
        Self {
            redraws: 0,
            cursors: Vec::new(),
            grabs: Vec::new(),
            pointer_moves: 0,
            invoked: Vec::new(),
            outcome: OperatorOutcome::Running,
            headless: false,
        }
    }
}

impl HostContext for TestHost {
    fn request_redraw(&mut self) {
        self.redraws += 1;
    }

    fn set_cursor(&mut self, cursor: CursorKind) {
        self.cursors.push(cursor);
    }

    fn grab_cursor(&mut self, grab: bool) {
        self.grabs.push(grab);
    }

    fn push_pointer_move(&mut self) {
        self.pointer_moves += 1;
    }

    fn invoke_operator(
        &mut self,
        op: OperatorId,
        _props: &serde_json::Value,
        _event: &PointerEvent,
    ) -> OperatorOutcome {
        self.invoked.push(op);
        self.outcome
    }

    fn is_headless(&self) -> bool {
        self.headless
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Draw backend recording drawn gizmo names with the depth-test state
/// they were drawn under.
#[derive(Default)]
pub struct TestDrawBackend {
    pub drawn: Vec<(String, bool)>,
    pub depth_toggles: usize,
    pub depth_on: bool,
    pub multisample_events: Vec<bool>,
}

impl DrawBackend for TestDrawBackend {
    fn set_depth_test(&mut self, enabled: bool) {
        self.depth_on = enabled;
        self.depth_toggles += 1;
    }

    fn set_multisample(&mut self, enabled: bool) {
        self.multisample_events.push(enabled);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Software selection buffer: gizmo types score their own distance
/// against the active window and the nearest recorded depth wins.
#[derive(Default)]
pub struct TestPickBackend {
    pub refinement: bool,
    pub rect: Option<PickRect>,
    pub passes: Vec<(PickPass, i32)>,
    hits: Vec<(SelectId, f32)>,
}

impl TestPickBackend {
    pub fn with_refinement() -> Self {
        Self {
            refinement: true,
            ..Self::default()
        }
    }
}

impl PickBackend for TestPickBackend {
    fn supports_refinement(&self) -> bool {
        self.refinement
    }

    fn set_depth_test(&mut self, _enabled: bool) {}

    fn begin(&mut self, rect: PickRect, pass: PickPass) {
        self.passes.push((pass, rect.radius));
        self.rect = Some(rect);
        self.hits.clear();
    }

    fn record(&mut self, id: SelectId, depth: f32) {
        self.hits.push((id, depth));
    }

    fn end(&mut self) -> Option<SelectId> {
        self.rect = None;
        // nearest wins; ties keep the first recorded hit
        self.hits
            .iter()
            .copied()
            .min_by(|(_, a), (_, b)| a.partial_cmp(b).expect("depth is never NaN"))
            .map(|(id, _)| id)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Key configuration that hands out sequential ids and logs every lookup.
#[derive(Default)]
pub struct TestKeyConfig {
    pub created: Vec<String>,
}

impl KeyConfig for TestKeyConfig {
    fn find_or_create(&mut self, name: &str) -> KeymapId {
        if let Some(index) = self.created.iter().position(|n| n == name) {
            return KeymapId(index as u32);
        }
        self.created.push(name.to_string());
        KeymapId((self.created.len() - 1) as u32)
    }
}

/// 2D button gizmo: hit when the pointer is within `radius` of `center`.
pub struct ButtonGizmo {
    pub center: [f32; 2],
    pub radius: f32,
    pub cursor: Option<CursorKind>,
    pub operator_hooks: bool,
}

impl ButtonGizmo {
    pub fn at(center: [f32; 2], radius: f32) -> Arc<Self> {
        Arc::new(Self {
            center,
            radius,
            cursor: None,
            operator_hooks: false,
        })
    }

    pub fn with_cursor(center: [f32; 2], radius: f32, cursor: CursorKind) -> Arc<Self> {
        Arc::new(Self {
            center,
            radius,
            cursor: Some(cursor),
            operator_hooks: false,
        })
    }

    /// Variant declaring invoke+modal, for modal-activation tests.
    pub fn interactive(center: [f32; 2], radius: f32) -> Arc<Self> {
        Arc::new(Self {
            center,
            radius,
            cursor: None,
            operator_hooks: true,
        })
    }
}

impl GizmoType for ButtonGizmo {
    fn idname(&self) -> &'static str {
        "TEST_GT_button"
    }

    fn hooks(&self) -> HookSet {
        let mut hooks = HookSet::TEST_SELECT | HookSet::SELECT;
        if self.cursor.is_some() {
            hooks |= HookSet::CURSOR;
        }
        if self.operator_hooks {
            hooks |= HookSet::INVOKE | HookSet::MODAL;
        }
        hooks
    }

    fn draw(&self, _ctx: &mut dyn HostContext, gizmo: &Gizmo, backend: &mut dyn DrawBackend) {
        record_draw(gizmo, backend);
    }

    fn test_select(
        &self,
        _ctx: &mut dyn HostContext,
        _gizmo: &Gizmo,
        event: &PointerEvent,
    ) -> Option<PartId> {
        let dx = event.position[0] - self.center[0];
        let dy = event.position[1] - self.center[1];
        ((dx * dx + dy * dy).sqrt() <= self.radius).then_some(PartId(1))
    }

    fn invoke(&self, _ctx: &mut dyn HostContext, gizmo: &mut Gizmo, _event: &PointerEvent) {
        gizmo.set_interaction_data(Box::new("drag-state"));
    }

    fn cursor(&self, _gizmo: &Gizmo) -> CursorKind {
        self.cursor.unwrap_or_default()
    }
}

/// 3D dot gizmo picked through the selection buffer. `depth` orders
/// overlapping candidates for the nearest-first policy.
pub struct DotGizmo {
    pub position: [f32; 2],
    pub depth: f32,
}

impl DotGizmo {
    pub fn at(position: [f32; 2], depth: f32) -> Arc<Self> {
        Arc::new(Self { position, depth })
    }
}

impl GizmoType for DotGizmo {
    fn idname(&self) -> &'static str {
        "TEST_GT_dot"
    }

    fn hooks(&self) -> HookSet {
        HookSet::DRAW_SELECT
    }

    fn draw(&self, _ctx: &mut dyn HostContext, gizmo: &Gizmo, backend: &mut dyn DrawBackend) {
        record_draw(gizmo, backend);
    }

    fn draw_select(
        &self,
        _ctx: &mut dyn HostContext,
        _gizmo: &Gizmo,
        id: SelectId,
        backend: &mut dyn PickBackend,
    ) {
        let backend = backend
            .as_any_mut()
            .downcast_mut::<TestPickBackend>()
            .expect("tests drive the software pick backend");
        let rect = backend.rect.expect("record outside a pick pass");
        let dx = self.position[0] - rect.center[0] as f32;
        let dy = self.position[1] - rect.center[1] as f32;
        if (dx * dx + dy * dy).sqrt() <= rect.radius as f32 {
            backend.record(id.with_part(PartId(1)), self.depth);
        }
    }
}

/// Group type with configurable flags and no optional hooks; tests
/// populate its groups directly.
pub struct FixtureGroup {
    pub idname: &'static str,
    pub flags: GroupTypeFlags,
}

impl FixtureGroup {
    pub fn new(idname: &'static str, flags: GroupTypeFlags) -> Arc<Self> {
        Arc::new(Self { idname, flags })
    }
}

impl GizmoGroupType for FixtureGroup {
    fn idname(&self) -> &'static str {
        self.idname
    }

    fn flags(&self) -> GroupTypeFlags {
        self.flags
    }
}

/// Group type that populates itself on init and logs its hook calls into
/// a shared sequence.
pub struct CountingGroup {
    pub idname: &'static str,
    pub flags: GroupTypeFlags,
    pub events: Arc<Mutex<Vec<String>>>,
}

impl CountingGroup {
    pub fn new(
        idname: &'static str,
        flags: GroupTypeFlags,
        events: Arc<Mutex<Vec<String>>>,
    ) -> Arc<Self> {
        Arc::new(Self {
            idname,
            flags,
            events,
        })
    }

    fn log(&self, hook: &str) {
        self.events.lock().unwrap().push(format!("{hook}:{}", self.idname));
    }
}

impl GizmoGroupType for CountingGroup {
    fn idname(&self) -> &'static str {
        self.idname
    }

    fn flags(&self) -> GroupTypeFlags {
        self.flags
    }

    fn hooks(&self) -> GroupHooks {
        GroupHooks::INIT | GroupHooks::REFRESH | GroupHooks::DRAW_PREPARE
    }

    fn init(
        &self,
        _ctx: &mut dyn HostContext,
        group: &mut GizmoGroup,
    ) -> Result<(), helm_gizmo::GizmoError> {
        self.log("init");
        group.add(Gizmo::new("button", ButtonGizmo::at([0.0, 0.0], 5.0)));
        Ok(())
    }

    fn refresh(&self, _ctx: &mut dyn HostContext, _group: &mut GizmoGroup) {
        self.log("refresh");
    }

    fn draw_prepare(&self, _ctx: &mut dyn HostContext, _group: &mut GizmoGroup) {
        self.log("draw_prepare");
    }

    fn setup_keymap(&self, keyconf: &mut dyn KeyConfig) -> KeymapId {
        self.log("keymap");
        keyconf.find_or_create(self.idname)
    }
}

/// Record a visual draw into the fake backend, tagging the current
/// depth-test state.
pub fn record_draw(gizmo: &Gizmo, backend: &mut dyn DrawBackend) {
    let backend = backend
        .as_any_mut()
        .downcast_mut::<TestDrawBackend>()
        .expect("tests drive the software draw backend");
    let depth_on = backend.depth_on;
    backend.drawn.push((gizmo.name().to_string(), depth_on));
}
