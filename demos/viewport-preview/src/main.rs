//! Headless walkthrough of the gizmo-map runtime.
//!
//! Wires software draw/pick backends and two toy gizmo group types
//! through the full produced interface: registration, deferred flush,
//! per-frame drawing, pointer picking, selection and a modal session.

use std::any::Any;
use std::sync::Arc;

use helm_core::{
    CursorKind, MapIdentity, OperatorId, PartId, PointerEvent, RegionKind, SpaceKind,
};
use helm_gizmo::{
    run_pending_updates, DrawBackend, DrawStep, Gizmo, GizmoError, GizmoGroup, GizmoGroupType,
    GizmoMap, GizmoMapTypeRegistry, GizmoSettings, GizmoType, GroupHooks, GroupTypeFlags,
    HostContext, HookSet, KeyConfig, KeymapId, OperatorBinding, OperatorOutcome, PendingUpdates,
    PickBackend, PickPass, PickRect, SelectAction, SelectId,
};

const VIEW3D_MAIN: MapIdentity = MapIdentity::new(SpaceKind(1), RegionKind(1));

/// Host stub that logs every requested side effect.
struct ConsoleHost;

impl HostContext for ConsoleHost {
    fn request_redraw(&mut self) {
        log::debug!("host: redraw requested");
    }

    fn set_cursor(&mut self, cursor: CursorKind) {
        log::info!("host: cursor -> {cursor:?}");
    }

    fn grab_cursor(&mut self, grab: bool) {
        log::info!("host: cursor grab {}", if grab { "on" } else { "off" });
    }

    fn push_pointer_move(&mut self) {
        log::debug!("host: synthetic pointer-move queued");
    }

    fn invoke_operator(
        &mut self,
        op: OperatorId,
        _props: &serde_json::Value,
        _event: &PointerEvent,
    ) -> OperatorOutcome {
        log::info!("host: operator `{op}` invoked, modal session running");
        OperatorOutcome::Running
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Draw backend that prints instead of rasterizing.
#[derive(Default)]
struct ConsoleDraw {
    depth_on: bool,
}

impl DrawBackend for ConsoleDraw {
    fn set_depth_test(&mut self, enabled: bool) {
        self.depth_on = enabled;
        log::debug!("draw: depth test {}", if enabled { "on" } else { "off" });
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Software selection buffer; gizmos score their own distance.
#[derive(Default)]
struct SoftwarePick {
    rect: Option<PickRect>,
    hits: Vec<(SelectId, f32)>,
}

impl PickBackend for SoftwarePick {
    fn supports_refinement(&self) -> bool {
        true
    }

    fn set_depth_test(&mut self, _enabled: bool) {}

    fn begin(&mut self, rect: PickRect, pass: PickPass) {
        log::debug!("pick: {pass:?} pass, {}px window", rect.radius);
        self.rect = Some(rect);
        self.hits.clear();
    }

    fn record(&mut self, id: SelectId, depth: f32) {
        self.hits.push((id, depth));
    }

    fn end(&mut self) -> Option<SelectId> {
        self.rect = None;
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

/// Simple key configuration handing out sequential ids.
#[derive(Default)]
struct DemoKeyConfig {
    names: Vec<String>,
}

impl KeyConfig for DemoKeyConfig {
    fn find_or_create(&mut self, name: &str) -> KeymapId {
        if let Some(index) = self.names.iter().position(|n| n == name) {
            return KeymapId(index as u32);
        }
        log::info!("keyconf: keymap `{name}` created");
        self.names.push(name.to_string());
        KeymapId((self.names.len() - 1) as u32)
    }
}

/// 3D axis handle picked through the selection buffer.
struct AxisGizmo {
    screen: [f32; 2],
    depth: f32,
}

impl GizmoType for AxisGizmo {
    fn idname(&self) -> &'static str {
        "DEMO_GT_axis"
    }

    fn hooks(&self) -> HookSet {
        HookSet::DRAW_SELECT | HookSet::INVOKE | HookSet::MODAL | HookSet::CURSOR
    }

    fn draw(&self, _ctx: &mut dyn HostContext, gizmo: &Gizmo, backend: &mut dyn DrawBackend) {
        let depth = backend
            .as_any()
            .downcast_ref::<ConsoleDraw>()
            .map(|b| b.depth_on)
            .unwrap_or(false);
        log::info!(
            "draw: `{}` at {:?} (depth test {})",
            gizmo.name(),
            self.screen,
            if depth { "on" } else { "off" }
        );
    }

    fn draw_select(
        &self,
        _ctx: &mut dyn HostContext,
        _gizmo: &Gizmo,
        id: SelectId,
        backend: &mut dyn PickBackend,
    ) {
        let Some(pick) = backend.as_any_mut().downcast_mut::<SoftwarePick>() else {
            return;
        };
        let Some(rect) = pick.rect else {
            return;
        };
        let dx = self.screen[0] - rect.center[0] as f32;
        let dy = self.screen[1] - rect.center[1] as f32;
        if (dx * dx + dy * dy).sqrt() <= rect.radius as f32 {
            pick.record(id.with_part(PartId(1)), self.depth);
        }
    }

    fn invoke(&self, _ctx: &mut dyn HostContext, gizmo: &mut Gizmo, event: &PointerEvent) {
        gizmo.set_interaction_data(Box::new(event.position));
    }

    fn cursor(&self, _gizmo: &Gizmo) -> CursorKind {
        CursorKind::Move
    }
}

/// Group of three translate handles.
struct TranslateGroup;

impl GizmoGroupType for TranslateGroup {
    fn idname(&self) -> &'static str {
        "DEMO_GGT_translate"
    }

    fn flags(&self) -> GroupTypeFlags {
        GroupTypeFlags::IS_3D | GroupTypeFlags::DEPTH_3D | GroupTypeFlags::SELECT
    }

    fn hooks(&self) -> GroupHooks {
        GroupHooks::INIT | GroupHooks::REFRESH
    }

    fn init(&self, _ctx: &mut dyn HostContext, group: &mut GizmoGroup) -> Result<(), GizmoError> {
        let op = OperatorId("transform.translate");
        for (name, screen, depth) in [
            ("axis_x", [130.0_f32, 100.0_f32], 0.4_f32),
            ("axis_y", [100.0, 70.0], 0.5),
            ("axis_z", [104.0, 98.0], 0.6),
        ] {
            group.add(
                Gizmo::new(
                    name,
                    Arc::new(AxisGizmo {
                        screen,
                        depth,
                    }),
                )
                .with_operator(OperatorBinding::new(op)),
            );
        }
        Ok(())
    }

    fn refresh(&self, _ctx: &mut dyn HostContext, _group: &mut GizmoGroup) {
        log::debug!("group `DEMO_GGT_translate`: refresh");
    }
}

fn main() {
    env_logger::init();

    let mut registry = GizmoMapTypeRegistry::new();
    let mut pending = PendingUpdates::default();
    let mut keyconf = DemoKeyConfig::default();
    let mut host = ConsoleHost;

    registry
        .group_type_register(VIEW3D_MAIN, Arc::new(TranslateGroup), &mut pending)
        .expect("fresh registry has no duplicates");

    let mut map = GizmoMap::new_from_type(&mut registry, VIEW3D_MAIN, GizmoSettings::default());
    run_pending_updates(&mut pending, &mut registry, &mut keyconf, &mut [&mut map], &host);

    // frame 1: draw the overlay
    let mut draw = ConsoleDraw::default();
    map.draw(&mut host, DrawStep::View3d, &mut draw);

    // pointer moves near the cluster: two-pass pick resolves axis_z
    let mut pick = SoftwarePick::default();
    let event = PointerEvent::motion([102.0, 99.0]);
    match map.highlight_find(&mut host, &event, &mut pick) {
        Some((gref, part)) => {
            let name = map.gizmo(gref).map(|g| g.name().to_string()).unwrap_or_default();
            log::info!("picked `{name}` part {part}");
            map.highlight_set(Some(&mut host), Some(gref), part);

            // press: the gizmo goes modal and drives its operator
            map.modal_set(&mut host, &event, Some(gref));
            log::info!("modal gizmo: {:?}", map.modal().and_then(|r| map.gizmo(r)).map(|g| g.name().to_string()));

            // release: back to idle
            map.modal_set(&mut host, &event, None);
        }
        None => log::info!("nothing under the pointer"),
    }

    // select everything, then clear
    map.select_all(&mut host, SelectAction::Select);
    log::info!("selected {} gizmos", map.selected().len());
    map.select_all(&mut host, SelectAction::Deselect);

    map.draw(&mut host, DrawStep::View3d, &mut draw);

    registry.free_all();
}
