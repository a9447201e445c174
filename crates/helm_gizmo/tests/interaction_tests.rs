//! Interaction state machine tests: highlight, selection, modal ownership.

mod common;

use std::sync::{Arc, Mutex};

use common::*;
use helm_core::{CursorKind, Handle, OperatorId, PartId, PointerEvent};
use helm_gizmo::{
    handled_modal_update, Gizmo, GizmoGroup, GizmoMap, GizmoMapTypeRegistry, GizmoRef,
    GizmoSettings, GroupTypeFlags, HostContext, HookSet, ModalFlags, OperatorBinding,
    OperatorOutcome, PendingUpdates, SelectAction,
};

/// Map with one fixture group of the given flags, not yet populated.
fn build_map(flags: GroupTypeFlags) -> (GizmoMap, Handle<GizmoGroup>) {
    let mut registry = GizmoMapTypeRegistry::new();
    let mut pending = PendingUpdates::default();
    registry
        .group_type_register(VIEW3D_MAIN, FixtureGroup::new("TEST_GGT_fixture", flags), &mut pending)
        .unwrap();
    let mut map = GizmoMap::new_from_type(&mut registry, VIEW3D_MAIN, GizmoSettings::default());
    let handle = map.group_handles()[0];
    (map, handle)
}

fn add_button(map: &mut GizmoMap, group: Handle<GizmoGroup>, name: &str) -> GizmoRef {
    let gizmo = map
        .group_mut(group)
        .unwrap()
        .add(Gizmo::new(name, ButtonGizmo::at([0.0, 0.0], 5.0)));
    GizmoRef { group, gizmo }
}

#[test]
fn test_select_all_roundtrip() {
    let (mut map, group) = build_map(GroupTypeFlags::SELECT);
    let refs = [
        add_button(&mut map, group, "a"),
        add_button(&mut map, group, "b"),
        add_button(&mut map, group, "c"),
    ];
    let mut host = TestHost::default();

    assert!(map.select_all(&mut host, SelectAction::Select));
    assert_eq!(map.selected().len(), 3);
    assert!(map.is_any_selected());
    for gref in refs {
        assert!(map.gizmo(gref).unwrap().is_selected());
    }
    assert_eq!(host.pointer_moves, 1);

    assert!(map.select_all(&mut host, SelectAction::Deselect));
    assert_eq!(map.selected().len(), 0);
    assert!(!map.is_any_selected());
    for gref in refs {
        assert!(!map.gizmo(gref).unwrap().is_selected());
    }
    assert_eq!(host.pointer_moves, 2);
}

#[test]
fn test_select_all_is_idempotent() {
    let (mut map, group) = build_map(GroupTypeFlags::SELECT);
    add_button(&mut map, group, "a");
    add_button(&mut map, group, "b");
    let mut host = TestHost::default();

    assert!(map.select_all(&mut host, SelectAction::Select));
    let first: std::collections::HashSet<String> = map
        .selected()
        .iter()
        .map(|&r| map.gizmo(r).unwrap().name().to_string())
        .collect();

    // bits are already set, so nothing changes
    assert!(!map.select_all(&mut host, SelectAction::Select));
    let second: std::collections::HashSet<String> = map
        .selected()
        .iter()
        .map(|&r| map.gizmo(r).unwrap().name().to_string())
        .collect();
    assert_eq!(first, second);
}

#[test]
fn test_select_all_dedups_by_name() {
    let (mut map, group) = build_map(GroupTypeFlags::SELECT);
    add_button(&mut map, group, "dup");
    add_button(&mut map, group, "dup");
    add_button(&mut map, group, "other");
    let mut host = TestHost::default();

    map.select_all(&mut host, SelectAction::Select);
    assert_eq!(map.selected().len(), 2);
}

#[test]
fn test_deselect_empty_is_no_change() {
    let (mut map, _) = build_map(GroupTypeFlags::SELECT);
    let mut host = TestHost::default();
    assert!(!map.select_all(&mut host, SelectAction::Deselect));
    assert_eq!(host.pointer_moves, 0);
}

#[test]
fn test_select_all_highlights_first_collected() {
    let (mut map, group) = build_map(GroupTypeFlags::SELECT);
    add_button(&mut map, group, "a");
    let mut host = TestHost::default();

    map.select_all(&mut host, SelectAction::Select);
    let highlight = map.highlight().expect("first collected gizmo is highlighted");
    assert!(map.gizmo(highlight).unwrap().is_highlighted());
}

#[test]
fn test_select_all_skips_unselectable_groups() {
    let (mut map, group) = build_map(GroupTypeFlags::NONE);
    add_button(&mut map, group, "a");
    let mut host = TestHost::default();

    assert!(!map.select_all(&mut host, SelectAction::Select));
    assert_eq!(map.selected().len(), 0);
}

#[test]
fn test_highlight_set_same_target_is_noop() {
    let (mut map, group) = build_map(GroupTypeFlags::NONE);
    let gref = add_button(&mut map, group, "a");
    let mut host = TestHost::default();

    map.highlight_set(Some(&mut host), Some(gref), PartId(1));
    assert_eq!(host.redraws, 1);

    // same gizmo and part: no side effects at all
    map.highlight_set(Some(&mut host), Some(gref), PartId(1));
    assert_eq!(host.redraws, 1);
    assert_eq!(host.cursors.len(), 0);

    // same gizmo, different part: state change again
    map.highlight_set(Some(&mut host), Some(gref), PartId(2));
    assert_eq!(host.redraws, 2);
    assert_eq!(map.gizmo(gref).unwrap().highlight_part(), PartId(2));
}

#[test]
fn test_highlight_moves_carry_single_bit() {
    let (mut map, group) = build_map(GroupTypeFlags::NONE);
    let a = add_button(&mut map, group, "a");
    let b = add_button(&mut map, group, "b");
    let mut host = TestHost::default();

    map.highlight_set(Some(&mut host), Some(a), PartId(1));
    map.highlight_set(Some(&mut host), Some(b), PartId(1));

    assert!(!map.gizmo(a).unwrap().is_highlighted());
    assert_eq!(map.gizmo(a).unwrap().highlight_part(), PartId::NONE);
    assert!(map.gizmo(b).unwrap().is_highlighted());
    assert_eq!(map.highlight(), Some(b));
}

#[test]
fn test_highlight_clear_requests_default_cursor() {
    let (mut map, group) = build_map(GroupTypeFlags::NONE);
    let gref = add_button(&mut map, group, "a");
    let mut host = TestHost::default();

    map.highlight_set(Some(&mut host), Some(gref), PartId(1));
    map.highlight_set(Some(&mut host), None, PartId::NONE);

    assert_eq!(map.highlight(), None);
    assert_eq!(host.cursors.last(), Some(&CursorKind::Default));
}

#[test]
fn test_highlight_cursor_hook() {
    let (mut map, group) = build_map(GroupTypeFlags::NONE);
    let gizmo = map.group_mut(group).unwrap().add(Gizmo::new(
        "grab",
        ButtonGizmo::with_cursor([0.0, 0.0], 5.0, CursorKind::Move),
    ));
    let gref = GizmoRef { group, gizmo };
    let mut host = TestHost::default();

    map.highlight_set(Some(&mut host), Some(gref), PartId(1));
    assert_eq!(host.cursors, vec![CursorKind::Move]);
}

#[test]
fn test_modal_activate_then_deactivate_restores_state() {
    let (mut map, group) = build_map(GroupTypeFlags::NONE);
    let gizmo = map
        .group_mut(group)
        .unwrap()
        .add(Gizmo::new("drag", ButtonGizmo::interactive([0.0, 0.0], 5.0)));
    let gref = GizmoRef { group, gizmo };
    let mut host = TestHost::default();
    let event = PointerEvent::motion([0.0, 0.0]);

    map.modal_set(&mut host, &event, Some(gref));
    assert_eq!(map.modal(), Some(gref));
    assert!(map.gizmo(gref).unwrap().is_modal());
    // invoke stashed its drag state and the cursor was grabbed
    assert!(map.gizmo(gref).unwrap().interaction_data().is_some());
    assert_eq!(host.grabs, vec![true]);

    map.modal_set(&mut host, &event, None);
    assert_eq!(map.modal(), None);
    assert!(!map.gizmo(gref).unwrap().is_modal());
    assert!(map.gizmo(gref).unwrap().interaction_data().is_none());
    assert_eq!(host.grabs, vec![true, false]);
    assert_eq!(host.pointer_moves, 1);
    assert!(host.redraws > 0);
}

#[test]
fn test_modal_with_operator_invokes_host() {
    let (mut map, group) = build_map(GroupTypeFlags::NONE);
    let op = OperatorId("transform.translate");
    let gizmo = map.group_mut(group).unwrap().add(
        Gizmo::new("drag", ButtonGizmo::interactive([0.0, 0.0], 5.0))
            .with_operator(OperatorBinding::new(op)),
    );
    let gref = GizmoRef { group, gizmo };
    let mut host = TestHost::default();
    let event = PointerEvent::motion([0.0, 0.0]);

    map.modal_set(&mut host, &event, Some(gref));
    assert_eq!(host.invoked, vec![op]);
    assert_eq!(map.modal(), Some(gref));
    // operator-bound activation does not grab the cursor itself
    assert!(host.grabs.is_empty());
}

#[test]
fn test_modal_rolls_back_when_operator_finishes() {
    let (mut map, group) = build_map(GroupTypeFlags::NONE);
    let gizmo = map.group_mut(group).unwrap().add(
        Gizmo::new("drag", ButtonGizmo::interactive([0.0, 0.0], 5.0))
            .with_operator(OperatorBinding::new(OperatorId("transform.translate"))),
    );
    let gref = GizmoRef { group, gizmo };
    let event = PointerEvent::motion([0.0, 0.0]);

    for outcome in [OperatorOutcome::Finished, OperatorOutcome::Rejected] {
        let mut host = TestHost {
            outcome,
            ..TestHost::default()
        };
        map.modal_set(&mut host, &event, Some(gref));

        assert_eq!(map.modal(), None);
        assert!(!map.gizmo(gref).unwrap().is_modal());
        assert!(map.gizmo(gref).unwrap().interaction_data().is_none());
    }
}

#[test]
fn test_handled_modal_update_forwards_while_running() {
    struct ProbeGizmo {
        modal_calls: Arc<Mutex<usize>>,
    }

    impl helm_gizmo::GizmoType for ProbeGizmo {
        fn idname(&self) -> &'static str {
            "TEST_GT_probe"
        }

        fn hooks(&self) -> HookSet {
            HookSet::MODAL
        }

        fn draw(
            &self,
            _ctx: &mut dyn HostContext,
            _gizmo: &Gizmo,
            _backend: &mut dyn helm_gizmo::DrawBackend,
        ) {
        }

        fn modal(
            &self,
            _ctx: &mut dyn HostContext,
            _gizmo: &mut Gizmo,
            _event: &PointerEvent,
            _flags: ModalFlags,
        ) {
            *self.modal_calls.lock().unwrap() += 1;
        }
    }

    let (mut map, group) = build_map(GroupTypeFlags::NONE);
    let modal_calls = Arc::new(Mutex::new(0));
    let op = OperatorId("transform.translate");
    let gizmo = map.group_mut(group).unwrap().add(
        Gizmo::new(
            "probe",
            Arc::new(ProbeGizmo {
                modal_calls: Arc::clone(&modal_calls),
            }),
        )
        .with_operator(OperatorBinding::new(op)),
    );
    let gref = GizmoRef { group, gizmo };
    let mut host = TestHost::default();
    let event = PointerEvent::motion([0.0, 0.0]);

    map.modal_set(&mut host, &event, Some(gref));
    assert_eq!(map.modal(), Some(gref));

    // operator still running: events go to the gizmo's modal hook
    handled_modal_update(Some(&mut map), &mut host, &event, Some(op));
    handled_modal_update(Some(&mut map), &mut host, &event, Some(op));
    assert_eq!(*modal_calls.lock().unwrap(), 2);
    assert_eq!(map.modal(), Some(gref));

    // a different operator's events are not forwarded
    handled_modal_update(Some(&mut map), &mut host, &event, Some(OperatorId("other.op")));
    assert_eq!(*modal_calls.lock().unwrap(), 2);

    // operator ended: highlight and modal state are released
    handled_modal_update(Some(&mut map), &mut host, &event, None);
    assert_eq!(map.modal(), None);
    assert_eq!(map.highlight(), None);
    assert!(!map.gizmo(gref).unwrap().is_modal());
}

#[test]
fn test_handled_modal_update_without_map_is_silent() {
    let mut host = TestHost::default();
    let event = PointerEvent::motion([0.0, 0.0]);
    handled_modal_update(None, &mut host, &event, None);
    assert_eq!(host.redraws, 0);
}

#[test]
fn test_cursor_resolution_first_declaring_map_wins() {
    let (mut plain_map, plain_group) = build_map(GroupTypeFlags::NONE);
    let plain = add_button(&mut plain_map, plain_group, "plain");

    let (mut cursor_map, cursor_group) = build_map(GroupTypeFlags::NONE);
    let gizmo = cursor_map.group_mut(cursor_group).unwrap().add(Gizmo::new(
        "grab",
        ButtonGizmo::with_cursor([0.0, 0.0], 5.0, CursorKind::Crosshair),
    ));
    let with_cursor = GizmoRef {
        group: cursor_group,
        gizmo,
    };

    plain_map.highlight_set(None, Some(plain), PartId(1));
    cursor_map.highlight_set(None, Some(with_cursor), PartId(1));

    let mut host = TestHost::default();
    // the first map's highlight declares no cursor hook, so the chain
    // falls through to the second map
    assert!(helm_gizmo::cursor_set(&[&plain_map, &cursor_map], &mut host));
    assert_eq!(host.cursors, vec![CursorKind::Crosshair]);

    host.cursors.clear();
    assert!(!helm_gizmo::cursor_set(&[&plain_map], &mut host));
    assert!(host.cursors.is_empty());
}
