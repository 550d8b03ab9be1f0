//! Property-based invariant tests for the sync session.
//!
//! 1. After any sequence of host edits and rebuilds, at most one panel exists
//! 2. A mounted panel lists every user message with a text container, in order
//! 3. Every item targets a node that was a user message at rebuild time
//! 4. Any burst of added-node batches inside one window fires one rebuild
//! 5. Drag preserves the grab offset for arbitrary start and pointer paths

use core::time::Duration;

use promptnav_core::{
    ManipulationController, ManipulationRegion, MutationRecord, NavigatorConfig, PanelGeometry,
    PointerPosition, RebuildScheduler, SelectorExtractor, SyncSession,
};
use promptnav_harness::{FakeDocument, FakeNodeId, FakeSurface};
use proptest::prelude::*;

const PANEL: &str = "prompt-sidebar";

// ── Strategies ──────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
enum Op {
    PushUser(String),
    PushAssistant,
    PushBlankUser,
    PrependUser(String),
    RemoveFirst,
    Clear,
    DetachPanel,
    ToggleBody,
    Rebuild,
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => "[a-z ]{0,12}".prop_map(Op::PushUser),
        2 => Just(Op::PushAssistant),
        1 => Just(Op::PushBlankUser),
        1 => "[a-z]{1,8}".prop_map(Op::PrependUser),
        1 => Just(Op::RemoveFirst),
        1 => Just(Op::Clear),
        1 => Just(Op::DetachPanel),
        1 => Just(Op::ToggleBody),
        4 => Just(Op::Rebuild),
    ]
}

fn apply(
    op: &Op,
    doc: &mut FakeDocument,
    surface: &mut FakeSurface,
    session: &mut SyncSession<SelectorExtractor, FakeNodeId>,
    body: &mut bool,
) {
    match op {
        Op::PushUser(text) => {
            doc.push_user(text);
        }
        Op::PushAssistant => {
            doc.push_assistant("reply");
        }
        Op::PushBlankUser => {
            doc.push_user_without_text();
        }
        Op::PrependUser(text) => {
            doc.prepend_user(text);
        }
        Op::RemoveFirst => {
            if let Some(first) = doc.query_first_message() {
                doc.remove(first);
            }
        }
        Op::Clear => doc.clear(),
        Op::DetachPanel => surface.detach_externally(PANEL),
        Op::ToggleBody => {
            *body = !*body;
            surface.set_body_available(*body);
        }
        Op::Rebuild => {
            session.rebuild_now(&*doc, surface);
        }
    }
}

/// Extension used only by these properties.
trait FirstMessage {
    fn query_first_message(&self) -> Option<FakeNodeId>;
}

impl FirstMessage for FakeDocument {
    fn query_first_message(&self) -> Option<FakeNodeId> {
        use promptnav_core::HostDocument;
        self.query_all(promptnav_core::config::DEFAULT_MESSAGE_SELECTOR)
            .into_iter()
            .next()
    }
}

fn carry_over_strategy() -> impl Strategy<Value = bool> {
    any::<bool>()
}

// ── Properties ──────────────────────────────────────────────────────────

proptest! {
    #[test]
    fn at_most_one_panel_after_any_sequence(
        ops in proptest::collection::vec(op_strategy(), 1..60),
        carry_over in carry_over_strategy(),
    ) {
        let config = NavigatorConfig {
            carry_over_geometry: carry_over,
            ..NavigatorConfig::default()
        };
        let extractor = SelectorExtractor::from_config(&config);
        let mut session = SyncSession::new(config, extractor);
        let mut doc = FakeDocument::new();
        let mut surface = FakeSurface::new();
        let mut body = true;
        session.start(&doc, Duration::ZERO);

        for op in &ops {
            apply(op, &mut doc, &mut surface, &mut session, &mut body);
            prop_assert!(surface.count(PANEL) <= 1);
        }
    }

    #[test]
    fn successful_rebuild_lists_user_messages_in_order(
        ops in proptest::collection::vec(op_strategy(), 0..40),
    ) {
        let config = NavigatorConfig::default();
        let extractor = SelectorExtractor::from_config(&config);
        let mut session = SyncSession::new(config, extractor);
        let mut doc = FakeDocument::new();
        let mut surface = FakeSurface::new();
        let mut body = true;
        session.start(&doc, Duration::ZERO);
        for op in &ops {
            apply(op, &mut doc, &mut surface, &mut session, &mut body);
        }

        surface.set_body_available(true);
        let outcome = session.rebuild_now(&doc, &mut surface);
        let expected = doc.user_texts();
        if expected.is_empty() {
            prop_assert_eq!(outcome.items(), None);
        } else {
            let panel = surface.panel(PANEL).expect("panel mounted");
            prop_assert_eq!(outcome.items(), Some(expected.len()));
            prop_assert_eq!(&panel.labels, &expected);
            for target in &panel.targets {
                prop_assert!(doc.top_of(*target).is_some());
            }
            prop_assert_eq!(session.targets(), panel.targets.as_slice());
        }
    }

    #[test]
    fn burst_within_window_fires_once(
        gaps in proptest::collection::vec(0u64..50, 1..40),
        window_ms in 500u64..2000,
    ) {
        let window = Duration::from_millis(window_ms);
        let mut scheduler = RebuildScheduler::new(Duration::from_secs(60), window);
        let mut now = Duration::ZERO;
        let mut first = None;
        let mut fired = 0;
        for gap in &gaps {
            now += Duration::from_millis(*gap);
            let deadline = *first.get_or_insert(now) + window;
            if now >= deadline {
                break;
            }
            scheduler.on_mutations(&[MutationRecord::child_list(1)], now);
            if scheduler.poll(now).is_some() {
                fired += 1;
            }
        }
        let deadline = first.unwrap_or(Duration::ZERO) + window;
        if scheduler.poll(deadline).is_some() {
            fired += 1;
        }
        prop_assert_eq!(fired, 1);
    }

    #[test]
    fn drag_preserves_grab_offset(
        x in -2000.0f64..2000.0,
        y in -2000.0f64..2000.0,
        grab_x in 0.0f64..300.0,
        grab_y in 0.0f64..30.0,
        path in proptest::collection::vec((-3000.0f64..3000.0, -3000.0f64..3000.0), 1..20),
    ) {
        let mut controller = ManipulationController::default();
        let start = PanelGeometry::new(x, y, 300.0, 400.0);
        controller.pointer_down(
            ManipulationRegion::DragHandle,
            1,
            PointerPosition::new(x + grab_x, y + grab_y),
            start,
        );
        for (px, py) in path {
            let dispatch = controller.pointer_move(1, PointerPosition::new(px, py));
            let geometry = dispatch.geometry.expect("drag move yields geometry");
            prop_assert!((px - geometry.position.x - grab_x).abs() < 1e-6);
            prop_assert!((py - geometry.position.y - grab_y).abs() < 1e-6);
            prop_assert_eq!(geometry.size, start.size);
        }
    }
}
