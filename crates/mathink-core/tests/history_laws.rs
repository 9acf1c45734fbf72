//! Property tests for the history and memory-bound laws.

use kurbo::Point;
use mathink_core::{CanvasSession, EngineConfig, InkPoint, StrokeId};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    Draw(Vec<(f64, f64)>),
    Erase(f64, f64),
    Clear,
}

fn op_strategy() -> impl Strategy<Value = Op> {
    let coord = -200.0f64..200.0;
    prop_oneof![
        4 => prop::collection::vec((coord.clone(), coord.clone()), 1..6).prop_map(Op::Draw),
        2 => (coord.clone(), coord).prop_map(|(x, y)| Op::Erase(x, y)),
        1 => Just(Op::Clear),
    ]
}

fn apply(session: &mut CanvasSession, op: &Op) {
    match op {
        Op::Draw(points) => {
            for (i, &(x, y)) in points.iter().enumerate() {
                let point = InkPoint::new(x, y, i as u64);
                if i == 0 {
                    session.begin_stroke(point);
                } else {
                    session.extend_stroke(point);
                }
            }
            session.end_stroke();
        }
        Op::Erase(x, y) => {
            session.erase_at(Point::new(*x, *y));
        }
        Op::Clear => {
            session.clear();
        }
    }
}

/// Stroke sequence by value: ids plus sample coordinates.
fn contents(session: &CanvasSession) -> Vec<(StrokeId, Vec<(f64, f64)>)> {
    session
        .strokes()
        .iter()
        .map(|s| (s.id(), s.points().iter().map(|p| (p.x, p.y)).collect()))
        .collect()
}

proptest! {
    #[test]
    fn prop_undo_restores_prior_sequence(ops in prop::collection::vec(op_strategy(), 1..20)) {
        let mut session = CanvasSession::new();
        for op in &ops {
            let before = contents(&session);
            let could_undo = session.can_undo();
            apply(&mut session, op);
            let after = contents(&session);

            if before != after {
                prop_assert!(session.undo());
                prop_assert_eq!(contents(&session), before);
                prop_assert!(session.redo());
                prop_assert_eq!(contents(&session), after);
            } else if !could_undo {
                // A no-op never creates history.
                prop_assert!(!session.can_undo());
            }
        }
    }

    #[test]
    fn prop_undo_redo_is_identity(ops in prop::collection::vec(op_strategy(), 1..20)) {
        let mut session = CanvasSession::new();
        for op in &ops {
            apply(&mut session, op);
        }
        let current = contents(&session);
        if session.undo() {
            prop_assert!(session.redo());
        }
        prop_assert_eq!(contents(&session), current);
    }

    #[test]
    fn prop_stroke_cap_always_holds(cap in 1usize..8, count in 0usize..30) {
        let config = EngineConfig { max_strokes: cap, ..Default::default() };
        let mut session = CanvasSession::with_config(config).unwrap();
        for i in 0..count {
            session.begin_stroke(InkPoint::new(i as f64, 0.0, 0));
            session.end_stroke();
            prop_assert!(session.strokes().len() <= cap);
        }
        prop_assert_eq!(session.strokes().len(), count.min(cap));
    }
}
