//! Integration tests against the real Z3 binary.
//!
//! Every test spawns its own solver process through `Session::spawn`.

use std::collections::BTreeSet;

use num_bigint::BigUint;
use symsolve_expr::{Arg, Ast, Op};
use symsolve_smtlib::term::Term;
use symsolve_solver::{
    CheckResult, Session, SolverConfig, SolverError, SolverKind, SolverResult, Value, lift, lower,
};

// ---- Helpers ----

fn session() -> Session {
    let config = SolverConfig::auto_detect().expect("Z3 should be on PATH");
    Session::spawn(&config).expect("Z3 should start")
}

fn x() -> Ast {
    Ast::symbol("x", 8)
}

fn c(v: u32) -> Ast {
    Ast::constant(v, 8)
}

/// `5 <= x < 10`
fn window() -> Vec<Ast> {
    vec![
        Ast::binary(Op::UGe, x(), c(5)),
        Ast::binary(Op::ULt, x(), c(10)),
    ]
}

fn as_u64s(values: &[Value]) -> Vec<u64> {
    values.iter().filter_map(Value::as_u64).collect()
}

// ============================================================
// Session
// ============================================================

#[test]
fn spawn_and_check_empty() {
    let mut s = session();
    assert_eq!(s.check().unwrap(), CheckResult::Sat);
    assert!(s.current_model().unwrap().is_empty());
}

#[test]
fn spawn_missing_binary() {
    let config = SolverConfig::new(SolverKind::Z3, "/nonexistent/z3".into());
    let err = Session::spawn(&config).unwrap_err();
    assert!(matches!(err, SolverError::NotFound(SolverKind::Z3, _)));
}

#[test]
fn scopes_are_balanced_across_queries() {
    let mut s = session();
    s.eval(&x(), 4, &window()).unwrap();
    s.min(&x(), &window()).unwrap();
    s.max(&x(), &window()).unwrap();
    let impossible = [Ast::binary(Op::ULt, x(), c(0))];
    assert!(s.eval(&x(), 2, &impossible).is_err());
    assert_eq!(s.depth(), 0);
    // Nothing asserted by the queries is still live.
    let pinned = [Ast::binary(Op::Eq, x(), c(200))];
    let vs = s.eval(&x(), 1, &pinned).unwrap();
    assert_eq!(as_u64s(&vs), vec![200]);
}

#[test]
fn pop_below_base() {
    let mut s = session();
    assert_eq!(s.pop(), Err(SolverError::ScopeUnderflow { depth: 0 }));
}

#[test]
fn declarations_survive_pop() {
    let mut s = session();
    s.scoped(|s| s.add_constraints(&[Ast::binary(Op::UGt, x(), c(3))]))
        .unwrap();
    // `x` was declared inside the popped scope; asserting it again must work.
    let pinned = [Ast::binary(Op::Eq, x(), c(42))];
    s.add_constraints(&pinned).unwrap();
    let result = s.solve().unwrap();
    assert_eq!(
        result.model().and_then(|m| m.get_bv("x")),
        Some(&BigUint::from(42u32))
    );
}

#[test]
fn solver_errors_are_reported() {
    let mut s = session();
    // Ill-sorted: bvadd of a Bool.
    let bad = Term::app(
        "=",
        vec![
            Term::app("bvadd", vec![Term::BoolLit(true), Term::bv(1u32, 8)]),
            Term::bv(1u32, 8),
        ],
    );
    assert!(matches!(s.assert_terms(&[bad]), Err(SolverError::Solver(_))));
    // The session is still usable afterwards.
    assert_eq!(s.check().unwrap(), CheckResult::Sat);
}

#[test]
fn sort_conflicts_are_caught_before_the_solver() {
    let mut s = session();
    let narrow = [Ast::binary(Op::Eq, x(), c(1))];
    s.add_constraints(&narrow).unwrap();
    let wide = Ast::symbol("x", 16);
    let err = s
        .add_constraints(&[Ast::binary(Op::Eq, wide, Ast::constant(1u32, 16))])
        .unwrap_err();
    assert!(matches!(err, SolverError::SortConflict { .. }));
}

#[test]
fn quoted_symbols() {
    let mut s = session();
    let odd = Ast::symbol("reg[3] hi", 8);
    let pinned = [Ast::binary(Op::Eq, odd, c(7))];
    s.add_constraints(&pinned).unwrap();
    let result = s.solve().unwrap();
    assert_eq!(
        result.model().and_then(|m| m.get_bv("reg[3] hi")),
        Some(&BigUint::from(7u32))
    );
}

// ============================================================
// Queries
// ============================================================

#[test]
fn solve_sat_and_unsat() {
    let mut s = session();
    s.add_constraints(&window()).unwrap();
    let result = s.solve().unwrap();
    let x_val = result
        .model()
        .and_then(|m| m.get("x"))
        .and_then(Value::as_u64)
        .expect("model should assign x");
    assert!((5..10).contains(&x_val), "x = {x_val}");

    let outside = [Ast::binary(Op::UGt, x(), c(20))];
    s.add_constraints(&outside).unwrap();
    assert_eq!(s.solve().unwrap(), SolverResult::Unsat);
}

#[test]
fn min_and_max_of_window() {
    let mut s = session();
    assert_eq!(s.min(&x(), &window()).unwrap(), BigUint::from(5u32));
    assert_eq!(s.max(&x(), &window()).unwrap(), BigUint::from(9u32));
    assert_eq!(s.depth(), 0);
}

#[test]
fn min_and_max_of_wide_expression() {
    let mut s = session();
    let y = Ast::symbol("y", 64);
    let shifted = Ast::binary(Op::Add, y, Ast::constant(1u32, 64));
    // y + 1 wraps, so its range is the full 64-bit space.
    assert_eq!(s.min(&shifted, &[]).unwrap(), BigUint::from(0u32));
    assert_eq!(s.max(&shifted, &[]).unwrap(), BigUint::from(u64::MAX));
}

#[test]
fn eval_bound() {
    let mut s = session();
    let vs = s.eval(&x(), 3, &window()).unwrap();
    assert_eq!(vs.len(), 3);
    let distinct: BTreeSet<u64> = as_u64s(&vs).into_iter().collect();
    assert_eq!(distinct.len(), 3);
    assert!(distinct.iter().all(|v| (5..10).contains(v)));
}

#[test]
fn eval_exhaustion() {
    let mut s = session();
    let vs = s.eval(&x(), 100, &window()).unwrap();
    let found: BTreeSet<u64> = as_u64s(&vs).into_iter().collect();
    assert_eq!(found, (5..10).collect());
}

#[test]
fn eval_tautology() {
    let mut s = session();
    let taut = [Ast::binary(Op::Eq, x(), x())];
    let vs = s.eval(&x(), 3, &taut).unwrap();
    let distinct: BTreeSet<u64> = as_u64s(&vs).into_iter().collect();
    assert_eq!(distinct.len(), 3);
}

#[test]
fn eval_of_unconstrained_variable() {
    let mut s = session();
    let y = Ast::symbol("y", 8);
    let only_y = [Ast::binary(Op::ULt, y, c(3))];
    let vs = s.eval(&x(), 2, &only_y).unwrap();
    let distinct: BTreeSet<u64> = as_u64s(&vs).into_iter().collect();
    assert_eq!(distinct.len(), 2);
}

#[test]
fn eval_unsat() {
    let mut s = session();
    let contradiction = [
        Ast::binary(Op::ULt, x(), c(3)),
        Ast::binary(Op::UGt, x(), c(3)),
    ];
    assert_eq!(
        s.eval(&x(), 1, &contradiction),
        Err(SolverError::UnsatisfiableQuery)
    );
    assert_eq!(
        s.min(&x(), &contradiction),
        Err(SolverError::UnsatisfiableQuery)
    );
    assert_eq!(s.depth(), 0);
}

#[test]
fn is_satisfiable_does_not_leak() {
    let mut s = session();
    let impossible = [Ast::binary(Op::ULt, x(), c(0))];
    assert!(!s.is_satisfiable(&impossible).unwrap());
    assert!(s.is_satisfiable(&[]).unwrap());
}

// ============================================================
// Translation against solver output
// ============================================================

#[test]
fn round_trip_is_equivalent() {
    let mut s = session();
    let y = Ast::symbol("y", 8);
    let node = Ast::op(
        Op::And,
        [
            Ast::binary(Op::ULt, x(), y.clone()),
            Ast::binary(Op::Ne, Ast::binary(Op::BvXor, x(), y.clone()), c(3)),
        ],
    );
    let lowered = lower(&node).unwrap();
    let lifted = lift(&lowered).unwrap();
    let relowered = lower(&lifted.ast).unwrap();

    // Lower(n) <=> Lower(Lift(Lower(n))) is valid: its negation is unsat.
    let iff = Term::eq(lowered, relowered);
    s.assert_terms(&[Term::not(iff)]).unwrap();
    assert_eq!(s.check().unwrap(), CheckResult::Unsat);
}

#[test]
fn extract_round_trip() {
    let node = Ast::extract(7, 4, x());
    let lifted = lift(&lower(&node).unwrap()).unwrap();
    let relowered = lower(&lifted.ast).unwrap();
    assert_eq!(relowered.indices(), &[7, 4]);

    let mut s = session();
    let pinned = [Ast::binary(Op::Eq, x(), c(0xa5))];
    let vs = s.eval(&node, 1, &pinned).unwrap();
    assert_eq!(vs, vec![Value::bv(0xau32, 4)]);
}

#[test]
fn simplify_lifts_solver_terms() {
    let mut s = session();
    let folded = s.simplify(&Ast::binary(Op::Add, c(250), c(10))).unwrap();
    assert_eq!(folded.ast(), &c(4));

    let expr = s.simplify(&Ast::op(Op::And, window())).unwrap();
    assert!(expr.is_symbolic());
    assert_eq!(expr.variables(), &BTreeSet::from(["x".to_string()]));
}

#[test]
fn simplified_conjunction_wraps_children() {
    let mut s = session();
    let y = Ast::symbol("y", 8);
    let both = Ast::op(
        Op::And,
        [
            Ast::binary(Op::Eq, x(), c(1)),
            Ast::binary(Op::Eq, y, c(2)),
        ],
    );
    let expr = s.simplify(&both).unwrap();
    let Ast::Op { op: Op::And, args } = expr.ast() else {
        panic!("expected a conjunction, got {}", expr.ast());
    };
    assert_eq!(args.len(), 2);
    assert!(args.iter().all(|a| matches!(a, Arg::Wrapped(_))));
}

#[test]
fn model_values_use_declared_widths() {
    let mut s = session();
    let wide = Ast::symbol("w", 100);
    let big = BigUint::from(1u32) << 99u32;
    let pinned = Ast::binary(Op::Eq, wide, Ast::constant(big.clone(), 100));
    s.add_constraints(&[pinned]).unwrap();
    let model = match s.solve().unwrap() {
        SolverResult::Sat(model) => model,
        SolverResult::Unsat => panic!("expected sat"),
    };
    assert_eq!(model.get("w"), Some(&Value::bv(big, 100)));
}
