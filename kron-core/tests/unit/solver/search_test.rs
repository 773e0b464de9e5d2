use super::*;
use std::time::Duration;

fn budget() -> Duration {
    Duration::from_secs(10)
}

#[test]
fn can_find_optimal_assignment() {
    let mut model = SolveModel::default();
    let x = model.add_var(Domain::Slots(vec![0, 1, 2, 3]));
    let y = model.add_var(Domain::Slots(vec![0, 1, 2, 3]));
    model.add_constraint(Expr::lt(Expr::Var(x), Expr::Var(y)));

    let objective = Expr::Add(vec![Expr::Var(x), Expr::Var(y)]);

    match SlotSearchBackend.maximize(&model, &objective, budget()) {
        Maximization::Optimal { best, value } => {
            assert_eq!(value, 5.);
            assert_eq!(best[x], Value::Num(2.));
            assert_eq!(best[y], Value::Num(3.));
        }
        other => panic!("expected optimal, got {other:?}"),
    }
}

#[test]
fn can_prove_unsat() {
    let mut model = SolveModel::default();
    let x = model.add_var(Domain::Slots(vec![0, 1]));
    model.add_constraint(Expr::lt(Expr::Var(x), Expr::Num(0.)));

    let result = SlotSearchBackend.maximize(&model, &Expr::Var(x), budget());

    assert!(matches!(result, Maximization::Unsat));
}

#[test]
fn can_reject_contradictory_grounded_constraint() {
    let mut model = SolveModel::default();
    model.add_var(Domain::Bool);
    model.add_constraint(Expr::Bool(false));

    let result = SlotSearchBackend.check(&model, budget());

    assert!(matches!(result, Feasibility::Unsat));
}

#[test]
fn can_check_satisfiability() {
    let mut model = SolveModel::default();
    let x = model.add_var(Domain::Slots(vec![0, 5]));
    model.add_constraint(Expr::le(Expr::Num(5.), Expr::Var(x)));

    match SlotSearchBackend.check(&model, budget()) {
        Feasibility::Sat(assignment) => assert_eq!(assignment[x], Value::Num(5.)),
        other => panic!("expected sat, got {other:?}"),
    }
}

#[test]
fn can_solve_empty_model() {
    let model = SolveModel::default();

    match SlotSearchBackend.maximize(&model, &Expr::Num(7.), budget()) {
        Maximization::Optimal { value, .. } => assert_eq!(value, 7.),
        other => panic!("expected optimal, got {other:?}"),
    }
}

#[test]
fn can_respect_conditional_objective() {
    let mut model = SolveModel::default();
    let flag = model.add_var(Domain::Bool);
    let x = model.add_var(Domain::Slots(vec![0, 1, 2]));
    // the flag is only allowed with a small x
    model.add_constraint(Expr::implies(Expr::Var(flag), Expr::le(Expr::Var(x), Expr::Num(1.))));

    // taking the flag is worth more than the larger x
    let objective = Expr::Add(vec![
        Expr::iff(Expr::Var(flag), Expr::Num(10.), Expr::Num(0.)),
        Expr::Var(x),
    ]);

    match SlotSearchBackend.maximize(&model, &objective, budget()) {
        Maximization::Optimal { best, value } => {
            assert_eq!(value, 11.);
            assert_eq!(best[flag], Value::Bool(true));
            assert_eq!(best[x], Value::Num(1.));
        }
        other => panic!("expected optimal, got {other:?}"),
    }
}

#[test]
fn can_report_bounds_on_exhausted_budget() {
    let mut model = SolveModel::default();
    for _ in 0..12 {
        model.add_var(Domain::Slots((0..12).collect()));
    }
    let objective = Expr::Add((0..12).map(Expr::Var).collect());

    let result = SlotSearchBackend.maximize(&model, &objective, Duration::from_millis(0));

    match result {
        Maximization::Bounded { upper, .. } => assert_eq!(upper, 132.),
        Maximization::Optimal { value, .. } => assert_eq!(value, 132.),
        other => panic!("unexpected {other:?}"),
    }
}
