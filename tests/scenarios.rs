//! End-to-end scenarios exercising the full solve surface.

use std::collections::BTreeSet;

use pretty_assertions::assert_eq;
use solvo::{
    CancelToken, Dfa, Model, Objective, SearchStatus, Solver, SolveError, SolveOptions,
};

fn init_tracing() {
    let _ = tracing_subscriber::fmt::try_init();
}

#[test]
fn regular_ends_with_a_has_exactly_four_words() {
    init_tracing();
    // Alphabet {1=A, 2=B}; the DFA accepts words ending in A.
    let dfa = Dfa {
        states: 2,
        transitions: vec![(0, 1, 1), (0, 2, 0), (1, 1, 1), (1, 2, 0)],
        start: 0,
        accepting: vec![1],
    };

    let mut model = Model::new(2);
    let vars: Vec<u32> = (0..3).map(|_| model.new_var(1, 2).unwrap()).collect();
    model.regular(&vars, &dfa).unwrap();

    let outcome = Solver::new(model).solve(0).unwrap();
    assert_eq!(outcome.status, SearchStatus::Complete);

    let words: BTreeSet<Vec<u32>> = outcome
        .solutions
        .iter()
        .map(|solution| vars.iter().map(|&v| solution.value(v)).collect())
        .collect();
    let expected: BTreeSet<Vec<u32>> = [
        vec![1, 1, 1], // AAA
        vec![2, 1, 1], // BAA
        vec![1, 2, 1], // ABA
        vec![2, 2, 1], // BBA
    ]
    .into_iter()
    .collect();
    assert_eq!(words, expected);
}

#[test]
fn gcc_enumeration_matches_brute_force() {
    init_tracing();
    // Three vars over {1,2,3}: exactly one 1, at most two 2s.
    let mut model = Model::new(3);
    let vars: Vec<u32> = (0..3).map(|_| model.new_var(1, 3).unwrap()).collect();
    model
        .global_cardinality(&vars, &[1, 2, 3], &[1, 0, 0], &[1, 2, 3])
        .unwrap();

    let outcome = Solver::new(model).solve(0).unwrap();
    assert_eq!(outcome.status, SearchStatus::Complete);

    let found: BTreeSet<Vec<u32>> = outcome
        .solutions
        .iter()
        .map(|solution| vars.iter().map(|&v| solution.value(v)).collect())
        .collect();

    let mut expected = BTreeSet::new();
    for a in 1..=3u32 {
        for b in 1..=3u32 {
            for c in 1..=3u32 {
                let tuple = [a, b, c];
                let ones = tuple.iter().filter(|&&v| v == 1).count();
                let twos = tuple.iter().filter(|&&v| v == 2).count();
                if ones == 1 && twos <= 2 {
                    expected.insert(tuple.to_vec());
                }
            }
        }
    }
    assert_eq!(expected.len(), 12);
    assert_eq!(found, expected);
}

fn weighted_sum_model() -> (Model, u32, u32, u32) {
    // Minimize x + 2y with x, y in 1..=5.
    let mut model = Model::new(15);
    let x = model.new_var(1, 5).unwrap();
    let y = model.new_var(1, 5).unwrap();
    let objective = model.new_var(1, 15).unwrap();
    model.linear_sum(&[1, 2], &[x, y], objective).unwrap();
    (model, x, y, objective)
}

#[test]
fn optimization_without_limits_proves_the_minimum() {
    init_tracing();
    let (model, x, y, objective) = weighted_sum_model();
    let outcome = Solver::new(model)
        .solve_optimal(objective, Objective::Minimize)
        .unwrap();

    assert_eq!(outcome.status, SearchStatus::Complete);
    assert_eq!(outcome.objective, 3);
    assert_eq!(outcome.solution.value(x), 1);
    assert_eq!(outcome.solution.value(y), 1);
}

#[test]
fn anytime_optimization_returns_a_feasible_incumbent() {
    init_tracing();
    let (model, x, y, objective) = weighted_sum_model();
    let options = SolveOptions {
        node_limit: Some(3),
        ..SolveOptions::default()
    };
    let outcome = Solver::with_options(model, options)
        .solve_optimal(objective, Objective::Minimize)
        .unwrap();

    assert_eq!(outcome.status, SearchStatus::LimitReached);
    // Whatever incumbent came back must be feasible and consistent.
    let (vx, vy) = (outcome.solution.value(x), outcome.solution.value(y));
    assert!((1..=5).contains(&vx) && (1..=5).contains(&vy));
    assert_eq!(outcome.objective, vx + 2 * vy);
}

#[test]
fn maximization_mirrors_minimization() {
    init_tracing();
    let (model, x, y, objective) = weighted_sum_model();
    let outcome = Solver::new(model)
        .solve_optimal(objective, Objective::Maximize)
        .unwrap();
    assert_eq!(outcome.objective, 15);
    assert_eq!(outcome.solution.value(x), 5);
    assert_eq!(outcome.solution.value(y), 5);
}

/// Symmetric 5-city distance matrix with a known optimal tour of 26.
const DISTANCES: [[u32; 5]; 5] = [
    [1, 2, 9, 10, 7],
    [2, 1, 6, 4, 3],
    [9, 6, 1, 8, 5],
    [10, 4, 8, 1, 6],
    [7, 3, 5, 6, 1],
];

fn tsp_model() -> (Model, Vec<u32>, u32) {
    let mut model = Model::new(50);
    let successors: Vec<u32> = (0..5).map(|_| model.new_var(1, 5).unwrap()).collect();
    model.circuit(&successors, 0).unwrap();

    // legs[i] = distance from city i to its successor.
    let mut legs = Vec::new();
    for (city, &successor) in successors.iter().enumerate() {
        let leg = model.new_var(1, 10).unwrap();
        model.element(&DISTANCES[city], successor, leg).unwrap();
        legs.push(leg);
    }
    let total = model.new_var(1, 50).unwrap();
    model.linear_sum(&[1, 1, 1, 1, 1], &legs, total).unwrap();
    (model, successors, total)
}

#[test]
fn small_tsp_finds_the_optimal_tour() {
    init_tracing();
    let (model, successors, total) = tsp_model();
    let outcome = Solver::new(model)
        .solve_optimal(total, Objective::Minimize)
        .unwrap();

    assert_eq!(outcome.status, SearchStatus::Complete);
    assert_eq!(outcome.objective, 26);

    // The successor assignment really is one 5-cycle.
    let mut seen = vec![false; 5];
    let mut city = 0usize;
    for _ in 0..5 {
        assert!(!seen[city]);
        seen[city] = true;
        city = (outcome.solution.value(successors[city]) - 1) as usize;
    }
    assert_eq!(city, 0);
}

#[test]
fn parallel_satisfaction_agrees_with_sequential() {
    init_tracing();
    let (model, vars) = solvo::examples::sudoku::model(&solvo::examples::sudoku::PUZZLE).unwrap();
    let options = SolveOptions {
        workers: 2,
        ..SolveOptions::default()
    };
    let outcome = Solver::with_options(model, options).solve(1).unwrap();

    assert_eq!(outcome.solutions.len(), 1);
    let solution = &outcome.solutions[0];
    for row in 0..9 {
        for col in 0..9 {
            assert_eq!(
                solution.value(vars[row * 9 + col]),
                solvo::examples::sudoku::SOLVED[row][col]
            );
        }
    }
}

#[test]
fn parallel_enumeration_finds_the_same_set() {
    init_tracing();
    let build = || {
        let mut model = Model::new(3);
        let vars: Vec<u32> = (0..3).map(|_| model.new_var(1, 3).unwrap()).collect();
        model.all_different(&vars).unwrap();
        (model, vars)
    };

    let collect = |workers: usize| -> BTreeSet<Vec<u32>> {
        let (model, vars) = build();
        let options = SolveOptions {
            workers,
            ..SolveOptions::default()
        };
        let outcome = Solver::with_options(model, options).solve(0).unwrap();
        assert_eq!(outcome.status, SearchStatus::Complete);
        outcome
            .solutions
            .iter()
            .map(|solution| vars.iter().map(|&v| solution.value(v)).collect())
            .collect()
    };

    // Order across workers is unspecified; the sets must agree.
    assert_eq!(collect(1), collect(3));
    assert_eq!(collect(1).len(), 6);
}

#[test]
fn parallel_optimization_proves_the_same_optimum() {
    init_tracing();
    let (model, _, total) = tsp_model();
    let options = SolveOptions {
        workers: 3,
        ..SolveOptions::default()
    };
    let outcome = Solver::with_options(model, options)
        .solve_optimal(total, Objective::Minimize)
        .unwrap();
    assert_eq!(outcome.status, SearchStatus::Complete);
    assert_eq!(outcome.objective, 26);
}

#[test]
fn solution_cap_stops_the_enumeration() {
    init_tracing();
    let mut model = Model::new(3);
    let vars: Vec<u32> = (0..3).map(|_| model.new_var(1, 3).unwrap()).collect();
    model.all_different(&vars).unwrap();

    let outcome = Solver::new(model).solve(2).unwrap();
    assert_eq!(outcome.solutions.len(), 2);
    assert_eq!(outcome.status, SearchStatus::LimitReached);
}

#[test]
fn cancellation_is_observed_before_search() {
    init_tracing();
    let cancel = CancelToken::new();
    cancel.cancel();

    let mut model = Model::new(9);
    let vars: Vec<u32> = (0..9).map(|_| model.new_var(1, 9).unwrap()).collect();
    model.all_different(&vars).unwrap();

    let options = SolveOptions {
        cancel: cancel.clone(),
        ..SolveOptions::default()
    };
    let outcome = Solver::with_options(model, options).solve(0).unwrap();
    assert_eq!(outcome.status, SearchStatus::Cancelled);
    assert!(outcome.solutions.is_empty());
}

#[test]
fn cancelled_optimization_without_incumbent_errors() {
    init_tracing();
    let cancel = CancelToken::new();
    cancel.cancel();

    let (model, _x, _y, objective) = weighted_sum_model();
    let options = SolveOptions {
        cancel,
        ..SolveOptions::default()
    };
    let result = Solver::with_options(model, options).solve_optimal(objective, Objective::Minimize);
    assert!(matches!(result, Err(SolveError::Cancelled)));
}

#[test]
fn infeasible_models_report_infeasible() {
    init_tracing();
    let mut model = Model::new(2);
    let vars: Vec<u32> = (0..3).map(|_| model.new_var(1, 2).unwrap()).collect();
    model.all_different(&vars).unwrap();

    assert!(matches!(
        Solver::new(model).solve(0),
        Err(SolveError::Infeasible)
    ));
}

#[test]
fn among_count_and_lex_compose() {
    init_tracing();
    // Three vars over 1..=4; exactly two of them in {1,2} (count var
    // fixed to 3 under the shifted encoding); the sequence must be
    // lexicographically no greater than [2, 2, 4].
    let mut model = Model::new(5);
    let vars: Vec<u32> = (0..3).map(|_| model.new_var(1, 4).unwrap()).collect();
    let count = model.new_var(3, 3).unwrap();
    model.among(&vars, &[1, 2], count).unwrap();

    let bounds: Vec<u32> = [2, 2, 4]
        .iter()
        .map(|&v| model.new_var(v, v).unwrap())
        .collect();
    model.lex_less_eq(&vars, &bounds).unwrap();

    let outcome = Solver::new(model).solve(0).unwrap();
    for solution in &outcome.solutions {
        let values: Vec<u32> = vars.iter().map(|&v| solution.value(v)).collect();
        let members = values.iter().filter(|&&v| v <= 2).count();
        assert_eq!(members, 2);
        assert!(values.as_slice() <= [2u32, 2, 4].as_slice());
    }
    // [1,1,3] style assignments exist, so the set is non-empty.
    assert!(!outcome.solutions.is_empty());
}

#[test]
fn cumulative_schedules_within_capacity() {
    init_tracing();
    // Three unit-demand tasks of length 2 on a capacity-1 resource over
    // a horizon of 6: the tasks must tile 1..=6.
    let mut model = Model::new(6);
    let starts: Vec<u32> = (0..3).map(|_| model.new_var(1, 5).unwrap()).collect();
    model.cumulative(&starts, &[2, 2, 2], &[1, 1, 1], 1).unwrap();

    let outcome = Solver::new(model).solve(0).unwrap();
    assert!(!outcome.solutions.is_empty());
    for solution in &outcome.solutions {
        let mut load = [0u32; 8];
        for &start in &starts {
            let s = solution.value(start);
            load[s as usize] += 1;
            load[s as usize + 1] += 1;
        }
        assert!(load.iter().all(|&l| l <= 1));
    }
}

#[test]
fn count_constraint_counts() {
    init_tracing();
    let mut model = Model::new(4);
    let vars: Vec<u32> = (0..3).map(|_| model.new_var(1, 3).unwrap()).collect();
    // Exactly one occurrence of value 2 (shifted count = 2).
    let count = model.new_var(2, 2).unwrap();
    model.count(&vars, 2, count).unwrap();

    let outcome = Solver::new(model).solve(0).unwrap();
    assert_eq!(outcome.status, SearchStatus::Complete);
    for solution in &outcome.solutions {
        let occurrences = vars
            .iter()
            .filter(|&&v| solution.value(v) == 2)
            .count();
        assert_eq!(occurrences, 1);
    }
    // 3 positions for the 2, the rest over {1,3}: 3 * 4 = 12.
    assert_eq!(outcome.solutions.len(), 12);
}
