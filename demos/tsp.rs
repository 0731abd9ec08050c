//! A tiny travelling-salesman instance: circuit + element + linear sum
//! under branch-and-bound, optionally across several workers.

use clap::Parser;
use solvo::{render_stats_table, Model, Objective, Solver, SolveOptions, VariableId};

#[derive(Parser, Debug)]
#[command(about = "Minimize a 5-city tour")]
struct Args {
    /// Worker threads (0 = one per hardware thread).
    #[arg(long, default_value_t = 1)]
    workers: usize,

    /// Print the per-propagator statistics table.
    #[arg(long)]
    stats: bool,
}

/// Symmetric distances; the diagonal is never used because the circuit
/// constraint forbids self-successors.
const DISTANCES: [[u32; 5]; 5] = [
    [1, 2, 9, 10, 7],
    [2, 1, 6, 4, 3],
    [9, 6, 1, 8, 5],
    [10, 4, 8, 1, 6],
    [7, 3, 5, 6, 1],
];

fn build() -> (Model, Vec<VariableId>, VariableId) {
    let mut model = Model::new(50);
    let successors: Vec<VariableId> = (0..5)
        .map(|_| model.new_var(1, 5).expect("city domain"))
        .collect();
    model.circuit(&successors, 0).expect("valid circuit scope");

    let mut legs = Vec::new();
    for (city, &successor) in successors.iter().enumerate() {
        let leg = model.new_var(1, 10).expect("distance domain");
        model
            .element(&DISTANCES[city], successor, leg)
            .expect("valid element posting");
        legs.push(leg);
    }
    let total = model.new_var(1, 50).expect("tour length domain");
    model
        .linear_sum(&[1, 1, 1, 1, 1], &legs, total)
        .expect("valid linear sum");
    (model, successors, total)
}

fn main() {
    tracing_subscriber::fmt::init();
    let args = Args::parse();

    let (model, successors, total) = build();
    let options = SolveOptions {
        workers: args.workers,
        ..SolveOptions::default()
    };
    let solver = Solver::with_options(model, options);

    match solver.solve_optimal(total, Objective::Minimize) {
        Ok(outcome) => {
            let mut tour = vec![1u32];
            let mut city = 0usize;
            loop {
                let next = outcome.solution.value(successors[city]);
                if next == 1 {
                    break;
                }
                tour.push(next);
                city = (next - 1) as usize;
            }
            println!(
                "tour {:?} with total distance {} ({:?})",
                tour, outcome.objective, outcome.status
            );
            if args.stats {
                println!("{}", render_stats_table(&outcome.stats, solver.model()));
            }
        }
        Err(error) => println!("no tour: {error}"),
    }
}
