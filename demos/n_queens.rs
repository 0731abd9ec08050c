//! N-queens: one queen per column, no two sharing a row or diagonal.

use clap::Parser;
use solvo::{render_stats_table, Model, Solver, SolveOptions, VariableId};

#[derive(Parser, Debug)]
#[command(about = "Solve the n-queens puzzle")]
struct Args {
    /// Board size.
    #[arg(short = 'n', long, default_value_t = 8)]
    size: u32,

    /// Enumerate every solution instead of stopping at the first.
    #[arg(long)]
    all: bool,

    /// Print the first solution as JSON.
    #[arg(long)]
    json: bool,

    /// Print the per-propagator statistics table.
    #[arg(long)]
    stats: bool,

    /// Worker threads (0 = one per hardware thread).
    #[arg(long, default_value_t = 1)]
    workers: usize,
}

/// One variable per column holding the queen's row. Diagonal attacks
/// are channelled into offset variables so that three all-differents
/// cover the whole problem.
fn build(n: u32) -> (Model, Vec<VariableId>) {
    let mut model = Model::new(2 * n);
    let queens: Vec<VariableId> = (0..n)
        .map(|_| model.new_var(1, n).expect("row domain fits the value space"))
        .collect();
    model.all_different(&queens).expect("non-empty scope");

    let mut rising = Vec::with_capacity(n as usize);
    let mut falling = Vec::with_capacity(n as usize);
    for (column, &queen) in queens.iter().enumerate() {
        let up = model.new_var(1, 2 * n).expect("diagonal domain");
        model
            .offset(queen, column as i64, up)
            .expect("valid offset channel");
        rising.push(up);

        let down = model.new_var(1, 2 * n).expect("diagonal domain");
        model
            .offset(queen, n as i64 - column as i64, down)
            .expect("valid offset channel");
        falling.push(down);
    }
    model.all_different(&rising).expect("non-empty scope");
    model.all_different(&falling).expect("non-empty scope");

    (model, queens)
}

fn print_board(n: u32, rows: &[u32]) {
    for row in (1..=n).rev() {
        let line: String = rows
            .iter()
            .map(|&queen| if queen == row { " Q" } else { " ." })
            .collect();
        println!("{line}");
    }
    println!();
}

fn main() {
    tracing_subscriber::fmt::init();
    let args = Args::parse();

    let (model, queens) = build(args.size);
    let options = SolveOptions {
        workers: args.workers,
        ..SolveOptions::default()
    };
    let solver = Solver::with_options(model, options);

    let max_solutions = if args.all { 0 } else { 1 };
    match solver.solve(max_solutions) {
        Ok(outcome) => {
            println!(
                "{} solution(s), status {:?}\n",
                outcome.solutions.len(),
                outcome.status
            );
            for solution in &outcome.solutions {
                let rows: Vec<u32> = queens.iter().map(|&q| solution.value(q)).collect();
                print_board(args.size, &rows);
            }
            if args.json {
                if let Some(first) = outcome.solutions.first() {
                    let rows: Vec<u32> = queens.iter().map(|&q| first.value(q)).collect();
                    println!(
                        "{}",
                        serde_json::to_string(&rows).expect("rows serialize cleanly")
                    );
                }
            }
            if args.stats {
                println!("{}", render_stats_table(&outcome.stats, solver.model()));
            }
        }
        Err(error) => println!("no solution: {error}"),
    }
}
