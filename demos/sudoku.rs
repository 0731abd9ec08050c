//! Solve a Sudoku grid, by default the classic instance shipped with
//! the crate.

use clap::Parser;
use solvo::{
    examples::sudoku::{self, Grid},
    render_stats_table, Solver,
};

#[derive(Parser, Debug)]
#[command(about = "Solve a 9x9 sudoku")]
struct Args {
    /// 81 characters, row-major; digits are givens, '.' or '0' blanks.
    grid: Option<String>,

    /// Print the per-propagator statistics table.
    #[arg(long)]
    stats: bool,
}

fn parse_grid(text: &str) -> Result<Grid, String> {
    let cells: Vec<u32> = text
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| match c {
            '.' | '0' => Ok(0),
            '1'..='9' => Ok(c as u32 - '0' as u32),
            other => Err(format!("unexpected character {other:?}")),
        })
        .collect::<Result<_, _>>()?;
    if cells.len() != 81 {
        return Err(format!("expected 81 cells, got {}", cells.len()));
    }
    let mut grid = [[0u32; 9]; 9];
    for (index, &value) in cells.iter().enumerate() {
        grid[index / 9][index % 9] = value;
    }
    Ok(grid)
}

fn main() {
    tracing_subscriber::fmt::init();
    let args = Args::parse();

    let grid = match &args.grid {
        Some(text) => match parse_grid(text) {
            Ok(grid) => grid,
            Err(message) => {
                eprintln!("bad grid: {message}");
                std::process::exit(2);
            }
        },
        None => sudoku::PUZZLE,
    };

    let (model, cells) = sudoku::model(&grid).expect("the grid shape is validated above");
    let solver = Solver::new(model);

    match solver.solve(1) {
        Ok(outcome) => {
            let solution = &outcome.solutions[0];
            for row in 0..9 {
                let line: String = (0..9)
                    .map(|col| format!(" {}", solution.value(cells[row * 9 + col])))
                    .collect();
                println!("{line}");
            }
            if args.stats {
                println!("\n{}", render_stats_table(&outcome.stats, solver.model()));
            }
        }
        Err(error) => println!("no solution: {error}"),
    }
}
