//! Classic 9x9 Sudoku as 81 variables under 27 all-different groups.

use crate::{error::ModelError, model::Model, solver::engine::VariableId};

/// A grid of givens; `0` marks an empty cell.
pub type Grid = [[u32; 9]; 9];

/// The well-known puzzle used throughout the tests and the demo.
pub const PUZZLE: Grid = [
    [5, 3, 0, 0, 7, 0, 0, 0, 0],
    [6, 0, 0, 1, 9, 5, 0, 0, 0],
    [0, 9, 8, 0, 0, 0, 0, 6, 0],
    [8, 0, 0, 0, 6, 0, 0, 0, 3],
    [4, 0, 0, 8, 0, 3, 0, 0, 1],
    [7, 0, 0, 0, 2, 0, 0, 0, 6],
    [0, 6, 0, 0, 0, 0, 2, 8, 0],
    [0, 0, 0, 4, 1, 9, 0, 0, 5],
    [0, 0, 0, 0, 8, 0, 0, 7, 9],
];

/// The unique completion of [`PUZZLE`].
pub const SOLVED: Grid = [
    [5, 3, 4, 6, 7, 8, 9, 1, 2],
    [6, 7, 2, 1, 9, 5, 3, 4, 8],
    [1, 9, 8, 3, 4, 2, 5, 6, 7],
    [8, 5, 9, 7, 6, 1, 4, 2, 3],
    [4, 2, 6, 8, 5, 3, 7, 9, 1],
    [7, 1, 3, 9, 2, 4, 8, 5, 6],
    [9, 6, 1, 5, 3, 7, 2, 8, 4],
    [2, 8, 7, 4, 1, 9, 6, 3, 5],
    [3, 4, 5, 2, 8, 6, 1, 7, 9],
];

/// Builds a model for `puzzle`. Cell variables come back row-major.
pub fn model(puzzle: &Grid) -> Result<(Model, Vec<VariableId>), ModelError> {
    let mut model = Model::new(9);
    let mut cells = Vec::with_capacity(81);
    for row in puzzle {
        for &given in row {
            let cell = if given == 0 {
                model.new_var(1, 9)?
            } else {
                model.new_var(given, given)?
            };
            cells.push(cell);
        }
    }

    for row in 0..9 {
        let vars: Vec<VariableId> = (0..9).map(|col| cells[row * 9 + col]).collect();
        model.all_different(&vars)?;
    }
    for col in 0..9 {
        let vars: Vec<VariableId> = (0..9).map(|row| cells[row * 9 + col]).collect();
        model.all_different(&vars)?;
    }
    for band in 0..3 {
        for stack in 0..3 {
            let vars: Vec<VariableId> = (0..9)
                .map(|k| cells[(band * 3 + k / 3) * 9 + stack * 3 + k % 3])
                .collect();
            model.all_different(&vars)?;
        }
    }

    Ok((model, cells))
}
