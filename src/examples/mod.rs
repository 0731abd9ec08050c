//! Worked models used by the demo programs and the test suites.

pub mod floors;
pub mod sudoku;
