//! The multiple-dwelling puzzle: five people on five floors.
//!
//! Baker, Cooper, Fletcher, Miller and Smith live on different floors
//! of a five-floor building. Baker avoids the top floor, Cooper the
//! ground floor, Fletcher both; Cooper lives below Miller; Smith and
//! Fletcher are not on adjacent floors, and neither are Fletcher and
//! Cooper. The puzzle has exactly one solution.

use crate::{error::ModelError, model::Model, solver::engine::VariableId, Relation};

/// The people, in variable order.
pub const PEOPLE: [&str; 5] = ["baker", "cooper", "fletcher", "miller", "smith"];

/// Builds the puzzle. Returns the model and the five floor variables in
/// [`PEOPLE`] order.
pub fn model() -> Result<(Model, [VariableId; 5]), ModelError> {
    let mut model = Model::new(5);

    // The unary restrictions live in the initial domains.
    let baker = model.new_named_var("baker", 1, 4)?;
    let cooper = model.new_named_var("cooper", 2, 5)?;
    let fletcher = model.new_named_var_from_values("fletcher", &[2, 3, 4])?;
    let miller = model.new_named_var("miller", 1, 5)?;
    let smith = model.new_named_var("smith", 1, 5)?;
    let vars = [baker, cooper, fletcher, miller, smith];

    model.all_different(&vars)?;
    model.inequality(cooper, Relation::Less, miller)?;
    model.table(&[smith, fletcher], &non_adjacent_pairs())?;
    model.table(&[fletcher, cooper], &non_adjacent_pairs())?;

    Ok((model, vars))
}

/// All floor pairs at distance greater than one.
fn non_adjacent_pairs() -> Vec<Vec<u32>> {
    let mut rows = Vec::new();
    for a in 1..=5u32 {
        for b in 1..=5u32 {
            if a.abs_diff(b) > 1 {
                rows.push(vec![a, b]);
            }
        }
    }
    rows
}
