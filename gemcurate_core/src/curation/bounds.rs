//! Repair flux bounds exported from a draft reconstruction
//!
//! The automated pipeline exports reaction bounds in a spreadsheet whose
//! conventions differ from the model's: irreversible reactions written in
//! the opposite direction, and exchange bounds given from the compound's
//! point of view rather than the reaction's.

use log::warn;

use crate::configuration::CONFIGURATION;
use crate::curation::CurationError;
use crate::io::tables::BoundsRow;
use crate::metabolic_model::model::Model;

/// Apply exported bounds to non-exchange reactions.
///
/// Row ids use `-` where the model uses `_`. A row with bounds
/// `(lower_bound, 0)` at the configured minimum marks a reaction that is
/// irreversible but described in the opposite direction; its bounds are
/// flipped to the forward orientation.
pub fn apply_reaction_bounds(model: &mut Model, rows: &[BoundsRow]) -> Result<(), CurationError> {
    let config_lower = CONFIGURATION.read().unwrap().lower_bound;
    for row in rows {
        let good_id = row.id.replace('-', "_");
        let reaction = model.reaction_mut(&good_id)?;
        if row.lowerbound == config_lower && row.upperbound == 0. {
            reaction.set_bounds(row.upperbound, -row.lowerbound);
        } else {
            reaction.set_bounds(row.lowerbound, row.upperbound);
        }
    }
    Ok(())
}

/// Apply exported compound bounds to exchange reactions.
///
/// The spreadsheet states bounds from the compound's perspective, so the
/// reaction bounds are the negated and swapped pair. Compounds without a
/// matching `EX_` reaction are reported and skipped.
pub fn apply_exchange_bounds(model: &mut Model, rows: &[BoundsRow]) {
    for row in rows {
        let rxn_id = format!("EX_{}", row.id);
        match model.reactions.get_mut(&rxn_id) {
            Some(reaction) => {
                reaction.set_bounds(-row.upperbound, -row.lowerbound);
            }
            None => warn!("Reaction {} not present in the model", rxn_id),
        }
    }
}
