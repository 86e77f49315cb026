//! Configure a model to match a culture condition
//!
//! A condition is a medium (what can be consumed), a secretion policy (what
//! can be excreted), the matching biomass objective, and the GAM/NGAM
//! maintenance parameters for the reactor type. Media live as CSV files
//! under a media directory, alongside `atp_param.csv`.

pub mod knockouts;

use std::path::Path;

use log::debug;
use thiserror::Error;

use crate::configuration::CONFIGURATION;
use crate::curation::biomass::{set_ngam, set_reaction_gam};
use crate::curation::CurationError;
use crate::io::tables::{
    load_medium, load_secretion, AtpParamTable, FluxRow, TableError,
};
use crate::metabolic_model::model::{Model, ModelError};

pub const BOF_CELLOBIOSE: &str = "BIOMASS_CELLOBIOSE";
pub const BOF_CELLULOSE: &str = "BIOMASS_CELLULOSE";

/// How experimental flux measurements are turned into reaction bounds.
///
/// The lower bound is usually the binding constraint, so three of the modes
/// only tighten it and leave the upper bound open.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ConstraintMode {
    /// Lower bound at mean - std, upper bound open
    Min,
    /// Lower bound at mean, upper bound open
    Mean,
    /// Lower bound at mean + std, upper bound open
    Max,
    /// Bounds at mean - std and mean + std
    Both,
}

impl ConstraintMode {
    fn bounds(&self, mean: f64, std: f64, open_upper: f64) -> (f64, f64) {
        match self {
            ConstraintMode::Min => (mean - std, open_upper),
            ConstraintMode::Mean => (mean, open_upper),
            ConstraintMode::Max => (mean + std, open_upper),
            ConstraintMode::Both => (mean - std, mean + std),
        }
    }
}

/// What the model may excrete.
///
/// Strict secretion constraints tend to make the model infeasible once
/// experimental constraints are added on top, so the usual policy is
/// `Open`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SecretionPolicy {
    /// Every exchange reaction may carry secretion flux
    Open,
    /// Upper bounds from a secretion file in the media directory
    File(String),
}

/// Reactor type, which selects the GAM/NGAM parameter column
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ReactorType {
    Batch,
    Chemostat,
}

/// Configure the model for the medium named in an experimental record.
///
/// Accepts the dataset shorthand (`cellb`/`avcell` strings map to the
/// compositionally minimal media) or the name of any medium file in the
/// media directory. Returns the id of the active biomass reaction.
pub fn set_conditions(
    model: &mut Model,
    medium_str: &str,
    secretion: &SecretionPolicy,
    reactor_type: ReactorType,
    media_root: &Path,
) -> Result<String, ConditionError> {
    let (bof_id, medium_id) = resolve_medium(medium_str, media_root)?;
    debug!("model conditions: medium {}, bof {}", medium_id, bof_id);

    block_all_exchanges(model);
    set_medium(model, &medium_id, media_root)?;
    set_secretion(model, secretion, media_root)?;
    set_atp_param(model, &medium_id, &bof_id, reactor_type, media_root)?;
    set_bof(model, &bof_id)?;

    Ok(bof_id)
}

fn resolve_medium(
    medium_str: &str,
    media_root: &Path,
) -> Result<(String, String), ConditionError> {
    if medium_str.contains("cellb") {
        return Ok((
            BOF_CELLOBIOSE.to_string(),
            "comp_minimal_cellobiose".to_string(),
        ));
    }
    if medium_str.contains("avcell") {
        return Ok((
            BOF_CELLULOSE.to_string(),
            "comp_minimal_cellulose".to_string(),
        ));
    }
    let medium_id = medium_str.trim_end_matches(".csv");
    if media_root.join(format!("{}.csv", medium_id)).is_file() {
        let bof_id = if medium_id.contains("cellobiose") {
            BOF_CELLOBIOSE
        } else {
            BOF_CELLULOSE
        };
        return Ok((bof_id.to_string(), medium_id.to_string()));
    }
    Err(ConditionError::InvalidMedium(medium_str.to_string()))
}

/// Activate one biomass objective function and block the others
pub fn set_bof(model: &mut Model, bof_id: &str) -> Result<(), ConditionError> {
    let upper_bound = CONFIGURATION.read().unwrap().upper_bound;
    for (_, reaction) in model.reactions.iter_mut() {
        if reaction.is_biomass() {
            reaction.set_bounds(0., 0.);
        }
    }
    model.set_objective(bof_id)?;
    model.reaction_mut(bof_id)?.set_bounds(0., upper_bound);
    Ok(())
}

/// Close every exchange reaction in both directions
pub fn block_all_exchanges(model: &mut Model) {
    for (_, reaction) in model.reactions.iter_mut() {
        if reaction.is_exchange() {
            reaction.set_bounds(0., 0.);
        }
    }
}

/// Apply a medium file: lower bounds of the listed exchange reactions.
///
/// Only reactions named in the file are touched.
pub fn set_medium(
    model: &mut Model,
    medium_file_id: &str,
    media_root: &Path,
) -> Result<(), ConditionError> {
    let rows = load_medium(media_root.join(format!("{}.csv", medium_file_id)))?;
    for row in rows {
        model.reaction_mut(&row.reaction_id)?.lower_bound = row.lower_bound;
    }
    Ok(())
}

/// Apply a secretion policy: upper bounds of exchange reactions
pub fn set_secretion(
    model: &mut Model,
    secretion: &SecretionPolicy,
    media_root: &Path,
) -> Result<(), ConditionError> {
    match secretion {
        SecretionPolicy::Open => {
            let upper_bound = CONFIGURATION.read().unwrap().upper_bound;
            for (_, reaction) in model.reactions.iter_mut() {
                if reaction.is_exchange() {
                    reaction.upper_bound = upper_bound;
                }
            }
        }
        SecretionPolicy::File(file_id) => {
            let rows = load_secretion(media_root.join(format!("{}.csv", file_id)))?;
            for row in rows {
                model.reaction_mut(&row.reaction_id)?.upper_bound = row.upper_bound;
            }
        }
    }
    Ok(())
}

/// Apply the trained GAM/NGAM parameters for a medium and reactor type
pub fn set_atp_param(
    model: &mut Model,
    medium_id: &str,
    bof_id: &str,
    reactor_type: ReactorType,
    media_root: &Path,
) -> Result<(), ConditionError> {
    let table = AtpParamTable::read(media_root.join("atp_param.csv"))?;
    let condition = match reactor_type {
        ReactorType::Batch => "batch",
        ReactorType::Chemostat => {
            if medium_id.contains("cellulose") {
                "cellulose_chemostat"
            } else if medium_id.contains("cellobiose") || medium_id.contains("MTC-cell") {
                // Cellodextrin media reuse the cellobiose fit
                "cellobiose_chemostat"
            } else {
                return Err(ConditionError::NoAtpParameters(medium_id.to_string()));
            }
        }
    };
    let params = table.get(condition)?;
    set_reaction_gam(model.reaction_mut(bof_id)?, params.gam);
    set_ngam(model, params.ngam)?;
    Ok(())
}

/// Enforce the measured fluxes of one dataset row, growth rate included.
///
/// `GR` constrains the active biomass reaction; every other measurement id
/// `x` constrains the exchange `EX_x_e`. Unmeasured entries are skipped.
pub fn set_experimental_flux_bounds(
    model: &mut Model,
    flux_row: &FluxRow,
    bof_id: &str,
    constraint_mode: ConstraintMode,
) -> Result<(), ConditionError> {
    let open_upper = CONFIGURATION.read().unwrap().upper_bound;
    for (met_id, measurement) in &flux_row.measurements {
        let rxn_id = if met_id == "GR" {
            bof_id.to_string()
        } else {
            format!("EX_{}_e", met_id)
        };
        let (lower_bound, upper_bound) =
            constraint_mode.bounds(measurement.mean, measurement.std, open_upper);
        if lower_bound.is_nan() || upper_bound.is_nan() {
            continue;
        }
        model
            .reaction_mut(&rxn_id)?
            .set_bounds(lower_bound, upper_bound);
    }
    Ok(())
}

/// Configure the model to reproduce one row of the flux dataset: gene
/// knockouts, medium, and measured flux bounds.
pub fn set_experimental_data(
    model: &mut Model,
    flux_row: &FluxRow,
    constraint_mode: ConstraintMode,
    apply_knockouts: bool,
    reactor_type: ReactorType,
    media_root: &Path,
    gene_map: &indexmap::IndexMap<String, String>,
) -> Result<String, ConditionError> {
    if apply_knockouts {
        if let Some(deleted) = &flux_row.deleted_genes {
            knockouts::knock_out_genes(model, deleted, gene_map)?;
        }
    }
    let bof_id = set_conditions(
        model,
        &flux_row.medium,
        &SecretionPolicy::Open,
        reactor_type,
        media_root,
    )?;
    set_experimental_flux_bounds(model, flux_row, &bof_id, constraint_mode)?;
    Ok(bof_id)
}

#[derive(Debug, Error)]
pub enum ConditionError {
    #[error("Invalid medium ID: {0}")]
    InvalidMedium(String),
    #[error("GAM/NGAM parameters could not be determined for medium: {0}")]
    NoAtpParameters(String),
    #[error("Unparseable knockout list: {0}")]
    BadKnockoutList(String),
    #[error("Model error: {0}")]
    Model(#[from] ModelError),
    #[error("Table error: {0}")]
    Table(#[from] TableError),
    #[error("Curation error: {0}")]
    Curation(#[from] CurationError),
}
