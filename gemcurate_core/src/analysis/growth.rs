//! Quantitative growth predictions for engineered strains
//!
//! Each mutant is a set of reaction knockouts plus optional bound edits
//! (letting a co-substrate in, or a fermentation product out). Growth is
//! reported as a fraction of the wild type rate.

use std::path::Path;

use log::debug;

use crate::analysis::AnalysisError;
use crate::metabolic_model::model::Model;
use crate::optimize::fba::ObjectiveSense;

/// A bound adjustment applied on top of the knockouts
#[derive(Debug, Clone)]
pub enum ModelEdit {
    /// Overwrite the bounds of one reaction
    Bounds {
        reaction_id: String,
        lower_bound: f64,
        upper_bound: f64,
    },
    /// Add a reversible exchange reaction for a metabolite
    Boundary { metabolite_id: String },
}

/// An engineered strain to simulate
#[derive(Debug, Clone)]
pub struct MutantSpec {
    pub name: String,
    pub knockouts: Vec<String>,
    pub edits: Vec<ModelEdit>,
}

impl MutantSpec {
    pub fn new(name: &str, knockouts: &[&str]) -> Self {
        MutantSpec {
            name: name.to_string(),
            knockouts: knockouts.iter().map(|id| id.to_string()).collect(),
            edits: Vec::new(),
        }
    }

    pub fn with_bounds(mut self, reaction_id: &str, lower_bound: f64, upper_bound: f64) -> Self {
        self.edits.push(ModelEdit::Bounds {
            reaction_id: reaction_id.to_string(),
            lower_bound,
            upper_bound,
        });
        self
    }

    pub fn with_boundary(mut self, metabolite_id: &str) -> Self {
        self.edits.push(ModelEdit::Boundary {
            metabolite_id: metabolite_id.to_string(),
        });
        self
    }
}

/// The characterized C. thermocellum deletion strains.
///
/// The hydrogenase mutants knock out the bifurcating and the synthetic
/// hydrogenase; the `fum`, `sulf`, and `kiv` variants additionally redirect
/// electrons through fumarate reduction, sulfide, or isobutanol.
pub fn standard_panel() -> Vec<MutantSpec> {
    let hydg: [&str; 2] = ["BIF", "H2ASE_syn"];
    let hydg_ech_pfl: [&str; 4] = ["BIF", "H2ASE_syn", "ECH", "PFL"];
    vec![
        MutantSpec::new("hydg", &hydg),
        MutantSpec::new("hydg-ech", &["BIF", "H2ASE_syn", "ECH"]),
        MutantSpec::new("hydg-pta-ack", &["BIF", "H2ASE_syn", "PTAr", "ACKr"]),
        MutantSpec::new("hydg-ech-pfl", &hydg_ech_pfl),
        MutantSpec::new("fum", &hydg_ech_pfl)
            .with_bounds("EX_fum_e", -1000., 0.)
            .with_bounds("EX_succ_e", 0., 1000.),
        MutantSpec::new("sulf", &hydg_ech_pfl).with_bounds("EX_h2s_e", 0., 1000.),
        MutantSpec::new("kiv", &hydg_ech_pfl)
            .with_bounds("EX_ibutoh_e", 0., 1000.)
            .with_boundary("3mob_c"),
        MutantSpec::new(
            "ll1210",
            &["BIF", "H2ASE_syn", "PFL", "LDH_L", "PTAr", "ACKr"],
        ),
        MutantSpec::new("ldh", &["LDH_L"]),
        MutantSpec::new("pta-ack", &["PTAr", "ACKr"]),
        MutantSpec::new("ldh-pta-ack", &["LDH_L", "PTAr", "ACKr"]),
    ]
}

/// Growth of each mutant as a fraction of the wild type growth rate.
///
/// An infeasible mutant is reported as zero growth.
pub fn predict_growth(
    model: &Model,
    mutants: &[MutantSpec],
) -> Result<Vec<(String, f64)>, AnalysisError> {
    let wild_type = model
        .optimize(ObjectiveSense::Maximize)?
        .objective_value
        .filter(|growth| *growth > 0.)
        .ok_or(AnalysisError::NoWildTypeGrowth)?;

    let mut fractions = Vec::with_capacity(mutants.len());
    for mutant in mutants {
        let mut tmodel = model.clone();
        for rxn_id in &mutant.knockouts {
            tmodel.knock_out_reaction(rxn_id)?;
        }
        for edit in &mutant.edits {
            match edit {
                ModelEdit::Bounds {
                    reaction_id,
                    lower_bound,
                    upper_bound,
                } => tmodel
                    .reaction_mut(reaction_id)?
                    .set_bounds(*lower_bound, *upper_bound),
                ModelEdit::Boundary { metabolite_id } => {
                    tmodel.add_boundary(metabolite_id)?;
                }
            }
        }
        let growth = tmodel
            .optimize(ObjectiveSense::Maximize)?
            .objective_value
            .unwrap_or(0.);
        debug!("mutant {}: growth {}", mutant.name, growth);
        fractions.push((mutant.name.clone(), growth / wild_type));
    }
    Ok(fractions)
}

/// Write the growth panel as `Strain,Fraction of WT growth rate`
pub fn write_growth_table<P: AsRef<Path>>(
    fractions: &[(String, f64)],
    path: P,
) -> Result<(), AnalysisError> {
    let mut writer = csv::Writer::from_path(&path)?;
    writer.write_record(["Strain", "Fraction of WT growth rate"])?;
    for (strain, fraction) in fractions {
        writer.write_record([strain.as_str(), &fraction.to_string()])?;
    }
    writer.flush()?;
    Ok(())
}
