//! Fit growth and non-growth associated maintenance to experimental data
//!
//! For every dataset row the model is constrained to the measured fluxes
//! with maintenance costs zeroed, and the maximum ATP hydrolysis flux is
//! computed. Regressing that flux against growth rate gives the GAM as the
//! slope and the NGAM as the intercept.

use std::path::Path;

use indexmap::IndexMap;
use log::{info, warn};

use crate::analysis::AnalysisError;
use crate::conditions::{set_experimental_data, ConstraintMode, ReactorType};
use crate::curation::biomass::{set_all_biomass_gam, set_ngam};
use crate::io::tables::{AtpParams, FluxDataset};
use crate::metabolic_model::model::Model;
use crate::optimize::fba::ObjectiveSense;

/// One feasible training point
#[derive(Debug, Clone)]
pub struct TrainPoint {
    pub dataset_index: u32,
    pub growth_rate: f64,
    pub atp: f64,
    pub medium: String,
}

/// Outcome of a maintenance energy fit
#[derive(Debug, Clone)]
pub struct TrainOutcome {
    /// Growth associated maintenance, mmol ATP per gram of biomass (slope)
    pub gam: f64,
    /// Non-growth associated maintenance, mmol ATP/gCDW/h (intercept)
    pub ngam: f64,
    pub rsquared: f64,
    pub points: Vec<TrainPoint>,
    /// Dataset rows the model could not reproduce
    pub infeasible: Vec<u32>,
}

/// Fit GAM and NGAM against a flux dataset.
///
/// Rows listed in `exclude_data_index` are left out of the fit. Rows the
/// model finds infeasible, or that carry no growth rate, are skipped and
/// reported in the outcome.
#[allow(clippy::too_many_arguments)]
pub fn train(
    model: &Model,
    dataset: &FluxDataset,
    exclude_data_index: &[u32],
    constraint_mode: ConstraintMode,
    apply_knockouts: bool,
    media_root: &Path,
    gene_map: &IndexMap<String, String>,
) -> Result<TrainOutcome, AnalysisError> {
    let mut points: Vec<TrainPoint> = Vec::new();
    let mut infeasible: Vec<u32> = Vec::new();

    for row in &dataset.rows {
        if exclude_data_index.contains(&row.index) {
            continue;
        }
        let growth_rate = match row.growth_rate() {
            Some(gr) => gr,
            None => {
                warn!("No growth rate for dataset row {}, skipping", row.index);
                continue;
            }
        };
        let reactor_type = if row.reactor.to_lowercase().contains("chemo") {
            ReactorType::Chemostat
        } else {
            ReactorType::Batch
        };

        let mut tmodel = model.clone();
        set_experimental_data(
            &mut tmodel,
            row,
            constraint_mode,
            apply_knockouts,
            reactor_type,
            media_root,
            gene_map,
        )?;

        // With maintenance zeroed, all spare ATP can be burned by ATPM
        set_all_biomass_gam(&mut tmodel, 0.);
        set_ngam(&mut tmodel, 0.).map_err(crate::conditions::ConditionError::Curation)?;
        tmodel.set_objective("ATPM")?;

        let solution = tmodel.optimize(ObjectiveSense::Maximize)?;
        match solution.objective_value {
            Some(atp) => points.push(TrainPoint {
                dataset_index: row.index,
                growth_rate,
                atp,
                medium: row.medium.clone(),
            }),
            None => {
                info!("Model infeasible for dataset: {}", row.index);
                infeasible.push(row.index);
            }
        }
    }

    let x: Vec<f64> = points.iter().map(|p| p.growth_rate).collect();
    let y: Vec<f64> = points.iter().map(|p| p.atp).collect();
    let (slope, intercept, rvalue) = linear_regression(&x, &y)?;

    Ok(TrainOutcome {
        gam: slope,
        ngam: intercept,
        rsquared: rvalue * rvalue,
        points,
        infeasible,
    })
}

/// Ordinary least squares fit of y against x.
///
/// Returns (slope, intercept, correlation coefficient).
pub fn linear_regression(x: &[f64], y: &[f64]) -> Result<(f64, f64, f64), AnalysisError> {
    if x.len() < 2 || x.len() != y.len() {
        return Err(AnalysisError::TooFewPoints(x.len().min(y.len())));
    }
    let n = x.len() as f64;
    let mean_x = x.iter().sum::<f64>() / n;
    let mean_y = y.iter().sum::<f64>() / n;
    let mut ss_xx = 0.;
    let mut ss_yy = 0.;
    let mut ss_xy = 0.;
    for (xi, yi) in x.iter().zip(y.iter()) {
        let dx = xi - mean_x;
        let dy = yi - mean_y;
        ss_xx += dx * dx;
        ss_yy += dy * dy;
        ss_xy += dx * dy;
    }
    if ss_xx == 0. {
        return Err(AnalysisError::TooFewPoints(x.len()));
    }
    let slope = ss_xy / ss_xx;
    let intercept = mean_y - slope * mean_x;
    let rvalue = if ss_yy == 0. {
        // A perfectly flat response is a perfect fit to a flat line
        1.
    } else {
        ss_xy / (ss_xx * ss_yy).sqrt()
    };
    Ok((slope, intercept, rvalue))
}

/// Write GAM/NGAM columns in the `atp_param.csv` layout consumed by
/// [`crate::conditions::set_atp_param`]
pub fn write_atp_param<P: AsRef<Path>>(
    path: P,
    conditions: &IndexMap<String, AtpParams>,
) -> Result<(), AnalysisError> {
    let mut writer = csv::Writer::from_path(&path)?;
    let mut header = vec!["parameter".to_string()];
    header.extend(conditions.keys().cloned());
    writer.write_record(&header)?;

    let mut gam_row = vec!["GAM".to_string()];
    let mut ngam_row = vec!["NGAM".to_string()];
    for params in conditions.values() {
        gam_row.push(params.gam.to_string());
        ngam_row.push(params.ngam.to_string());
    }
    writer.write_record(&gam_row)?;
    writer.write_record(&ngam_row)?;
    writer.flush()?;
    Ok(())
}
