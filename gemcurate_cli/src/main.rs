//! Command line front end for the model curation and analysis passes

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use log::{error, info, LevelFilter};

use gemcurate_core::analysis::compare::{model_column, write_comparison};
use gemcurate_core::analysis::growth::{predict_growth, standard_panel, write_growth_table};
use gemcurate_core::analysis::maintenance::{train, write_atp_param};
use gemcurate_core::conditions::{
    set_conditions, ConstraintMode, ReactorType, SecretionPolicy,
};
use gemcurate_core::curation::bounds::{apply_exchange_bounds, apply_reaction_bounds};
use gemcurate_core::curation::corrections::{
    apply_bound_pins, apply_metabolite_curation, apply_reaction_corrections,
    find_duplicate_reactions, write_imbalance_report,
};
use gemcurate_core::curation::idmap::{
    remap_metabolite_ids, remap_reaction_ids, standardize_gene_ids,
};
use gemcurate_core::io::tables::{
    load_bounds_table, load_gene_map, load_id_map, load_metabolite_curation, load_pins,
    load_reaction_curation, AtpParams, FluxDataset, GeneMapOrder,
};
use gemcurate_core::metabolic_model::model::Model;
use indexmap::IndexMap;

#[derive(Parser)]
#[command(
    name = "gemcurate",
    about = "Curate and analyze genome scale metabolic models",
    version
)]
struct Cli {
    /// Increase log verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum ConstraintModeArg {
    Min,
    Mean,
    Max,
    Both,
}

impl From<ConstraintModeArg> for ConstraintMode {
    fn from(arg: ConstraintModeArg) -> Self {
        match arg {
            ConstraintModeArg::Min => ConstraintMode::Min,
            ConstraintModeArg::Mean => ConstraintMode::Mean,
            ConstraintModeArg::Max => ConstraintMode::Max,
            ConstraintModeArg::Both => ConstraintMode::Both,
        }
    }
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum ReactorTypeArg {
    Batch,
    Chemostat,
}

impl From<ReactorTypeArg> for ReactorType {
    fn from(arg: ReactorTypeArg) -> Self {
        match arg {
            ReactorTypeArg::Batch => ReactorType::Batch,
            ReactorTypeArg::Chemostat => ReactorType::Chemostat,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Rename metabolites, reactions, and genes to the curated nomenclature
    Remap {
        /// Input model (COBRA JSON)
        model: PathBuf,
        /// Output model path
        #[arg(short, long)]
        output: PathBuf,
        /// ModelSEED to BiGG metabolite id map (ms,bigg)
        #[arg(long)]
        metabolite_map: Option<PathBuf>,
        /// ModelSEED to BiGG reaction id map (ms,bigg)
        #[arg(long)]
        reaction_map: Option<PathBuf>,
        /// Locus tag update table (old_locus_tag,locus_tag)
        #[arg(long)]
        gene_map: Option<PathBuf>,
    },
    /// Repair reaction and exchange bounds exported from a draft reconstruction
    FixBounds {
        model: PathBuf,
        #[arg(short, long)]
        output: PathBuf,
        /// Exported reaction bounds (id,lowerbound,upperbound)
        #[arg(long)]
        reaction_bounds: Option<PathBuf>,
        /// Exported compound bounds applied to EX_ reactions
        #[arg(long)]
        exchange_bounds: Option<PathBuf>,
        /// Reaction id to set as the objective afterwards
        #[arg(long)]
        objective: Option<String>,
    },
    /// Apply curated formulas, charges, and reaction stoichiometries
    Corrections {
        model: PathBuf,
        #[arg(short, long)]
        output: PathBuf,
        /// Metabolite curation table (icbi_id,curated_formula,curated_charge)
        #[arg(long)]
        metabolites: Option<PathBuf>,
        /// Reaction curation tables (icbi_id,curated_rxn,action), repeatable
        #[arg(long)]
        reactions: Vec<PathBuf>,
        /// Where to write the remaining-imbalance report
        #[arg(long)]
        report: Option<PathBuf>,
    },
    /// Report mass and charge imbalances and duplicated reactions
    BalanceReport {
        model: PathBuf,
        /// Imbalance report path
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Configure a model for a culture condition and save it
    SetConditions {
        model: PathBuf,
        #[arg(short, long)]
        output: PathBuf,
        /// Medium name, e.g. cellb_batch or a medium file id
        #[arg(long)]
        medium: String,
        /// Secretion file id; every exchange is open when omitted
        #[arg(long)]
        secretion: Option<String>,
        #[arg(long, value_enum, default_value_t = ReactorTypeArg::Batch)]
        reactor: ReactorTypeArg,
        /// Directory holding medium files and atp_param.csv
        #[arg(long)]
        media_root: PathBuf,
    },
    /// Fit GAM and NGAM against an extracellular flux dataset
    Train {
        model: PathBuf,
        /// Extracellular flux dataset CSV
        #[arg(long)]
        dataset: PathBuf,
        #[arg(long)]
        media_root: PathBuf,
        /// Locus tag update table for knockout lists
        #[arg(long)]
        gene_map: Option<PathBuf>,
        #[arg(long, value_enum, default_value_t = ConstraintModeArg::Both)]
        constraint_mode: ConstraintModeArg,
        /// Dataset row indices to leave out of the fit, repeatable
        #[arg(long)]
        exclude: Vec<u32>,
        /// Skip the gene knockouts recorded in the dataset
        #[arg(long)]
        no_knockouts: bool,
        /// Write the fit as an atp_param.csv column with this condition name
        #[arg(long)]
        condition: Option<String>,
        /// Output path for the atp_param.csv written with --condition
        #[arg(long)]
        atp_param_out: Option<PathBuf>,
    },
    /// Build a comparison table across models
    Compare {
        /// COBRA JSON models, in column order
        models: Vec<PathBuf>,
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Predict growth of the characterized deletion strains
    MutantGrowth {
        model: PathBuf,
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Apply release pins and write the final model
    Finalize {
        model: PathBuf,
        #[arg(short, long)]
        output: PathBuf,
        /// Bound pin table (reaction_id,lower_bound,upper_bound,note)
        #[arg(long)]
        pins: PathBuf,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let level = match cli.verbose {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::new().filter_level(level).init();

    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{}", err);
            ExitCode::FAILURE
        }
    }
}

fn run(command: Commands) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Commands::Remap {
            model,
            output,
            metabolite_map,
            reaction_map,
            gene_map,
        } => {
            let mut model = Model::read_json(model)?;
            if let Some(path) = metabolite_map {
                let renamed = remap_metabolite_ids(&mut model, &load_id_map(path)?)?;
                info!("Renamed {} metabolites", renamed);
            }
            if let Some(path) = reaction_map {
                let renamed = remap_reaction_ids(&mut model, &load_id_map(path)?)?;
                info!("Renamed {} reactions", renamed);
            }
            if let Some(path) = gene_map {
                let map = load_gene_map(path, GeneMapOrder::OldToNew)?;
                let renamed = standardize_gene_ids(&mut model, &map)?;
                info!("Renamed {} genes", renamed);
            }
            model.write_json(output)?;
        }
        Commands::FixBounds {
            model,
            output,
            reaction_bounds,
            exchange_bounds,
            objective,
        } => {
            let mut model = Model::read_json(model)?;
            if let Some(path) = reaction_bounds {
                apply_reaction_bounds(&mut model, &load_bounds_table(path)?)?;
            }
            if let Some(path) = exchange_bounds {
                apply_exchange_bounds(&mut model, &load_bounds_table(path)?);
            }
            if let Some(rxn_id) = objective {
                model.set_objective(&rxn_id)?;
            }
            model.write_json(output)?;
        }
        Commands::Corrections {
            model,
            output,
            metabolites,
            reactions,
            report,
        } => {
            let mut model = Model::read_json(model)?;
            if let Some(path) = metabolites {
                let applied =
                    apply_metabolite_curation(&mut model, &load_metabolite_curation(path)?)?;
                info!("Curated {} metabolites", applied);
            }
            for path in reactions {
                let rewritten =
                    apply_reaction_corrections(&mut model, &load_reaction_curation(path)?)?;
                info!("Rewrote {} reactions", rewritten);
            }
            if let Some(path) = report {
                write_imbalance_report(&model, path)?;
            }
            model.write_json(output)?;
        }
        Commands::BalanceReport { model, output } => {
            let model = Model::read_json(model)?;
            for (rxn_a, rxn_b) in find_duplicate_reactions(&model) {
                info!("Reactions {} and {} share their metabolites", rxn_a, rxn_b);
            }
            let remaining = write_imbalance_report(&model, output)?;
            info!("Remaining imbalances: {}", remaining);
        }
        Commands::SetConditions {
            model,
            output,
            medium,
            secretion,
            reactor,
            media_root,
        } => {
            let mut model = Model::read_json(model)?;
            let policy = match secretion {
                Some(file_id) => SecretionPolicy::File(file_id),
                None => SecretionPolicy::Open,
            };
            let bof_id = set_conditions(
                &mut model,
                &medium,
                &policy,
                reactor.into(),
                &media_root,
            )?;
            info!("Active biomass reaction: {}", bof_id);
            model.write_json(output)?;
        }
        Commands::Train {
            model,
            dataset,
            media_root,
            gene_map,
            constraint_mode,
            exclude,
            no_knockouts,
            condition,
            atp_param_out,
        } => {
            let model = Model::read_json(model)?;
            let dataset = FluxDataset::read(dataset)?;
            let gene_map = match gene_map {
                Some(path) => load_gene_map(path, GeneMapOrder::OldToNew)?,
                None => IndexMap::new(),
            };
            let outcome = train(
                &model,
                &dataset,
                &exclude,
                constraint_mode.into(),
                !no_knockouts,
                &media_root,
                &gene_map,
            )?;
            info!(
                "GAM = {:.2}, NGAM = {:.2}, r^2 = {:.3} ({} points, {} infeasible)",
                outcome.gam,
                outcome.ngam,
                outcome.rsquared,
                outcome.points.len(),
                outcome.infeasible.len()
            );
            for point in &outcome.points {
                info!(
                    "  row {}: growth {:.3}, ATP {:.3} [{}]",
                    point.dataset_index, point.growth_rate, point.atp, point.medium
                );
            }
            if let (Some(condition), Some(path)) = (condition, atp_param_out) {
                let mut conditions = IndexMap::new();
                conditions.insert(
                    condition,
                    AtpParams {
                        gam: outcome.gam,
                        ngam: outcome.ngam,
                    },
                );
                write_atp_param(path, &conditions)?;
            }
        }
        Commands::Compare { models, output } => {
            let mut columns = Vec::with_capacity(models.len());
            for path in models {
                let model = Model::read_json(&path)?;
                info!("Scanning {}", path.display());
                columns.push(model_column(&model)?);
            }
            write_comparison(&columns, output)?;
        }
        Commands::MutantGrowth { model, output } => {
            let model = Model::read_json(model)?;
            let fractions = predict_growth(&model, &standard_panel())?;
            for (strain, fraction) in &fractions {
                info!("{}: {:.3} of wild type growth", strain, fraction);
            }
            write_growth_table(&fractions, output)?;
        }
        Commands::Finalize {
            model,
            output,
            pins,
        } => {
            let mut model = Model::read_json(model)?;
            let pinned = apply_bound_pins(&mut model, &load_pins(pins)?)?;
            info!("Applied {} bound pins", pinned);
            model.write_json(output)?;
        }
    }
    Ok(())
}
