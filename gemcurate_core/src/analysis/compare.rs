//! Side by side comparison of genome scale models
//!
//! For each model: entity counts, the fraction of blocked reactions under a
//! fully open medium, the fraction of lethal single deletions, and the
//! distribution of reaction confidence levels.

use std::path::Path;

use log::warn;
use serde_json::Value;

use crate::analysis::AnalysisError;
use crate::metabolic_model::model::Model;

/// Growth rate below which a deletion counts as lethal
pub const MINIMUM_VIABLE_GROWTH_RATE: f64 = 0.01;

const CONFIDENCE_KEYS: [&str; 2] = ["CONFIDENCE LEVEL", "confidence_level"];

/// One column of the comparison table
#[derive(Debug, Clone)]
pub struct ComparisonColumn {
    pub model_id: String,
    pub genes: usize,
    pub metabolites: usize,
    pub reactions: usize,
    pub blocked_fraction: f64,
    pub lethal_gene_fraction: f64,
    pub lethal_reaction_fraction: f64,
    /// Reaction counts at confidence levels 0 through 4
    pub confidence_counts: [usize; 5],
    /// Reactions with no confidence level annotation
    pub confidence_none: usize,
}

/// Compute the comparison column for one model.
///
/// The scans run on a copy with every exchange opened, so models shipped
/// with a restrictive medium are compared on equal footing. A deletion that
/// makes the model infeasible counts as lethal.
pub fn model_column(model: &Model) -> Result<ComparisonColumn, AnalysisError> {
    let mut open = model.clone();
    open.open_exchanges();

    let blocked = open.find_blocked_reactions()?;
    let reaction_outcomes = open.single_reaction_deletion()?;
    let gene_outcomes = open.single_gene_deletion()?;

    let lethal = |growth: &Option<f64>| match growth {
        Some(value) => *value < MINIMUM_VIABLE_GROWTH_RATE,
        None => true,
    };
    let lethal_reactions = reaction_outcomes.values().filter(|g| lethal(g)).count();
    let lethal_genes = gene_outcomes.values().filter(|g| lethal(g)).count();

    let lethal_gene_fraction = if model.genes.is_empty() {
        -1.
    } else {
        lethal_genes as f64 / model.genes.len() as f64
    };

    let mut confidence_counts = [0usize; 5];
    let mut confidence_none = 0usize;
    for (rxn_id, rxn) in model.reactions.iter() {
        match confidence_level(rxn.notes.as_deref()) {
            Some(level) if level < 5 => confidence_counts[level] += 1,
            Some(level) => {
                warn!("Reaction {} has out of range confidence level {}", rxn_id, level);
                confidence_none += 1;
            }
            None => confidence_none += 1,
        }
    }

    Ok(ComparisonColumn {
        model_id: model.id.clone().unwrap_or_else(|| "model".to_string()),
        genes: model.genes.len(),
        metabolites: model.metabolites.len(),
        reactions: model.reactions.len(),
        blocked_fraction: blocked.len() as f64 / model.reactions.len() as f64,
        lethal_gene_fraction,
        lethal_reaction_fraction: lethal_reactions as f64 / model.reactions.len() as f64,
        confidence_counts,
        confidence_none,
    })
}

/// Extract the confidence level from a reaction's notes.
///
/// Models disagree on the key name and on whether the value is a scalar or
/// a one element list, so both are accepted.
fn confidence_level(notes: Option<&str>) -> Option<usize> {
    let notes: Value = serde_json::from_str(notes?).ok()?;
    let object = notes.as_object()?;
    let value = CONFIDENCE_KEYS.iter().find_map(|key| object.get(*key))?;
    let scalar = match value {
        Value::Array(items) => items.first()?,
        other => other,
    };
    match scalar {
        Value::String(s) => s.trim().parse::<usize>().ok(),
        Value::Number(n) => n.as_u64().map(|n| n as usize),
        _ => None,
    }
}

/// Write the comparison table, one column per model, features as rows
pub fn write_comparison<P: AsRef<Path>>(
    columns: &[ComparisonColumn],
    path: P,
) -> Result<(), AnalysisError> {
    let mut writer = csv::Writer::from_path(&path)?;
    let mut header = vec!["Feature".to_string()];
    header.extend(columns.iter().map(|col| col.model_id.clone()));
    writer.write_record(&header)?;

    let rows: Vec<(&str, Box<dyn Fn(&ComparisonColumn) -> String>)> = vec![
        ("Genes", Box::new(|c| c.genes.to_string())),
        ("Metabolites", Box::new(|c| c.metabolites.to_string())),
        ("Reactions", Box::new(|c| c.reactions.to_string())),
        (
            "Fraction of blocked reactions",
            Box::new(|c| c.blocked_fraction.to_string()),
        ),
        (
            "Fraction of lethal genes",
            Box::new(|c| c.lethal_gene_fraction.to_string()),
        ),
        (
            "Fraction of lethal reactions",
            Box::new(|c| c.lethal_reaction_fraction.to_string()),
        ),
        ("cl 0", Box::new(|c| c.confidence_counts[0].to_string())),
        ("cl 1", Box::new(|c| c.confidence_counts[1].to_string())),
        ("cl 2", Box::new(|c| c.confidence_counts[2].to_string())),
        ("cl 3", Box::new(|c| c.confidence_counts[3].to_string())),
        ("cl 4", Box::new(|c| c.confidence_counts[4].to_string())),
        ("cl none", Box::new(|c| c.confidence_none.to_string())),
    ];
    for (feature, value) in rows {
        let mut record = vec![feature.to_string()];
        record.extend(columns.iter().map(|col| value(col)));
        writer.write_record(&record)?;
    }
    writer.flush()?;
    Ok(())
}
