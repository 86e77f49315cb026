//! Mass and charge balance corrections
//!
//! Applies hand-curated formula, charge, and stoichiometry fixes, flags
//! duplicated reactions, and writes the remaining-imbalance report that
//! seeds the next round of curation.

use std::collections::BTreeSet;
use std::collections::HashSet;
use std::path::Path;

use indexmap::IndexMap;
use log::{info, warn};

use crate::curation::CurationError;
use crate::io::rxn_parse::parse_reaction_string;
use crate::io::tables::{MetaboliteCurationRow, ReactionCurationRow};
use crate::metabolic_model::metabolite::MetaboliteBuilder;
use crate::metabolic_model::model::{Model, ModelError};

/// Apply curated formulas and charges to metabolites.
///
/// The curation table carries some redundancy, so only the first row for
/// each metabolite is applied. Returns the number of metabolites updated.
pub fn apply_metabolite_curation(
    model: &mut Model,
    rows: &[MetaboliteCurationRow],
) -> Result<usize, CurationError> {
    let mut applied: HashSet<&str> = HashSet::new();
    for row in rows {
        if applied.contains(row.icbi_id.as_str()) {
            continue;
        }
        let met = model
            .metabolites
            .get_mut(&row.icbi_id)
            .ok_or_else(|| CurationError::MetaboliteNotFound(row.icbi_id.clone()))?;
        met.formula = Some(row.curated_formula.clone());
        met.charge = row.curated_charge;
        applied.insert(row.icbi_id.as_str());
    }
    Ok(applied.len())
}

/// Rebuild reaction stoichiometries from curated reaction strings.
///
/// Rows whose `action` column says `ignore` are skipped. The curated arrow
/// also resets the reaction bounds (`-->` forward, `<=>` reversible).
/// Metabolites the curated string introduces are created in place, with the
/// compartment taken from the id suffix. Returns the number of reactions
/// rewritten.
pub fn apply_reaction_corrections(
    model: &mut Model,
    rows: &[ReactionCurationRow],
) -> Result<usize, CurationError> {
    let mut rewritten = 0;
    for row in rows {
        if row.action.as_deref().map(str::trim) == Some("ignore") {
            info!(
                "Curation ignored according to \"action\" column, reaction id: {}",
                row.icbi_id
            );
            continue;
        }
        let parsed = parse_reaction_string(&row.curated_rxn)?;
        for met_id in parsed.metabolites.keys() {
            if model.metabolites.contains_key(met_id) {
                continue;
            }
            warn!(
                "Creating metabolite {} from curated reaction {}",
                met_id, row.icbi_id
            );
            let compartment = met_id.rsplit('_').next().map(str::to_string);
            let metabolite = MetaboliteBuilder::default()
                .id(met_id.clone())
                .compartment(compartment)
                .build()
                .map_err(|e| ModelError::BuildError(e.to_string()))?;
            model.add_metabolite(metabolite);
        }
        let (lower_bound, upper_bound) = parsed.directionality.bounds();
        let reaction = model.reaction_mut(&row.icbi_id)?;
        reaction.set_metabolites(parsed.metabolites);
        reaction.set_bounds(lower_bound, upper_bound);
        rewritten += 1;
    }
    Ok(rewritten)
}

/// Pairs of distinct reactions that act on exactly the same metabolites.
///
/// Catches reactions duplicated under two ids, and the same reaction entered
/// once per direction. Biomass variants are expected matches and left for
/// the caller to filter.
pub fn find_duplicate_reactions(model: &Model) -> Vec<(String, String)> {
    let signatures: Vec<(&String, BTreeSet<&str>)> = model
        .reactions
        .iter()
        .map(|(rxn_id, rxn)| {
            (
                rxn_id,
                rxn.metabolites.keys().map(String::as_str).collect(),
            )
        })
        .collect();
    let mut pairs = Vec::new();
    for (i, (id_a, sig_a)) in signatures.iter().enumerate() {
        for (id_b, sig_b) in signatures.iter().skip(i + 1) {
            if sig_a == sig_b {
                pairs.push(((*id_a).clone(), (*id_b).clone()));
            }
        }
    }
    pairs
}

/// Write the remaining mass and charge imbalances to a CSV report.
///
/// Exchange, demand, and biomass reactions are unbalanced by construction
/// and excluded. Rows are sorted by reaction id; the imbalance column lists
/// `element:residual` terms. Returns the number of imbalanced reactions.
pub fn write_imbalance_report<P: AsRef<Path>>(
    model: &Model,
    path: P,
) -> Result<usize, CurationError> {
    let mut records: Vec<(String, String, String)> = Vec::new();
    for (rxn_id, rxn) in model.reactions.iter() {
        if rxn_id.starts_with("EX_") || rxn_id.starts_with("DM") || rxn.is_biomass() {
            continue;
        }
        let balance = rxn.check_mass_balance(&model.metabolites)?;
        if balance.is_empty() {
            continue;
        }
        records.push((
            rxn_id.clone(),
            rxn.to_reaction_string(),
            format_balance(&balance),
        ));
    }
    records.sort_by(|a, b| a.0.cmp(&b.0));

    let mut writer = csv::Writer::from_path(&path)?;
    writer.write_record(["icbi_id", "icbi_rxn", "icbi_mb"])?;
    for (rxn_id, rxn_str, imbalance) in &records {
        writer.write_record([rxn_id, rxn_str, imbalance])?;
    }
    writer.flush()?;
    info!("Remaining imbalances: {}", records.len());
    Ok(records.len())
}

/// Pin reaction bounds for the final model release.
///
/// Each pin overwrites the bounds of one reaction and records the
/// justification under `curation_notes` in the reaction notes. Returns the
/// number of pins applied.
pub fn apply_bound_pins(
    model: &mut Model,
    rows: &[crate::io::tables::PinRow],
) -> Result<usize, CurationError> {
    for row in rows {
        let reaction = model.reaction_mut(&row.reaction_id)?;
        reaction.set_bounds(row.lower_bound, row.upper_bound);
        if let Some(note) = &row.note {
            let mut notes: serde_json::Map<String, serde_json::Value> = reaction
                .notes
                .as_deref()
                .and_then(|raw| serde_json::from_str(raw).ok())
                .unwrap_or_default();
            notes.insert(
                "curation_notes".to_string(),
                serde_json::Value::String(note.clone()),
            );
            reaction.notes = Some(serde_json::Value::Object(notes).to_string());
        }
    }
    Ok(rows.len())
}

fn format_balance(balance: &IndexMap<String, f64>) -> String {
    balance
        .iter()
        .map(|(element, residual)| format!("{}:{}", element, residual))
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metabolic_model::metabolite::MetaboliteBuilder;
    use crate::metabolic_model::reaction::ReactionBuilder;

    fn curation_model() -> Model {
        let mut model = Model::new_empty();
        for (id, formula, charge) in [
            ("h_c", "H", 1),
            ("h2o_c", "H2O", 0),
            ("oh_c", "HO", -1),
        ] {
            model.add_metabolite(
                MetaboliteBuilder::default()
                    .id(id.to_string())
                    .formula(Some(formula.to_string()))
                    .charge(charge)
                    .build()
                    .unwrap(),
            );
        }
        // Unbalanced on purpose: missing the proton
        let mut stoich = IndexMap::new();
        stoich.insert("oh_c".to_string(), -1.0);
        stoich.insert("h2o_c".to_string(), 1.0);
        model.add_reaction(
            ReactionBuilder::default()
                .id("HOH".to_string())
                .metabolites(stoich)
                .build()
                .unwrap(),
        );
        model
    }

    #[test]
    fn metabolite_curation_first_row_wins() {
        let mut model = curation_model();
        let rows = vec![
            MetaboliteCurationRow {
                icbi_id: "oh_c".to_string(),
                curated_formula: "HO".to_string(),
                curated_charge: -1,
            },
            MetaboliteCurationRow {
                icbi_id: "oh_c".to_string(),
                curated_formula: "WRONG".to_string(),
                curated_charge: 5,
            },
        ];
        let applied = apply_metabolite_curation(&mut model, &rows).unwrap();
        assert_eq!(applied, 1);
        assert_eq!(model.metabolites["oh_c"].formula.as_deref(), Some("HO"));
        assert_eq!(model.metabolites["oh_c"].charge, -1);
    }

    #[test]
    fn reaction_correction_rewrites_stoichiometry_and_bounds() {
        let mut model = curation_model();
        let rows = vec![ReactionCurationRow {
            icbi_id: "HOH".to_string(),
            curated_rxn: "h_c + oh_c <=> h2o_c".to_string(),
            action: None,
        }];
        let rewritten = apply_reaction_corrections(&mut model, &rows).unwrap();
        assert_eq!(rewritten, 1);
        let rxn = &model.reactions["HOH"];
        assert!((rxn.metabolites["h_c"] + 1.0).abs() < 1e-12);
        assert_eq!(rxn.lower_bound, -1000.);
        assert!(rxn.check_mass_balance(&model.metabolites).unwrap().is_empty());
    }

    #[test]
    fn reaction_correction_creates_unknown_metabolites() {
        let mut model = curation_model();
        let rows = vec![ReactionCurationRow {
            icbi_id: "HOH".to_string(),
            curated_rxn: "h2o_c + co2_c --> h2co3_c".to_string(),
            action: None,
        }];
        apply_reaction_corrections(&mut model, &rows).unwrap();
        let rxn = &model.reactions["HOH"];
        assert!((rxn.metabolites["co2_c"] + 1.0).abs() < 1e-12);
        assert!(model.metabolites.contains_key("co2_c"));
        assert!(model.metabolites.contains_key("h2co3_c"));
        assert_eq!(
            model.metabolites["h2co3_c"].compartment.as_deref(),
            Some("c")
        );
        // New metabolites have no formula yet, so they drop out of the
        // balance check instead of failing it
        assert!(rxn.check_mass_balance(&model.metabolites).is_ok());
    }

    #[test]
    fn ignore_action_skips_row() {
        let mut model = curation_model();
        let rows = vec![ReactionCurationRow {
            icbi_id: "HOH".to_string(),
            curated_rxn: "h_c + oh_c <=> h2o_c".to_string(),
            action: Some("ignore".to_string()),
        }];
        let rewritten = apply_reaction_corrections(&mut model, &rows).unwrap();
        assert_eq!(rewritten, 0);
        assert!(model.reactions["HOH"].metabolites.get("h_c").is_none());
    }

    #[test]
    fn duplicate_detection_matches_metabolite_sets() {
        let mut model = curation_model();
        // Same metabolites as HOH, opposite direction
        let mut stoich = IndexMap::new();
        stoich.insert("h2o_c".to_string(), -1.0);
        stoich.insert("oh_c".to_string(), 1.0);
        model.add_reaction(
            ReactionBuilder::default()
                .id("HOH_REV".to_string())
                .metabolites(stoich)
                .build()
                .unwrap(),
        );
        let pairs = find_duplicate_reactions(&model);
        assert_eq!(pairs, vec![("HOH".to_string(), "HOH_REV".to_string())]);
    }

    #[test]
    fn bound_pins_set_bounds_and_note() {
        let mut model = curation_model();
        let rows = vec![crate::io::tables::PinRow {
            reaction_id: "HOH".to_string(),
            lower_bound: 0.,
            upper_bound: 0.,
            note: Some("blocked pending further evidence".to_string()),
        }];
        apply_bound_pins(&mut model, &rows).unwrap();
        let rxn = &model.reactions["HOH"];
        assert_eq!(rxn.upper_bound, 0.);
        let notes: serde_json::Value =
            serde_json::from_str(rxn.notes.as_deref().unwrap()).unwrap();
        assert_eq!(
            notes["curation_notes"],
            "blocked pending further evidence"
        );
    }

    #[test]
    fn imbalance_report_skips_boundary_reactions() {
        let model = curation_model();
        let file = tempfile::NamedTempFile::new().unwrap();
        let count = write_imbalance_report(&model, file.path()).unwrap();
        assert_eq!(count, 1);
        let content = std::fs::read_to_string(file.path()).unwrap();
        assert!(content.starts_with("icbi_id,icbi_rxn,icbi_mb"));
        assert!(content.contains("HOH"));
    }
}
