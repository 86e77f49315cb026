//! Nomenclature upgrade: ModelSEED ids to BiGG ids, locus tag updates
//!
//! Draft reconstructions come out of automated pipelines with ModelSEED
//! compound/reaction ids and compartment-suffixed gene ids. These passes
//! rewrite the model in place to the BiGG nomenclature the curation tables
//! use.

use indexmap::IndexMap;
use log::debug;

use crate::curation::CurationError;
use crate::metabolic_model::model::Model;

/// Rename metabolites through a ModelSEED to BiGG map.
///
/// Metabolite ids carry a compartment suffix like `_c0`; the map is keyed by
/// the bare compound id. The rewritten id keeps the compartment letter but
/// drops the trailing `0` (`cpd00002_c0` becomes `atp_c`). Metabolites with
/// no map entry are left alone. Returns the number of renames applied.
pub fn remap_metabolite_ids(
    model: &mut Model,
    id_map: &IndexMap<String, String>,
) -> Result<usize, CurationError> {
    let mut renames: Vec<(String, String)> = Vec::new();
    for (met_id, met) in model.metabolites.iter() {
        if met_id.len() < 3 {
            continue;
        }
        let bare_id = &met_id[..met_id.len() - 3];
        let new_base = match id_map.get(bare_id) {
            Some(bigg) => bigg,
            None => continue,
        };
        let compartment = match &met.compartment {
            Some(comp) => comp.trim_end_matches('0').to_string(),
            // Fall back to the id suffix, e.g. `_c0`
            None => met_id[met_id.len() - 2..].trim_end_matches('0').to_string(),
        };
        renames.push((met_id.clone(), format!("{}_{}", new_base, compartment)));
    }
    for (old_id, new_id) in &renames {
        debug!("renaming metabolite {} to {}", old_id, new_id);
        model.rename_metabolite(old_id, new_id)?;
    }
    Ok(renames.len())
}

/// Rename reactions through a ModelSEED to BiGG map.
///
/// Unlike metabolites, the map is keyed by the full reaction id. Returns the
/// number of renames applied.
pub fn remap_reaction_ids(
    model: &mut Model,
    id_map: &IndexMap<String, String>,
) -> Result<usize, CurationError> {
    let renames: Vec<(String, String)> = model
        .reactions
        .keys()
        .filter_map(|rxn_id| {
            id_map
                .get(rxn_id)
                .map(|new_id| (rxn_id.clone(), new_id.clone()))
        })
        .collect();
    for (old_id, new_id) in &renames {
        debug!("renaming reaction {} to {}", old_id, new_id);
        model.rename_reaction(old_id, new_id)?;
    }
    Ok(renames.len())
}

/// Strip the `_CDS_1` suffix the annotation pipeline appends to every gene,
/// then update old locus tags to current ones through the gene map.
///
/// The placeholder gene `Unknown` is left untouched.
pub fn standardize_gene_ids(
    model: &mut Model,
    gene_map: &IndexMap<String, String>,
) -> Result<usize, CurationError> {
    let mut renames: Vec<(String, String)> = Vec::new();
    for gene_id in model.genes.keys() {
        if gene_id == "Unknown" {
            continue;
        }
        let stripped = gene_id.strip_suffix("_CDS_1").unwrap_or(gene_id);
        let updated = gene_map.get(stripped).map(String::as_str).unwrap_or(stripped);
        if updated != gene_id {
            renames.push((gene_id.clone(), updated.to_string()));
        }
    }
    for (old_id, new_id) in &renames {
        model.rename_gene(old_id, new_id)?;
    }
    Ok(renames.len())
}
