//! Biomass reaction utilities: GAM replacement, NGAM bounds, and molecular
//! weight normalization.

use indexmap::IndexMap;
use log::warn;

use crate::configuration::CONFIGURATION;
use crate::curation::CurationError;
use crate::metabolic_model::metabolite::Metabolite;
use crate::metabolic_model::model::Model;
use crate::metabolic_model::reaction::Reaction;

/// The ATP hydrolysis quintet whose coefficients carry the growth
/// associated maintenance cost inside a biomass reaction.
const GAM_SUBSTRATES: [&str; 2] = ["atp_c", "h2o_c"];
const GAM_PRODUCTS: [&str; 3] = ["adp_c", "h_c", "pi_c"];

/// Replace the growth associated maintenance cost of a biomass reaction.
///
/// Only quintet members already present in the reaction are rewritten, so a
/// biomass formulated without, say, free protons stays that way.
pub fn set_reaction_gam(reaction: &mut Reaction, gam_value: f64) {
    let targets: IndexMap<String, f64> = reaction
        .metabolites
        .iter()
        .filter(|(met_id, _)| {
            GAM_SUBSTRATES.contains(&met_id.as_str()) || GAM_PRODUCTS.contains(&met_id.as_str())
        })
        .map(|(met_id, coefficient)| (met_id.clone(), *coefficient))
        .collect();
    reaction.subtract_metabolites(&targets);
    let mut replacement = IndexMap::new();
    for met_id in targets.keys() {
        if GAM_SUBSTRATES.contains(&met_id.as_str()) {
            replacement.insert(met_id.clone(), -gam_value.abs());
        } else {
            replacement.insert(met_id.clone(), gam_value.abs());
        }
    }
    reaction.add_metabolites(&replacement);
}

/// Set the GAM of every biomass reaction in the model
pub fn set_all_biomass_gam(model: &mut Model, gam_value: f64) {
    for (_, reaction) in model.reactions.iter_mut() {
        if reaction.is_biomass() {
            set_reaction_gam(reaction, gam_value);
        }
    }
}

/// Set the non-growth associated maintenance as the ATPM lower bound
pub fn set_ngam(model: &mut Model, ngam_value: f64) -> Result<(), CurationError> {
    let upper_bound = CONFIGURATION.read().unwrap().upper_bound;
    model
        .reaction_mut("ATPM")?
        .set_bounds(ngam_value, upper_bound);
    Ok(())
}

/// Molecular weight in g/mmol of a net elemental composition.
///
/// The composition is typically the mass balance residual of a biomass
/// reaction. The charge pseudo element and any element without a tabulated
/// weight are skipped.
pub fn calc_mw(composition: &IndexMap<String, f64>) -> f64 {
    let molecular_weight: [(&str, f64); 10] = [
        ("C", 12.),
        ("Ca", 40.078),
        ("Fe", 55.845),
        ("H", 1.),
        ("K", 39.0983),
        ("Mg", 24.305),
        ("N", 14.),
        ("O", 16.),
        ("P", 30.973),
        ("S", 32.065),
    ];
    let mut mw = 0.;
    for (element, count) in composition {
        if element == "charge" {
            continue;
        }
        match molecular_weight.iter().find(|(sym, _)| sym == element) {
            Some((_, weight)) => mw += weight * count.abs(),
            None => warn!("{} not included, coefficient: {}", element, count),
        }
    }
    mw / 1000.
}

/// Rescale a biomass reaction so that one flux unit produces 1 g of biomass.
///
/// Divides every coefficient by the biomass molecular weight, then verifies
/// the rescaled reaction weighs 1 g/mmol.
pub fn normalize_biomass(
    reaction: &mut Reaction,
    metabolites: &IndexMap<String, Metabolite>,
) -> Result<(), CurationError> {
    let mw = calc_mw(&reaction.check_mass_balance(metabolites)?);
    let rescaled: IndexMap<String, f64> = reaction
        .metabolites
        .iter()
        .map(|(met_id, coefficient)| (met_id.clone(), coefficient / mw))
        .collect();
    reaction.set_metabolites(rescaled);

    let mw_after = calc_mw(&reaction.check_mass_balance(metabolites)?);
    if (1. - mw_after).abs() > 1e-05 {
        return Err(CurationError::BiomassNotNormalized {
            id: reaction.id.clone(),
            mw: mw_after,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metabolic_model::metabolite::MetaboliteBuilder;
    use crate::metabolic_model::reaction::ReactionBuilder;

    fn biomass_reaction() -> Reaction {
        let mut stoich = IndexMap::new();
        stoich.insert("precursor_c".to_string(), -0.5);
        stoich.insert("atp_c".to_string(), -30.0);
        stoich.insert("h2o_c".to_string(), -30.0);
        stoich.insert("adp_c".to_string(), 30.0);
        stoich.insert("h_c".to_string(), 30.0);
        stoich.insert("pi_c".to_string(), 30.0);
        ReactionBuilder::default()
            .id("BIOMASS_CELLOBIOSE".to_string())
            .metabolites(stoich)
            .lower_bound(0.0)
            .build()
            .unwrap()
    }

    #[test]
    fn gam_replacement_keeps_signs() {
        let mut rxn = biomass_reaction();
        set_reaction_gam(&mut rxn, 46.1);
        assert!((rxn.metabolites["atp_c"] + 46.1).abs() < 1e-12);
        assert!((rxn.metabolites["h2o_c"] + 46.1).abs() < 1e-12);
        assert!((rxn.metabolites["adp_c"] - 46.1).abs() < 1e-12);
        assert!((rxn.metabolites["pi_c"] - 46.1).abs() < 1e-12);
        // Non-quintet members untouched
        assert!((rxn.metabolites["precursor_c"] + 0.5).abs() < 1e-12);
    }

    #[test]
    fn gam_zeroing_removes_quintet() {
        let mut rxn = biomass_reaction();
        set_reaction_gam(&mut rxn, 0.0);
        assert!(rxn.metabolites.get("atp_c").is_none());
        assert!(rxn.metabolites.contains_key("precursor_c"));
    }

    #[test]
    fn mw_of_glucose_composition() {
        let mut composition = IndexMap::new();
        composition.insert("C".to_string(), 6.0);
        composition.insert("H".to_string(), 12.0);
        composition.insert("O".to_string(), 6.0);
        composition.insert("charge".to_string(), -2.0);
        let mw = calc_mw(&composition);
        assert!((mw - 0.180).abs() < 1e-09);
    }

    #[test]
    fn normalization_rescales_to_unit_weight() {
        // A toy biomass consuming half a glucose-like precursor
        let mut metabolites = IndexMap::new();
        metabolites.insert(
            "precursor_c".to_string(),
            MetaboliteBuilder::default()
                .id("precursor_c".to_string())
                .formula(Some("C6H12O6".to_string()))
                .build()
                .unwrap(),
        );
        let mut stoich = IndexMap::new();
        stoich.insert("precursor_c".to_string(), -0.5);
        let mut rxn = ReactionBuilder::default()
            .id("BIOMASS_TOY".to_string())
            .metabolites(stoich)
            .lower_bound(0.0)
            .build()
            .unwrap();
        normalize_biomass(&mut rxn, &metabolites).unwrap();
        // 0.5 * 180 g/mol = 0.09 g/mmol, so the coefficient scales by 1/0.09
        assert!((rxn.metabolites["precursor_c"] + 0.5 / 0.09).abs() < 1e-06);
    }
}
