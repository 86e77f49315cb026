//! Parse strain knockout descriptions into gene deletions
//!
//! The flux dataset describes deleted genes as a comma separated list where
//! each entry is a single locus tag or a range like
//! `CLO1313_RS05080-CLO1313_RS05090` (the second tag may be abbreviated to
//! `RS05090`). Locus tags step by 5, and old `Clo1313_####` tags are
//! translated through the gene map.

use indexmap::IndexMap;
use log::warn;

use crate::conditions::ConditionError;
use crate::metabolic_model::model::Model;

/// Expand a knockout description into the full list of locus tags
pub fn expand_gene_list(
    deleted_genes: &str,
    gene_map: &IndexMap<String, String>,
) -> Result<Vec<String>, ConditionError> {
    let mut all_deleted: Vec<String> = Vec::new();
    for token in deleted_genes.split(',') {
        let token = token.replace(' ', "");
        let mut range: Vec<String> = token.split('-').map(str::to_string).collect();

        // Complete an abbreviated second tag from the first one's prefix
        if range.len() == 2
            && !(range[1].starts_with("Clo1313") || range[1].starts_with("CLO1313"))
        {
            range[1] = format!("{}_{}", &range[0][..7.min(range[0].len())], range[1]);
        }

        // Translate old locus tags
        let range: Vec<String> = range
            .into_iter()
            .map(|gene_id| gene_map.get(&gene_id).cloned().unwrap_or(gene_id))
            .collect();

        match range.len() {
            1 => all_deleted.push(range[0].clone()),
            2 => {
                let start = tag_number(&range[0], &token)?;
                let end = tag_number(&range[1], &token)?;
                let mut x = start;
                while x <= end {
                    if x < 10000 {
                        all_deleted.push(format!("CLO1313_RS0{}", x));
                    } else {
                        all_deleted.push(format!("CLO1313_RS{}", x));
                    }
                    x += 5;
                }
            }
            _ => return Err(ConditionError::BadKnockoutList(token)),
        }
    }
    Ok(all_deleted)
}

fn tag_number(gene_id: &str, token: &str) -> Result<u32, ConditionError> {
    if gene_id.len() < 5 {
        return Err(ConditionError::BadKnockoutList(token.to_string()));
    }
    gene_id[gene_id.len() - 5..]
        .parse::<u32>()
        .map_err(|_| ConditionError::BadKnockoutList(token.to_string()))
}

/// Knock out every gene named by a knockout description.
///
/// Ranges can sweep over locus tags that are not in the model (intergenic
/// or non-metabolic genes); those are reported and skipped.
pub fn knock_out_genes(
    model: &mut Model,
    deleted_genes: &str,
    gene_map: &IndexMap<String, String>,
) -> Result<(), ConditionError> {
    for gene_id in expand_gene_list(deleted_genes, gene_map)? {
        if model.genes.contains_key(&gene_id) {
            model.knock_out_gene(&gene_id)?;
        } else {
            warn!("Gene not in model: {}", gene_id);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_map() -> IndexMap<String, String> {
        IndexMap::new()
    }

    #[test]
    fn single_gene() {
        let genes = expand_gene_list("CLO1313_RS07925", &no_map()).unwrap();
        assert_eq!(genes, vec!["CLO1313_RS07925".to_string()]);
    }

    #[test]
    fn comma_separated_list_with_spaces() {
        let genes = expand_gene_list("CLO1313_RS07925, CLO1313_RS12345", &no_map()).unwrap();
        assert_eq!(genes.len(), 2);
        assert_eq!(genes[1], "CLO1313_RS12345");
    }

    #[test]
    fn range_steps_by_five() {
        let genes =
            expand_gene_list("CLO1313_RS05080-CLO1313_RS05090", &no_map()).unwrap();
        assert_eq!(
            genes,
            vec![
                "CLO1313_RS05080".to_string(),
                "CLO1313_RS05085".to_string(),
                "CLO1313_RS05090".to_string(),
            ]
        );
    }

    #[test]
    fn abbreviated_range_end_is_completed() {
        let genes = expand_gene_list("CLO1313_RS05080-RS05090", &no_map()).unwrap();
        assert_eq!(genes.len(), 3);
        assert_eq!(genes[2], "CLO1313_RS05090");
    }

    #[test]
    fn four_digit_tags_keep_leading_zero() {
        let genes = expand_gene_list("CLO1313_RS09995-CLO1313_RS10005", &no_map()).unwrap();
        assert_eq!(
            genes,
            vec![
                "CLO1313_RS09995".to_string(),
                "CLO1313_RS10000".to_string(),
                "CLO1313_RS10005".to_string(),
            ]
        );
    }

    #[test]
    fn old_locus_tags_are_translated() {
        let mut gene_map = IndexMap::new();
        gene_map.insert("Clo1313_0966".to_string(), "CLO1313_RS04915".to_string());
        let genes = expand_gene_list("Clo1313_0966", &gene_map).unwrap();
        assert_eq!(genes, vec!["CLO1313_RS04915".to_string()]);
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(expand_gene_list("a-b-c", &no_map()).is_err());
        assert!(expand_gene_list("xy-zw", &no_map()).is_err());
    }
}
