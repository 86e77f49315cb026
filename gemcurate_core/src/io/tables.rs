//! Typed CSV loaders for curation and configuration tables.
//!
//! Every manual curation step is driven by a flat table keyed by identifier;
//! this module owns the table shapes so the curation passes only see typed
//! rows.

use std::fs::File;
use std::path::Path;

use indexmap::IndexMap;
use serde::Deserialize;
use thiserror::Error;

/// Direction in which to read the locus tag update map
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GeneMapOrder {
    OldToNew,
    NewToOld,
}

/// Row of the locus tag update table (`old_locus_tag`,`locus_tag`)
#[derive(Debug, Deserialize)]
struct GeneMapRow {
    old_locus_tag: String,
    locus_tag: String,
}

/// Load the gene locus tag map in the requested direction
pub fn load_gene_map<P: AsRef<Path>>(
    path: P,
    order: GeneMapOrder,
) -> Result<IndexMap<String, String>, TableError> {
    let mut reader = csv::Reader::from_path(&path)?;
    let mut gene_map = IndexMap::new();
    for row in reader.deserialize() {
        let row: GeneMapRow = row?;
        match order {
            GeneMapOrder::OldToNew => gene_map.insert(row.old_locus_tag, row.locus_tag),
            GeneMapOrder::NewToOld => gene_map.insert(row.locus_tag, row.old_locus_tag),
        };
    }
    Ok(gene_map)
}

/// Row of an id translation table (`ms`,`bigg`)
#[derive(Debug, Deserialize)]
struct IdMapRow {
    ms: String,
    bigg: String,
}

/// Load a ModelSEED to BiGG id map (metabolites or reactions)
pub fn load_id_map<P: AsRef<Path>>(path: P) -> Result<IndexMap<String, String>, TableError> {
    let mut reader = csv::Reader::from_path(&path)?;
    let mut id_map = IndexMap::new();
    for row in reader.deserialize() {
        let row: IdMapRow = row?;
        id_map.insert(row.ms, row.bigg);
    }
    Ok(id_map)
}

/// Row of the metabolite curation table
#[derive(Debug, Deserialize, Clone)]
pub struct MetaboliteCurationRow {
    pub icbi_id: String,
    pub curated_formula: String,
    pub curated_charge: i32,
}

pub fn load_metabolite_curation<P: AsRef<Path>>(
    path: P,
) -> Result<Vec<MetaboliteCurationRow>, TableError> {
    deserialize_rows(path)
}

/// Row of a reaction stoichiometry curation table
#[derive(Debug, Deserialize, Clone)]
pub struct ReactionCurationRow {
    pub icbi_id: String,
    pub curated_rxn: String,
    #[serde(default)]
    pub action: Option<String>,
}

pub fn load_reaction_curation<P: AsRef<Path>>(
    path: P,
) -> Result<Vec<ReactionCurationRow>, TableError> {
    deserialize_rows(path)
}

/// Row of a reaction bounds table exported from a draft reconstruction
#[derive(Debug, Deserialize, Clone)]
pub struct BoundsRow {
    pub id: String,
    pub lowerbound: f64,
    pub upperbound: f64,
}

pub fn load_bounds_table<P: AsRef<Path>>(path: P) -> Result<Vec<BoundsRow>, TableError> {
    deserialize_rows(path)
}

/// Row of a medium definition file (`reaction_id`,`lower_bound`)
#[derive(Debug, Deserialize, Clone)]
pub struct MediumRow {
    pub reaction_id: String,
    pub lower_bound: f64,
}

pub fn load_medium<P: AsRef<Path>>(path: P) -> Result<Vec<MediumRow>, TableError> {
    deserialize_rows(path)
}

/// Row of a secretion policy file (`reaction_id`,`upper_bound`)
#[derive(Debug, Deserialize, Clone)]
pub struct SecretionRow {
    pub reaction_id: String,
    pub upper_bound: f64,
}

pub fn load_secretion<P: AsRef<Path>>(path: P) -> Result<Vec<SecretionRow>, TableError> {
    deserialize_rows(path)
}

/// Row of the final-model pin table (`reaction_id`,`lower_bound`,`upper_bound`,`note`)
#[derive(Debug, Deserialize, Clone)]
pub struct PinRow {
    pub reaction_id: String,
    pub lower_bound: f64,
    pub upper_bound: f64,
    #[serde(default)]
    pub note: Option<String>,
}

pub fn load_pins<P: AsRef<Path>>(path: P) -> Result<Vec<PinRow>, TableError> {
    deserialize_rows(path)
}

fn deserialize_rows<P: AsRef<Path>, T: serde::de::DeserializeOwned>(
    path: P,
) -> Result<Vec<T>, TableError> {
    let mut reader = csv::Reader::from_path(&path)?;
    let mut rows = Vec::new();
    for row in reader.deserialize() {
        rows.push(row?);
    }
    Ok(rows)
}

// region ATP parameters

/// GAM/NGAM pair for one culture condition
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AtpParams {
    pub gam: f64,
    pub ngam: f64,
}

/// The ATP parameter table: one GAM/NGAM column per culture condition.
///
/// On disk the table is transposed relative to most curation tables:
/// headers are condition names, rows are the `GAM` and `NGAM` parameters.
#[derive(Debug, Clone)]
pub struct AtpParamTable {
    pub conditions: IndexMap<String, AtpParams>,
}

impl AtpParamTable {
    pub fn read<P: AsRef<Path>>(path: P) -> Result<Self, TableError> {
        let mut reader = csv::Reader::from_path(&path)?;
        let headers = reader.headers()?.clone();
        let mut gam_row: Option<csv::StringRecord> = None;
        let mut ngam_row: Option<csv::StringRecord> = None;
        for record in reader.records() {
            let record = record?;
            match record.get(0) {
                Some("GAM") => gam_row = Some(record),
                Some("NGAM") => ngam_row = Some(record),
                Some(other) => {
                    return Err(TableError::UnknownParameter(other.to_string()));
                }
                None => {}
            }
        }
        let gam_row = gam_row.ok_or_else(|| TableError::MissingParameter("GAM".to_string()))?;
        let ngam_row = ngam_row.ok_or_else(|| TableError::MissingParameter("NGAM".to_string()))?;

        let mut conditions = IndexMap::new();
        for (column, header) in headers.iter().enumerate().skip(1) {
            let gam = parse_field(gam_row.get(column), header)?;
            let ngam = parse_field(ngam_row.get(column), header)?;
            conditions.insert(header.to_string(), AtpParams { gam, ngam });
        }
        Ok(AtpParamTable { conditions })
    }

    pub fn get(&self, condition: &str) -> Result<AtpParams, TableError> {
        self.conditions
            .get(condition)
            .copied()
            .ok_or_else(|| TableError::MissingCondition(condition.to_string()))
    }
}

fn parse_field(field: Option<&str>, header: &str) -> Result<f64, TableError> {
    field
        .and_then(|value| value.trim().parse::<f64>().ok())
        .ok_or_else(|| TableError::BadNumericField(header.to_string()))
}

// endregion ATP parameters

// region Flux dataset

/// Metadata columns of the extracellular flux dataset; every other column is
/// a measured rate (paired with a `_std` column).
const FLUX_METADATA_COLUMNS: [&str; 7] = [
    "index",
    "Strain",
    "deleted_genes",
    "Medium",
    "Reference",
    "Reactor",
    "Notes",
];

/// One measured rate: mean and standard deviation, NaN when unmeasured
#[derive(Debug, Clone, Copy)]
pub struct Measurement {
    pub mean: f64,
    pub std: f64,
}

impl Measurement {
    pub fn is_measured(&self) -> bool {
        !self.mean.is_nan()
    }
}

/// One row of the extracellular flux dataset
#[derive(Debug, Clone)]
pub struct FluxRow {
    pub index: u32,
    pub strain: String,
    pub deleted_genes: Option<String>,
    pub medium: String,
    pub reference: String,
    pub reactor: String,
    pub notes: Option<String>,
    /// Measured rates keyed by metabolite id (`GR` is the growth rate)
    pub measurements: IndexMap<String, Measurement>,
}

impl FluxRow {
    pub fn growth_rate(&self) -> Option<f64> {
        self.measurements
            .get("GR")
            .filter(|m| m.is_measured())
            .map(|m| m.mean)
    }
}

/// The full extracellular flux dataset
#[derive(Debug, Clone)]
pub struct FluxDataset {
    pub rows: Vec<FluxRow>,
}

impl FluxDataset {
    pub fn read<P: AsRef<Path>>(path: P) -> Result<Self, TableError> {
        let file = File::open(&path)?;
        let mut reader = csv::Reader::from_reader(file);
        let headers = reader.headers()?.clone();

        // Identify the measured-rate columns: anything that is not metadata
        // and not a `_std` companion column.
        let measurement_ids: Vec<String> = headers
            .iter()
            .filter(|header| {
                !header.ends_with("_std") && !FLUX_METADATA_COLUMNS.contains(header)
            })
            .map(|header| header.to_string())
            .collect();

        let column_index = |name: &str| headers.iter().position(|header| header == name);
        let get = |record: &csv::StringRecord, name: &str| -> Option<String> {
            column_index(name)
                .and_then(|idx| record.get(idx))
                .map(|value| value.to_string())
        };

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            let index = get(&record, "index")
                .and_then(|value| value.trim().parse::<u32>().ok())
                .ok_or_else(|| TableError::BadNumericField("index".to_string()))?;
            let mut measurements = IndexMap::new();
            for id in &measurement_ids {
                let mean = parse_optional_float(get(&record, id));
                let std = parse_optional_float(get(&record, &format!("{}_std", id)));
                measurements.insert(id.clone(), Measurement { mean, std });
            }
            rows.push(FluxRow {
                index,
                strain: get(&record, "Strain").unwrap_or_default(),
                deleted_genes: get(&record, "deleted_genes").filter(|value| !value.is_empty()),
                medium: get(&record, "Medium").unwrap_or_default(),
                reference: get(&record, "Reference").unwrap_or_default(),
                reactor: get(&record, "Reactor").unwrap_or_default(),
                notes: get(&record, "Notes").filter(|value| !value.is_empty()),
                measurements,
            });
        }
        Ok(FluxDataset { rows })
    }

    pub fn row_by_index(&self, index: u32) -> Option<&FluxRow> {
        self.rows.iter().find(|row| row.index == index)
    }
}

fn parse_optional_float(field: Option<String>) -> f64 {
    field
        .and_then(|value| {
            let trimmed = value.trim().to_string();
            if trimmed.is_empty() {
                None
            } else {
                trimmed.parse::<f64>().ok()
            }
        })
        .unwrap_or(f64::NAN)
}

// endregion Flux dataset

#[derive(Debug, Error)]
pub enum TableError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Unknown parameter row {0} in ATP parameter table")]
    UnknownParameter(String),
    #[error("ATP parameter table is missing the {0} row")]
    MissingParameter(String),
    #[error("No GAM/NGAM column for condition {0}")]
    MissingCondition(String),
    #[error("Unparseable numeric field in column {0}")]
    BadNumericField(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn gene_map_both_orders() {
        let file = write_temp("old_locus_tag,locus_tag\nClo1313_0966,CLO1313_RS04915\n");
        let old_to_new = load_gene_map(file.path(), GeneMapOrder::OldToNew).unwrap();
        assert_eq!(old_to_new["Clo1313_0966"], "CLO1313_RS04915");
        let new_to_old = load_gene_map(file.path(), GeneMapOrder::NewToOld).unwrap();
        assert_eq!(new_to_old["CLO1313_RS04915"], "Clo1313_0966");
    }

    #[test]
    fn id_map() {
        let file = write_temp("ms,bigg\ncpd00027,glc__D\ncpd00001,h2o\n");
        let id_map = load_id_map(file.path()).unwrap();
        assert_eq!(id_map["cpd00027"], "glc__D");
        assert_eq!(id_map.len(), 2);
    }

    #[test]
    fn reaction_curation_with_action() {
        let file = write_temp(
            "icbi_id,curated_rxn,action\n\
             PGK,3pg_c + atp_c <=> 13dpg_c + adp_c,\n\
             BAD,ignored_c --> nothing_c,ignore\n",
        );
        let rows = load_reaction_curation(file.path()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].action.as_deref(), Some("ignore"));
        assert!(rows[0].action.as_deref().unwrap_or("").is_empty());
    }

    #[test]
    fn atp_param_table() {
        let file = write_temp(
            "parameter,cellobiose_chemostat,cellulose_chemostat,batch\n\
             GAM,121.5,98.3,46.1\n\
             NGAM,10.5,4.9,2.6\n",
        );
        let table = AtpParamTable::read(file.path()).unwrap();
        let batch = table.get("batch").unwrap();
        assert!((batch.gam - 46.1).abs() < 1e-12);
        assert!((batch.ngam - 2.6).abs() < 1e-12);
        assert!(table.get("fed_batch").is_err());
    }

    #[test]
    fn flux_dataset_dynamic_columns() {
        let file = write_temp(
            "index,Strain,deleted_genes,Medium,Reference,Reactor,Notes,GR,GR_std,ac,ac_std,etoh,etoh_std\n\
             1,WT,,cellb_batch,Ref1,Batch,,0.30,0.02,6.1,0.4,4.2,0.3\n\
             2,hydg,CLO1313_RS07925,cellb_batch,Ref2,Batch,note,0.21,0.01,,,3.0,0.2\n",
        );
        let dataset = FluxDataset::read(file.path()).unwrap();
        assert_eq!(dataset.rows.len(), 2);
        let row = dataset.row_by_index(2).unwrap();
        assert_eq!(row.deleted_genes.as_deref(), Some("CLO1313_RS07925"));
        assert!((row.growth_rate().unwrap() - 0.21).abs() < 1e-12);
        assert!(!row.measurements["ac"].is_measured());
        assert!((row.measurements["etoh"].mean - 3.0).abs() < 1e-12);
        // GR is a measurement column, metadata is not
        assert!(dataset.rows[0].measurements.get("Strain").is_none());
    }
}
