//! Module for reading and writing Models and curation tables
pub mod gpr_parse;
pub mod json;
pub mod rxn_parse;
pub mod tables;
