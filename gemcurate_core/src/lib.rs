//! Core library for curating, conditioning, and analyzing genome-scale
//! metabolic models (GEMs).
//!
//! The library is organized around a [`metabolic_model::model::Model`] loaded
//! from COBRA-JSON, a set of table-driven curation passes (`curation`),
//! experimental condition configuration (`conditions`), LP-backed flux
//! balance analysis (`optimize`), and the maintenance-energy fit and model
//! comparison routines (`analysis`). The linear programs themselves are
//! delegated to an external solver crate.

pub mod analysis;
pub mod conditions;
mod configuration;
pub mod curation;
pub mod io;
pub mod metabolic_model;
pub mod optimize;

pub use configuration::CONFIGURATION;
