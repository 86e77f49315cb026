//! Data structures representing a genome scale metabolic model

pub mod gene;
pub mod metabolite;
pub mod model;
pub mod reaction;
