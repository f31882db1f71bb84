pub mod analyzer;
pub mod compat;
pub mod error;
pub mod model;
pub mod risk;
pub mod rules;
pub mod validate;
