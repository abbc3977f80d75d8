// Join and leave
pub mod domain;

// Inspection
pub mod modules;
pub mod query;
