pub mod defaults;
pub mod envvars;
pub mod filenames;
pub mod fleets;
