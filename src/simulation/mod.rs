pub mod states;
pub mod params;
pub mod path;
pub mod orbit;
pub mod field;
pub mod scenario;
