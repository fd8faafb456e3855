pub mod ant_colony;
pub use ant_colony as c001_a001;
