pub mod analyze;
pub mod attribute;
pub mod cli;
pub mod complexity;
pub mod error;
pub mod extent;
pub mod gate;
pub mod generated;
pub mod lookup;
pub mod model;
pub mod parsers;
pub mod report;
pub mod resolve;
pub mod runner;
pub mod score;
pub mod summary;
