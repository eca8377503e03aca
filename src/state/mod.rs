pub mod results;

pub use results::ResultsTable;
