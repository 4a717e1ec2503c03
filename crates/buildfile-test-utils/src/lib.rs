pub mod assertions;
pub mod builders;

pub use builders::ModelBuilder;
