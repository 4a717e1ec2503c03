mod model_builder;

pub use model_builder::ModelBuilder;
