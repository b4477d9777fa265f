// Domain module: sourcing model formulation and solution extraction

pub mod extractor;
pub mod model_builder;
pub mod models;
pub mod problem_data;
pub mod solver_service;
pub mod value_objects;
pub mod variables;

pub use extractor::*;
pub use model_builder::*;
pub use models::*;
pub use problem_data::*;
pub use solver_service::*;
pub use value_objects::*;
pub use variables::*;
