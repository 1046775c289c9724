// Domain module: LP boundary models, the engine contract and the solve session

pub mod models;
pub mod session;
pub mod solver_service;
pub mod value_objects;

pub use models::*;
pub use session::*;
pub use solver_service::*;
pub use value_objects::*;
