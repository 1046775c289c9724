// Application layer: use cases built on the domain and feed model

pub mod formulation_service;

pub use formulation_service::FeedFormulationService;
