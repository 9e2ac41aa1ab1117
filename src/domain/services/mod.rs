pub mod auth_service;
pub mod conflicts;
pub mod generator;
pub mod projector;
pub mod slots;
