pub mod application;
pub mod reflex;
