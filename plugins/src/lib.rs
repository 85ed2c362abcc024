pub mod factory;
pub mod interaction;
pub mod store;
pub mod surface;
