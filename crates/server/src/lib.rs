pub mod routes;
pub mod startup;
pub mod errors;
pub mod openapi;
pub mod ws;

pub use startup::run;
