pub mod callback;
pub mod config;
pub mod domain;
pub mod memory;
pub mod nats;
pub mod validation;
