//! Domains module containing business logic organized by bounded contexts.

pub mod invoices;
pub mod resources;
pub mod tools;
pub mod upstream;
