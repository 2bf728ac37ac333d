//! API handlers for the Stacks REST endpoints

pub mod catalog;
pub mod health;
pub mod loans;
pub mod openapi;
pub mod reservations;
