//! # colmeia-core
//!
//! Domain types, validation rules, and error types for Colmeia.
//!
//! This crate provides the foundational types shared across all Colmeia crates:
//! - Entity structs for every record (species, apiaries, hives, revisions, menus)
//! - Choice enums with their stored values and Portuguese labels
//! - The two-decimal [`quantity::Quantity`] used for harvest and feeding amounts
//! - The request [`identity::Actor`] and its permission checks
//! - Field-level [`validation::ValidationErrors`] and cross-cutting errors
//! - Reference catalogs (Brazilian states, box models, seasons)

pub mod catalog;
pub mod entities;
pub mod enums;
pub mod errors;
pub mod identity;
pub mod ids;
pub mod quantity;
pub mod validation;
