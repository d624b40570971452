//! # vf-core
//!
//! Core types for the vendor fact verification engine.
//!
//! This crate provides the foundational types shared across all crates:
//! - Entity structs for facts, the verification log, candidates, registry
//!   entries and research logs
//! - Status enums with state machine transitions
//! - Typed fact payloads validated at the discovery boundary
//! - Freshness, recheck and confidence rules for cached facts
//! - The `CRITICAL_FIELDS` TTL/priority table
//! - ID prefix constants and cross-cutting error types

pub mod critical_fields;
pub mod entities;
pub mod enums;
pub mod errors;
pub mod freshness;
pub mod ids;
pub mod payloads;
