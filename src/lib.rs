//! Settle Sherpa - Conversational Debt-Repayment Negotiation Assistant
//!
//! This crate implements a deterministic payment-plan core behind a
//! language-model-backed chat surface. The model is presentation-only;
//! every schedule the user sees is recomputed from integer-cent
//! arithmetic before it leaves the service.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
