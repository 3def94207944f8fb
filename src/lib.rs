//! Aluna Billing - Entitlement and payment-settlement core.
//!
//! Decides whether a user may consume a piece of paid content, and drives
//! purchase transactions to a terminal state across four payment rails
//! (card, PIX, boleto, bank transfer).

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
