//! Charterflow - Stage-Gated Interview Engine
//!
//! This crate drives a structured, multi-stage interview that turns a short
//! business idea into a validated project charter through quality-controlled
//! conversational exchanges.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
