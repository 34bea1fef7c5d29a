//! Promptwise - Conversational Prompt Optimization Service
//!
//! This crate walks a user through rewriting a raw prompt with an LLM:
//! mode selection, optional deep-research follow-up questions, and a
//! structured critique of the rewrite.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
