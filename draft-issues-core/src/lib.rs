#![doc = "draft-issues-core: core logic library for draft-issues."]

//! This crate contains the parsing, data models and publish pipeline for draft-issues.
//! The concrete issue tracker (the GitHub CLI) lives in the binary crate; this crate only
//! knows the [`contract::IssueTracker`] trait.
//!
//! # Usage
//! Parse a draft with [`draft::load_draft`], pick a [`selection::Selection`], then hand the
//! records to [`publish::publish`] together with a tracker implementation.

pub mod config;
pub mod contract;
pub mod draft;
pub mod publish;
pub mod selection;
