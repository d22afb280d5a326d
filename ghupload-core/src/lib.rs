#![doc = "ghupload-core: core logic library for ghupload."]

//! This crate contains the destination grammar, tree assembly and upload
//! pipeline for ghupload. Transport (the real GitHub client) and CLI glue
//! live in the `ghupload` binary crate; everything here talks to the remote
//! through the [`contract::GitHost`] trait so it can be mocked in tests.

pub mod contract;
pub mod destination;
pub mod error;
pub mod hash;
pub mod tree;
pub mod upload;
