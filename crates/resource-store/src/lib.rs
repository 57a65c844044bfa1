//! Random-access, cooperatively-prepared byte sources for the resource
//! loader.
//!
//! This crate is the bottom layer of the resource subsystem (component A):
//! it defines [`BlobIo`], the polymorphic byte source every provider in
//! `resource-loader` builds on top of, plus the concrete blob kinds the core
//! providers need (fixed, appendable, compressed-appendable, file-backed).
//! It carries no knowledge of URLs, providers, or typed resources — those
//! live in `resource-loader`.

mod blob;
mod config;
mod error;

pub use blob::{
    AppendableBufferBlob, BlobIo, CompressedAppendableBufferBlob, FileBlob, FixedBufferBlob,
    PrepareStatus,
};
pub use config::BlobConfig;
pub use error::{Error, Result};
