//! End-to-end identity verification of a natural person against an ICAO
//! 9303 machine-readable travel document.
//!
//! # Architecture
//!
//! [`phase`] drives a 4-state linear machine (MRZ -> portrait -> liveness ->
//! review -> submitted). [`mrz_engine`] supplies phase 1's OCR-and-parse
//! engine as an independent, separately unit-tested crate. [`face`] and
//! [`liveness`] supply phases 2 and 3. [`attestation`] merges everything
//! into the final record.
//!
//! # Guidelines
//!
//! The code should be formatted with Rustfmt using the project-level
//! `rustfmt.toml`. The code should pass clippy lints in pedantic mode and
//! the `#[warn(missing_docs)]` lint.

#![warn(missing_docs, unsafe_op_in_unsafe_fn)]
#![warn(clippy::pedantic)]
#![allow(clippy::doc_markdown, clippy::missing_errors_doc, clippy::missing_panics_doc)]

pub mod attestation;
pub mod cli;
pub mod collaborators;
pub mod config;
pub mod consts;
pub mod error;
pub mod face;
pub mod image_ops;
pub mod liveness;
pub mod logger;
pub mod phase;
pub mod types;

use eyre::Result;
use futures::prelude::*;

/// A wrapper for the main function: installs `color-eyre`/`tracing`, then
/// runs `f` to completion on a single-threaded cooperative runtime. The
/// teacher's multi-thread runtime exists to multiplex concurrent hardware
/// agents; this core has no such need (§5: single-threaded cooperative).
pub fn async_main<F: Future<Output = Result<()>>>(f: F) -> Result<()> {
    logger::init()?;
    let future = async {
        match f.await {
            Ok(()) => std::process::exit(0),
            Err(err) => {
                tracing::error!("fatal error: {err:?}");
                std::process::exit(1);
            }
        }
    };
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("failed to initialize async runtime")
        .block_on(future)
}
