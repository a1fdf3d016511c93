//! MARVIN - store, analyze and tidy up source files
//!
//! A small HTTP backend that accepts source files (as JSON or multipart
//! uploads), keeps them on disk and runs quick static checks on them.
//!
//! ## Pieces
//!
//! 1. **Scanner**: line counts for every language; for Python also a
//!    syntax-tree summary (top-level functions and classes, imports,
//!    complexity), bare `except:` detection and per-line checks for debug
//!    prints and TODO markers.
//!
//! 2. **Optimizer**: line-level rewrites (drop debug output, trim trailing
//!    whitespace, collapse blank lines).
//!
//! 3. **Storage**: files addressed by a random identifier, with report and
//!    optimized-copy sidecars.
//!
//! 4. **HTTP server**: `/create`, `/upload`, `/analyze`, `/optimize`, `/health`.

pub mod config;
pub mod domain;
pub mod http_server;
pub mod optimizer;
pub mod scanner;
pub mod storage;

pub use domain::*;
