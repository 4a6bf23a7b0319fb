//! Convenience macros.

mod entity;
mod go;
