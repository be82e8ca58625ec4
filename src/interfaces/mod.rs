//! Batch input and tabular output for the command line.

pub mod csv;
