//! File format I/O.

pub mod dwg;
