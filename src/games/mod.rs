//! Game implementations.

pub mod baduk;
