//! Message send pipeline

pub mod send;
