//! Session coordination

pub mod controller;
