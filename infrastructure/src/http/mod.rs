//! HTTP adapter for the council backend

pub mod gateway;
pub mod wire;
