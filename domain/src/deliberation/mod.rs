//! Deliberation domain module — the council trace and its viewer cursor.
//!
//! A settled council reply arrives in one of two wire shapes: a multi-step
//! workflow record (`steps: [...]`) or a legacy flat record carrying a single
//! set of stages at the top level. [`payload`] normalizes both into the
//! canonical [`record::DeliberationRecord`] exactly once, at the boundary;
//! everything downstream branches on the canonical shape only.

pub mod navigation;
pub mod payload;
pub mod record;
