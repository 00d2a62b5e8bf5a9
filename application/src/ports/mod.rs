//! Port definitions (interfaces for external adapters)
//!
//! Ports define the contracts that infrastructure and presentation adapters
//! plug into: the remote council backend on one side, the event stream to
//! the UI on the other.

pub mod council_gateway;
pub mod ui_event;
