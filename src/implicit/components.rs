//! Boundary conditions.

mod flow_boundary;
mod table_boundary;

pub use flow_boundary::{FlowBoundary, FlowBoundaryDescriptor};
pub use table_boundary::TableBoundary;
