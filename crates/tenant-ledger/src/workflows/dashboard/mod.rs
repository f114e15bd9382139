//! Tenant dashboard assembly: one fatal identity lookup followed by an
//! isolated fan-out over billing, room, and maintenance providers.

pub mod domain;
mod fanout;
mod service;

pub use fanout::{Isolation, Settled, Slice};
pub use service::{
    DashboardError, DashboardProviders, SliceErrors, TenantDashboard, TenantDashboardService,
};
