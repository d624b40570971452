pub mod analyze;
pub mod audit;
pub mod candidate;
pub mod classify;
pub mod dispatch;
pub mod fact;
pub mod recheck;
pub mod registry;
pub mod resolve;
pub mod session;
pub mod shared;
