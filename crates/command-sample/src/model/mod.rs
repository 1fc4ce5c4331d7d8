//! Records served by the sample resources.

pub mod authorized_app;
pub mod personalized_info;

pub use authorized_app::*;
pub use personalized_info::*;
