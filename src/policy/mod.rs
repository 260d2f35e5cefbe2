//! Admission policy evaluation.
//!
//! - [`proxy`]: keyword heuristic over ISP and organization names
//! - [`region`]: the allow/deny rule combining region eligibility, proxy signals,
//!   and the operator's denied region list

pub mod proxy;
pub mod region;

pub use proxy::{contains_proxy_keyword, looks_like_proxy, PROXY_KEYWORDS};
pub use region::{assess, evaluate};
