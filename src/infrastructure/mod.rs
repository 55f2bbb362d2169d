//! Port implementations bundled with the crate. Production SDK clients live
//! in the hosting application; only the simulated doubles ship here.

pub mod simulated;
