#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
//! Elastic distance kernels: DTW, EDR, ERP, TWED, and the Sakoe-Chiba /
//! Itakura window constraints shared by DTW/EDR/ERP.
//!
//! Every kernel implements [`tsc_traits::DistanceKernel`]: an optional
//! identity-keyed memo (see [`memo::Memo`]) short-circuits repeated
//! evaluations on the same series pair, and any parameter setter that
//! changes the distance function invalidates the memo synchronously.

mod dtw;
mod edr;
mod erp;
mod error;
mod memo;
mod twed;
mod window;

pub use dtw::DtwKernel;
pub use edr::EdrKernel;
pub use erp::ErpKernel;
pub use error::{KernelError, Result};
pub use twed::TwedKernel;
pub use window::Window;
