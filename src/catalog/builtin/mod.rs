//! Catalog data shipped with the crate: lab tests, order sets, diseases and
//! display categories.

mod categories;
mod diseases;
mod lab_tests;
mod order_sets;

pub use categories::*;
pub use diseases::diseases;
pub use lab_tests::{ckd_epi_2021, lab_tests};
pub use order_sets::order_sets;
