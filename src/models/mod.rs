pub mod category;
pub mod disease;
pub mod enums;
pub mod lab;
pub mod order_set;
pub mod patient;

pub use category::*;
pub use disease::*;
pub use enums::*;
pub use lab::*;
pub use lab_test::*;
pub use order_set::*;
pub use patient::*;
