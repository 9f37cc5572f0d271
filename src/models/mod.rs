mod admin;
mod category;
mod product;

pub use admin::*;
pub use category::*;
pub use product::*;
