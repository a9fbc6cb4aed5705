mod cart;
mod order;
mod product;
mod shop;
mod user;

pub use cart::*;
pub use order::*;
pub use product::*;
pub use shop::*;
pub use user::*;
