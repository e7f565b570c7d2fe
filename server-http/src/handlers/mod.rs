pub mod carts;
pub mod health;
pub mod items;

pub use carts::{clear_cart, create_cart, get_cart};
pub use health::health_check;
pub use items::{add_item, remove_item, update_item};
