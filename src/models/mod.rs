//! Data models
//!
//! Rust structs representing database entities.

mod category;
mod gear_item;
mod pack_list;
mod pack_list_item;
mod user;

pub use category::{is_valid_color, Category, CategoryCreate, CategoryUpdate, CategoryWithStats};
pub use gear_item::{GearItem, GearItemCreate, GearItemUpdate};
pub use pack_list::{generate_share_slug, PackList, PackListCreate, PackListUpdate, SHARE_SLUG_LEN};
pub use pack_list_item::{
    load_pack_list_weights, PackListItem, PackListItemCreate, PackListItemDetail,
    PackListItemUpdate,
};
pub use user::User;
