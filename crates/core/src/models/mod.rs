//! Backend resources as the REST API serializes them.
//!
//! The client holds read-only copies of these. Field names follow the wire
//! format (snake case) so no renames are needed.

pub mod order;
pub mod page;
pub mod product;
pub mod stats;
pub mod user;

pub use order::{Order, OrderCustomer, OrderDetail, OrderProduct};
pub use page::Page;
pub use product::{PLACEHOLDER_IMAGE_URL, Product, resolve_image_url};
pub use stats::{BestSeller, DashboardStats, MonthlySales, SalesSummary, StockLevel};
pub use user::User;
