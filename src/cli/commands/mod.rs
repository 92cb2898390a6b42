mod init;
mod list;

pub use init::cmd_init;
pub use list::cmd_list_products;
