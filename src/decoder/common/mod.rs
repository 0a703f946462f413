mod listpack;
pub mod utils;
mod ziplist;

pub use listpack::read_list_pack_entries;
pub use ziplist::read_ziplist_entries;
