mod store;

pub use store::{find_by_id, find_by_name, resolve_or_create};
