mod store;
mod validation;

pub use store::{PublishPact, PublishedPact, create_or_update, find_view, to_view};
pub use validation::validate_publication;
