pub mod pacticipants;
pub mod pacts;
pub mod webhooks;
