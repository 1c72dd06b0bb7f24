//! Data stores
//!
//! Fetch + cache + refetch wrappers around the API client. Each store
//! exposes a (data, loading, error) view of its last query; errors are
//! user-displayable strings and never cross the store boundary as
//! panics or raw results. Only the most recently initiated fetch may
//! update state.

mod ask;
mod list;

pub use ask::AskStore;
pub use list::{InterviewsStore, ListCore, ListState, ThemesStore};
