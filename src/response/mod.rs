//! Response envelope
//!
//! Every dispatched call returns a [`Response`] alongside its decoded value.
//! It carries the status, raw headers, and the pagination and rate-limit
//! metadata GitLab reports in response headers.

mod types;

pub use types::{parse_link_header, Pagination, RateLimit, Response};

#[cfg(test)]
mod tests;
