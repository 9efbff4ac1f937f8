//! Request construction and dispatch
//!
//! - `id`: resource identifiers and path templates
//! - `query`: options-to-query flattening
//! - `options`: call options, caller overrides and prepared requests
//! - `dispatch`: the generic send-and-decode entry point

mod dispatch;
mod id;
mod options;
mod query;

pub use dispatch::{Many, NoContent, One, Raw, ResponseShape};
pub use id::{expand_path, path_escape, PathArg, ResourceId};
pub use options::{
    with_api_opts, with_method, with_path, with_request_opts, with_upload, DoConfig, DoOption,
    PreparedRequest, RequestBody, RequestOption, Upload, SUDO_HEADER,
};
pub use query::{encode_query, to_query_string, value_to_pairs};
