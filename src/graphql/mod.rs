pub mod mutation;
pub mod query;
pub mod schema;
pub mod types;

pub use mutation::*;
pub use query::*;
pub use schema::*;
pub use types::*;

use async_graphql::{Error, ErrorExtensions};

use crate::error::AppError;

/// Map a service error to a GraphQL error carrying the `code` extension.
pub(crate) fn failed(action: &'static str) -> impl FnOnce(AppError) -> Error {
    move |e| {
        let code = e.code();
        Error::new(format!("Failed to {}: {}", action, e)).extend_with(|_, ext| ext.set("code", code))
    }
}
