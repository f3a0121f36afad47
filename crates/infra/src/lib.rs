//! Infrastructure layer: access request storage, role grants and the review
//! pipeline that ties the approval workflow to a store.

pub mod review;
pub mod seed;
pub mod store;

pub use review::{ReviewError, ReviewService};
pub use store::{AccessRequestStore, InMemoryAccessRequestStore, RoleGrantDirectory, StoreError};
