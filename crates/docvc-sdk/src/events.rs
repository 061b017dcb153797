use docvc_types::Hash;
use serde::{Deserialize, Serialize};

/// Delivered to repository subscribers after every successful mutating
/// operation, carrying the commit checked out once it completed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeadEvent {
    pub head: Hash,
}
