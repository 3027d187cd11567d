//! Data Transfer Objects for REST request/response serialization.
//!
//! Bodies use camelCase keys. Amounts are serialized as decimal strings;
//! requests accept either a string or a JSON number for them.

pub mod access_dto;
pub mod common_dto;
pub mod content_dto;
pub mod creator_dto;
pub mod payout_dto;
pub mod purchase_dto;

pub use access_dto::*;
pub use common_dto::*;
pub use content_dto::*;
pub use creator_dto::*;
pub use payout_dto::*;
pub use purchase_dto::*;
