//! Public types for the Loregate API.

mod category;
mod content;
mod request;
mod status;

pub use category::ContentCategory;
pub use content::Content;
pub use request::{GenerationRequest, ParamValue};
pub use status::GatewayStatus;
