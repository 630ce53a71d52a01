pub mod contact;
pub mod status;
pub mod timestamp;

pub use contact::{ContactDocument, ContactFormRequest, ContactSubmission};
pub use status::{StatusCheck, StatusCheckDocument, StatusCheckRequest};
