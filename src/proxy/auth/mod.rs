// Auth module - NetSuite Authorization header negotiation

pub mod oauth1;
pub mod schemes;
pub mod selector;

pub use oauth1::{OAuthNonce, SignatureMethod};
pub use schemes::AuthSchemeKind;
pub use selector::{AuthSelector, SchemeFailure, SelectedAuth};
