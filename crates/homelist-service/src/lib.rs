//! # homelist-service
//!
//! Business logic service layer for HomeList. Each service orchestrates
//! repositories and the credential machinery to implement one group of
//! application use cases.
//!
//! Services follow constructor injection: all dependencies are provided
//! at construction time, usually through [`Services::build`].

pub mod auth;
pub mod context;
pub mod home;
pub mod invitation;
pub mod services;
pub mod session;
pub mod user;

pub use auth::{AuthResult, AuthService, Authenticator, LoginRequest, RegisterRequest, TokenRevoker};
pub use context::RequestContext;
pub use home::{CreateHomeRequest, HomeService, UpdateHomeRequest};
pub use invitation::{InvitationService, InvitationView, InviteRequest, RespondOutcome};
pub use services::Services;
pub use session::SessionService;
pub use user::{UpdateProfileRequest, UserService};
