//! Account use cases
//!
//! Each use case takes its collaborators through the constructor and
//! exposes a single `execute`. HTTP handlers obtain them from
//! [`UseCaseFactory`].

pub mod authenticate;
pub mod drop;
pub mod factory;
pub mod get_user_profile;
pub mod register;
pub mod update;

pub use authenticate::AuthenticateUseCase;
pub use drop::{DropActor, DropUseCase};
pub use factory::UseCaseFactory;
pub use get_user_profile::GetUserProfileUseCase;
pub use register::RegisterUseCase;
pub use update::{UpdateUseCase, UpdateUserInput};
