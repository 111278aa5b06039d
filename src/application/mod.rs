//! Application layer - account use cases

pub mod use_cases;

pub use use_cases::{
    AuthenticateUseCase, DropActor, DropUseCase, GetUserProfileUseCase, RegisterUseCase,
    UpdateUseCase, UpdateUserInput, UseCaseFactory,
};
