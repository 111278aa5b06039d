//! Wires use cases to their shared dependencies

use std::sync::Arc;

use crate::domain::{EventPublisher, UsersRepository};
use crate::infrastructure::crypto::PasswordHasher;

use super::{
    AuthenticateUseCase, DropUseCase, GetUserProfileUseCase, RegisterUseCase, UpdateUseCase,
};

#[derive(Clone)]
pub struct UseCaseFactory {
    repo: Arc<dyn UsersRepository>,
    publisher: Arc<dyn EventPublisher>,
    hasher: PasswordHasher,
}

impl UseCaseFactory {
    pub fn new(
        repo: Arc<dyn UsersRepository>,
        publisher: Arc<dyn EventPublisher>,
        hasher: PasswordHasher,
    ) -> Self {
        Self {
            repo,
            publisher,
            hasher,
        }
    }

    pub fn repository(&self) -> Arc<dyn UsersRepository> {
        self.repo.clone()
    }

    pub fn register(&self) -> RegisterUseCase {
        RegisterUseCase::new(self.repo.clone(), self.publisher.clone(), self.hasher)
    }

    pub fn authenticate(&self) -> AuthenticateUseCase {
        AuthenticateUseCase::new(self.repo.clone(), self.hasher)
    }

    pub fn get_user_profile(&self) -> GetUserProfileUseCase {
        GetUserProfileUseCase::new(self.repo.clone())
    }

    pub fn update(&self) -> UpdateUseCase {
        UpdateUseCase::new(self.repo.clone(), self.publisher.clone(), self.hasher)
    }

    pub fn drop_user(&self) -> DropUseCase {
        DropUseCase::new(self.repo.clone(), self.publisher.clone())
    }
}
