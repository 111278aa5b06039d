use std::sync::Arc;

use tracing::info;

use crate::domain::{
    CreateUserDto, DomainError, DomainResult, EventPublisher, User, UserEvent, UserRole,
    UsersRepository,
};
use crate::infrastructure::crypto::PasswordHasher;

pub struct RegisterUseCase {
    repo: Arc<dyn UsersRepository>,
    publisher: Arc<dyn EventPublisher>,
    hasher: PasswordHasher,
}

impl RegisterUseCase {
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

    pub async fn execute(&self, name: &str, email: &str, password: &str) -> DomainResult<User> {
        if self.repo.find_by_email(email).await?.is_some() {
            return Err(DomainError::UserAlreadyExists);
        }

        let password_hash = self.hasher.hash(password)?;

        let user = self
            .repo
            .create(CreateUserDto {
                name: name.to_string(),
                email: email.to_string(),
                password_hash,
                role: Some(UserRole::Member),
            })
            .await?;

        info!(user_id = %user.id, "User registered");

        self.publisher.publish(UserEvent::Created(user.to_public()));

        Ok(user)
    }
}
