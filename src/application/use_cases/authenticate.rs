use std::sync::Arc;

use tracing::{info, warn};

use crate::domain::{DomainError, DomainResult, User, UsersRepository};
use crate::infrastructure::crypto::PasswordHasher;

pub struct AuthenticateUseCase {
    repo: Arc<dyn UsersRepository>,
    hasher: PasswordHasher,
}

impl AuthenticateUseCase {
    pub fn new(repo: Arc<dyn UsersRepository>, hasher: PasswordHasher) -> Self {
        Self { repo, hasher }
    }

    /// Unknown email and wrong password fail the same way.
    pub async fn execute(&self, email: &str, password: &str) -> DomainResult<User> {
        let Some(user) = self.repo.find_by_email(email).await? else {
            warn!("Authentication failed: unknown email");
            return Err(DomainError::InvalidCredentials);
        };

        if !self.hasher.verify(password, &user.password_hash) {
            warn!(user_id = %user.id, "Authentication failed: wrong password");
            return Err(DomainError::InvalidCredentials);
        }

        info!(user_id = %user.id, "User authenticated");
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::CreateUserDto;
    use crate::infrastructure::InMemoryUsersRepository;

    async fn setup() -> (AuthenticateUseCase, User) {
        let repo = Arc::new(InMemoryUsersRepository::new());
        let hasher = PasswordHasher::new(4);
        let user = repo
            .create(CreateUserDto {
                name: "John Doe".into(),
                email: "johndoe@example.com".into(),
                password_hash: hasher.hash("123456").unwrap(),
                role: None,
            })
            .await
            .unwrap();
        (AuthenticateUseCase::new(repo, hasher), user)
    }

    #[tokio::test]
    async fn authenticates_with_correct_password() {
        let (sut, user) = setup().await;

        let authenticated = sut.execute("johndoe@example.com", "123456").await.unwrap();
        assert_eq!(authenticated.id, user.id);
    }

    #[tokio::test]
    async fn wrong_email_is_invalid_credentials() {
        let (sut, _) = setup().await;

        let err = sut.execute("nobody@example.com", "123456").await.unwrap_err();
        assert!(matches!(err, DomainError::InvalidCredentials));
    }

    #[tokio::test]
    async fn wrong_password_is_invalid_credentials() {
        let (sut, _) = setup().await;

        let err = sut.execute("johndoe@example.com", "654321").await.unwrap_err();
        assert!(matches!(err, DomainError::InvalidCredentials));
    }
}
