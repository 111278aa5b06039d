use std::sync::Arc;

use tracing::info;

use crate::domain::{DomainError, DomainResult, EventPublisher, User, UserEvent, UsersRepository};
use crate::infrastructure::crypto::PasswordHasher;

/// Fields left as `None` keep their current value
#[derive(Debug, Clone, Default)]
pub struct UpdateUserInput {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

pub struct UpdateUseCase {
    repo: Arc<dyn UsersRepository>,
    publisher: Arc<dyn EventPublisher>,
    hasher: PasswordHasher,
}

impl UpdateUseCase {
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

    pub async fn execute(&self, user_id: &str, input: UpdateUserInput) -> DomainResult<User> {
        let Some(mut user) = self.repo.find_by_id(user_id).await? else {
            return Err(DomainError::UserNotFound);
        };

        let profile_changed = input.name.is_some() || input.email.is_some();

        if let Some(email) = input.email {
            if let Some(owner) = self.repo.find_by_email(&email).await? {
                if owner.id != user.id {
                    return Err(DomainError::UserAlreadyExists);
                }
            }
            user.email = email;
        }

        if let Some(name) = input.name {
            user.name = name;
        }

        if let Some(password) = input.password {
            user.password_hash = self.hasher.hash(&password)?;
        }

        let user = self.repo.save(user).await?;

        info!(user_id = %user.id, profile_changed, "User updated");

        if profile_changed {
            self.publisher.publish(UserEvent::Updated(user.to_public()));
        }

        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::CreateUserDto;
    use crate::infrastructure::{InMemoryEventPublisher, InMemoryUsersRepository};

    struct Fixture {
        repo: Arc<InMemoryUsersRepository>,
        events: Arc<InMemoryEventPublisher>,
        hasher: PasswordHasher,
        sut: UpdateUseCase,
    }

    fn fixture() -> Fixture {
        let repo = Arc::new(InMemoryUsersRepository::new());
        let events = Arc::new(InMemoryEventPublisher::new());
        let hasher = PasswordHasher::new(4);
        let sut = UpdateUseCase::new(repo.clone(), events.clone(), hasher);
        Fixture {
            repo,
            events,
            hasher,
            sut,
        }
    }

    async fn seed(f: &Fixture, email: &str) -> User {
        f.repo
            .create(CreateUserDto {
                name: "John Doe".into(),
                email: email.into(),
                password_hash: f.hasher.hash("123456").unwrap(),
                role: None,
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn updates_name_only() {
        let f = fixture();
        let user = seed(&f, "johndoe@example.com").await;

        let updated = f
            .sut
            .execute(
                &user.id,
                UpdateUserInput {
                    name: Some("John Updated".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.name, "John Updated");
        assert_eq!(updated.email, user.email);
        assert_eq!(f.events.events(), vec![UserEvent::Updated(updated.to_public())]);
    }

    #[tokio::test]
    async fn updates_email_only() {
        let f = fixture();
        let user = seed(&f, "johndoe@example.com").await;

        let updated = f
            .sut
            .execute(
                &user.id,
                UpdateUserInput {
                    email: Some("updated@example.com".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.email, "updated@example.com");
        assert_eq!(updated.name, user.name);

        let stored = f.repo.find_by_id(&user.id).await.unwrap().unwrap();
        assert_eq!(stored.email, "updated@example.com");
    }

    #[tokio::test]
    async fn password_change_rehashes_and_stays_quiet() {
        let f = fixture();
        let user = seed(&f, "johndoe@example.com").await;

        let updated = f
            .sut
            .execute(
                &user.id,
                UpdateUserInput {
                    password: Some("newpassword".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert!(f.hasher.verify("newpassword", &updated.password_hash));
        assert!(!f.hasher.verify("123456", &updated.password_hash));
        assert!(f.events.is_empty());
    }

    #[tokio::test]
    async fn unknown_user_is_not_found() {
        let f = fixture();

        let err = f
            .sut
            .execute(
                "non-existing-id",
                UpdateUserInput {
                    name: Some("New Name".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(err, DomainError::UserNotFound));
    }

    #[tokio::test]
    async fn email_owned_by_someone_else_is_rejected() {
        let f = fixture();
        seed(&f, "taken@example.com").await;
        let user = seed(&f, "johndoe@example.com").await;

        let err = f
            .sut
            .execute(
                &user.id,
                UpdateUserInput {
                    email: Some("taken@example.com".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(err, DomainError::UserAlreadyExists));
        assert!(f.events.is_empty());
    }

    #[tokio::test]
    async fn resubmitting_own_email_is_allowed() {
        let f = fixture();
        let user = seed(&f, "johndoe@example.com").await;

        let updated = f
            .sut
            .execute(
                &user.id,
                UpdateUserInput {
                    email: Some("johndoe@example.com".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.email, "johndoe@example.com");
        assert_eq!(f.events.len(), 1);
    }
}
