use std::sync::Arc;

use tracing::{info, warn};

use crate::domain::{DomainError, DomainResult, EventPublisher, UserEvent, UserRole, UsersRepository};

/// The authenticated caller asking for the removal
#[derive(Debug, Clone)]
pub struct DropActor {
    pub id: String,
    pub role: UserRole,
}

impl DropActor {
    pub fn new(id: impl Into<String>, role: UserRole) -> Self {
        Self {
            id: id.into(),
            role,
        }
    }

    /// Members may only remove themselves; admins may remove anyone.
    pub fn may_drop(&self, user_id: &str) -> bool {
        self.role == UserRole::Admin || self.id == user_id
    }
}

pub struct DropUseCase {
    repo: Arc<dyn UsersRepository>,
    publisher: Arc<dyn EventPublisher>,
}

impl DropUseCase {
    pub fn new(repo: Arc<dyn UsersRepository>, publisher: Arc<dyn EventPublisher>) -> Self {
        Self { repo, publisher }
    }

    pub async fn execute(&self, user_id: &str, actor: &DropActor) -> DomainResult<()> {
        if !actor.may_drop(user_id) {
            warn!(user_id, actor_id = %actor.id, "Drop refused");
            return Err(DomainError::UserNotAllowed);
        }

        if self.repo.find_by_id(user_id).await?.is_none() {
            return Err(DomainError::UserNotFound);
        }

        self.repo.delete(user_id).await?;

        info!(user_id, actor_id = %actor.id, "User dropped");

        self.publisher.publish(UserEvent::dropped(user_id));

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CreateUserDto, User};
    use crate::infrastructure::{InMemoryEventPublisher, InMemoryUsersRepository};

    struct Fixture {
        repo: Arc<InMemoryUsersRepository>,
        events: Arc<InMemoryEventPublisher>,
        sut: DropUseCase,
    }

    fn fixture() -> Fixture {
        let repo = Arc::new(InMemoryUsersRepository::new());
        let events = Arc::new(InMemoryEventPublisher::new());
        let sut = DropUseCase::new(repo.clone(), events.clone());
        Fixture { repo, events, sut }
    }

    async fn seed(f: &Fixture, email: &str) -> User {
        f.repo
            .create(CreateUserDto {
                name: "John Doe".into(),
                email: email.into(),
                password_hash: "hash".into(),
                role: None,
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn drops_own_account() {
        let f = fixture();
        let user = seed(&f, "johndoe@example.com").await;
        let actor = DropActor::new(&user.id, UserRole::Member);

        f.sut.execute(&user.id, &actor).await.unwrap();

        assert!(f.repo.find_by_id(&user.id).await.unwrap().is_none());
        assert_eq!(f.events.events(), vec![UserEvent::dropped(&user.id)]);
    }

    #[tokio::test]
    async fn unknown_user_is_not_found() {
        let f = fixture();
        let actor = DropActor::new("admin", UserRole::Admin);

        let err = f.sut.execute("non-existing-id", &actor).await.unwrap_err();

        assert!(matches!(err, DomainError::UserNotFound));
        assert!(f.events.is_empty());
    }

    #[tokio::test]
    async fn member_cannot_drop_someone_else() {
        let f = fixture();
        let victim = seed(&f, "victim@example.com").await;
        let attacker = seed(&f, "attacker@example.com").await;
        let actor = DropActor::new(&attacker.id, UserRole::Member);

        let err = f.sut.execute(&victim.id, &actor).await.unwrap_err();

        assert!(matches!(err, DomainError::UserNotAllowed));
        assert!(f.repo.find_by_id(&victim.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn admin_can_drop_anyone() {
        let f = fixture();
        let user = seed(&f, "johndoe@example.com").await;
        let actor = DropActor::new("admin-id", UserRole::Admin);

        f.sut.execute(&user.id, &actor).await.unwrap();

        assert!(f.repo.is_empty());
    }
}
