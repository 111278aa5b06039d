//! In-memory users repository for development and testing

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;

use crate::domain::{CreateUserDto, DomainError, DomainResult, User, UsersRepository};

/// In-memory storage keyed by user id
#[derive(Default)]
pub struct InMemoryUsersRepository {
    users: DashMap<String, User>,
}

impl InMemoryUsersRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    fn email_taken_by_other(&self, email: &str, id: &str) -> bool {
        self.users
            .iter()
            .any(|entry| entry.email == email && entry.id != id)
    }
}

#[async_trait]
impl UsersRepository for InMemoryUsersRepository {
    async fn find_by_id(&self, id: &str) -> DomainResult<Option<User>> {
        Ok(self.users.get(id).map(|u| u.clone()))
    }

    async fn find_by_email(&self, email: &str) -> DomainResult<Option<User>> {
        Ok(self
            .users
            .iter()
            .find(|entry| entry.email == email)
            .map(|entry| entry.value().clone()))
    }

    async fn create(&self, dto: CreateUserDto) -> DomainResult<User> {
        let user = User {
            id: uuid::Uuid::new_v4().to_string(),
            name: dto.name,
            email: dto.email,
            password_hash: dto.password_hash,
            role: dto.role.unwrap_or_default(),
            created_at: Utc::now(),
        };

        // Mirrors the UNIQUE(email) constraint of the SQL schema
        if self.email_taken_by_other(&user.email, &user.id) {
            return Err(DomainError::UserAlreadyExists);
        }

        self.users.insert(user.id.clone(), user.clone());
        Ok(user)
    }

    async fn save(&self, user: User) -> DomainResult<User> {
        if !self.users.contains_key(&user.id) {
            return Err(DomainError::UserNotFound);
        }
        if self.email_taken_by_other(&user.email, &user.id) {
            return Err(DomainError::UserAlreadyExists);
        }

        self.users.insert(user.id.clone(), user.clone());
        Ok(user)
    }

    async fn delete(&self, id: &str) -> DomainResult<()> {
        self.users.remove(id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::UserRole;

    fn dto(email: &str) -> CreateUserDto {
        CreateUserDto {
            name: "John Doe".into(),
            email: email.into(),
            password_hash: "hashed_password".into(),
            role: None,
        }
    }

    #[tokio::test]
    async fn create_assigns_id_and_default_role() {
        let repo = InMemoryUsersRepository::new();
        let user = repo.create(dto("johndoe@example.com")).await.unwrap();

        assert!(!user.id.is_empty());
        assert_eq!(user.role, UserRole::Member);
        assert_eq!(repo.find_by_id(&user.id).await.unwrap(), Some(user.clone()));
        assert_eq!(
            repo.find_by_email("johndoe@example.com").await.unwrap(),
            Some(user)
        );
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected() {
        let repo = InMemoryUsersRepository::new();
        repo.create(dto("johndoe@example.com")).await.unwrap();

        let err = repo.create(dto("johndoe@example.com")).await.unwrap_err();
        assert!(matches!(err, DomainError::UserAlreadyExists));
        assert_eq!(repo.len(), 1);
    }

    #[tokio::test]
    async fn save_unknown_user_fails() {
        let repo = InMemoryUsersRepository::new();
        let mut user = repo.create(dto("johndoe@example.com")).await.unwrap();
        user.id = "missing".into();

        assert!(matches!(
            repo.save(user).await.unwrap_err(),
            DomainError::UserNotFound
        ));
    }

    #[tokio::test]
    async fn delete_removes_only_the_target() {
        let repo = InMemoryUsersRepository::new();
        let a = repo.create(dto("a@example.com")).await.unwrap();
        let b = repo.create(dto("b@example.com")).await.unwrap();

        repo.delete(&a.id).await.unwrap();
        repo.delete("non-existing-id").await.unwrap();

        assert!(repo.find_by_id(&a.id).await.unwrap().is_none());
        assert!(repo.find_by_id(&b.id).await.unwrap().is_some());
    }
}
