use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
};

use crate::domain::{CreateUserDto, DomainError, DomainResult, User, UserRole, UsersRepository};
use crate::infrastructure::database::entities::user;

pub struct SeaOrmUsersRepository {
    db: DatabaseConnection,
}

impl SeaOrmUsersRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

// ── Conversion helpers ──────────────────────────────────────────

fn entity_role_to_domain(role: user::UserRole) -> UserRole {
    match role {
        user::UserRole::Admin => UserRole::Admin,
        user::UserRole::Member => UserRole::Member,
    }
}

fn domain_role_to_entity(role: UserRole) -> user::UserRole {
    match role {
        UserRole::Admin => user::UserRole::Admin,
        UserRole::Member => user::UserRole::Member,
    }
}

fn user_model_to_domain(model: user::Model) -> User {
    User {
        id: model.id,
        name: model.name,
        email: model.email,
        password_hash: model.password_hash,
        role: entity_role_to_domain(model.role),
        created_at: model.created_at,
    }
}

fn db_err(e: sea_orm::DbErr) -> DomainError {
    DomainError::Storage(format!("Database error: {}", e))
}

fn is_unique_violation(e: &sea_orm::DbErr) -> bool {
    let msg = e.to_string();
    msg.contains("UNIQUE") || msg.contains("duplicate")
}

fn write_err(e: sea_orm::DbErr) -> DomainError {
    if is_unique_violation(&e) {
        DomainError::UserAlreadyExists
    } else {
        db_err(e)
    }
}

// ── Repository implementation ───────────────────────────────────

#[async_trait]
impl UsersRepository for SeaOrmUsersRepository {
    async fn find_by_id(&self, id: &str) -> DomainResult<Option<User>> {
        let model = user::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?;

        Ok(model.map(user_model_to_domain))
    }

    async fn find_by_email(&self, email: &str) -> DomainResult<Option<User>> {
        let model = user::Entity::find()
            .filter(user::Column::Email.eq(email))
            .one(&self.db)
            .await
            .map_err(db_err)?;

        Ok(model.map(user_model_to_domain))
    }

    async fn create(&self, dto: CreateUserDto) -> DomainResult<User> {
        let new_user = user::ActiveModel {
            id: Set(uuid::Uuid::new_v4().to_string()),
            name: Set(dto.name),
            email: Set(dto.email),
            password_hash: Set(dto.password_hash),
            role: Set(domain_role_to_entity(dto.role.unwrap_or_default())),
            created_at: Set(Utc::now()),
        };

        let model = new_user.insert(&self.db).await.map_err(write_err)?;

        Ok(user_model_to_domain(model))
    }

    async fn save(&self, u: User) -> DomainResult<User> {
        let existing = user::Entity::find_by_id(&u.id)
            .one(&self.db)
            .await
            .map_err(db_err)?;

        let Some(existing) = existing else {
            return Err(DomainError::UserNotFound);
        };

        let mut active: user::ActiveModel = existing.into();
        active.name = Set(u.name);
        active.email = Set(u.email);
        active.password_hash = Set(u.password_hash);
        active.role = Set(domain_role_to_entity(u.role));

        let updated = active.update(&self.db).await.map_err(write_err)?;

        Ok(user_model_to_domain(updated))
    }

    async fn delete(&self, id: &str) -> DomainResult<()> {
        let result = user::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(db_err)?;

        if result.rows_affected == 0 {
            return Err(DomainError::UserNotFound);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::database::{init_database, DatabaseConfig};
    use crate::infrastructure::database::migrator::Migrator;
    use sea_orm_migration::MigratorTrait;

    async fn repo() -> SeaOrmUsersRepository {
        let db = init_database(&DatabaseConfig::in_memory_sqlite())
            .await
            .expect("sqlite connection");
        Migrator::up(&db, None).await.expect("migrations");
        SeaOrmUsersRepository::new(db)
    }

    fn dto(name: &str, email: &str) -> CreateUserDto {
        CreateUserDto {
            name: name.into(),
            email: email.into(),
            password_hash: "hashed_password".into(),
            role: None,
        }
    }

    #[tokio::test]
    async fn create_and_find_user() {
        let repo = repo().await;
        let created = repo.create(dto("John Doe", "johndoe@example.com")).await.unwrap();

        assert_eq!(created.role, UserRole::Member);

        let by_id = repo.find_by_id(&created.id).await.unwrap().unwrap();
        assert_eq!(by_id.email, "johndoe@example.com");

        let by_email = repo.find_by_email("johndoe@example.com").await.unwrap().unwrap();
        assert_eq!(by_email.id, created.id);

        assert!(repo.find_by_email("nobody@example.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn unique_email_maps_to_already_exists() {
        let repo = repo().await;
        repo.create(dto("John Doe", "johndoe@example.com")).await.unwrap();

        let err = repo
            .create(dto("Jane Doe", "johndoe@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::UserAlreadyExists));
    }

    #[tokio::test]
    async fn save_overwrites_fields() {
        let repo = repo().await;
        let mut user = repo.create(dto("John Doe", "johndoe@example.com")).await.unwrap();

        user.name = "John Updated".into();
        user.role = UserRole::Admin;
        let saved = repo.save(user.clone()).await.unwrap();

        assert_eq!(saved.name, "John Updated");
        let reloaded = repo.find_by_id(&user.id).await.unwrap().unwrap();
        assert_eq!(reloaded.name, "John Updated");
        assert_eq!(reloaded.role, UserRole::Admin);
    }

    #[tokio::test]
    async fn delete_missing_user_is_not_found() {
        let repo = repo().await;
        let user = repo.create(dto("John Doe", "johndoe@example.com")).await.unwrap();

        repo.delete(&user.id).await.unwrap();
        assert!(repo.find_by_id(&user.id).await.unwrap().is_none());

        assert!(matches!(
            repo.delete(&user.id).await.unwrap_err(),
            DomainError::UserNotFound
        ));
    }
}
