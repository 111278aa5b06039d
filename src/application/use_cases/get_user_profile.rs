use std::sync::Arc;

use crate::domain::{DomainError, DomainResult, User, UsersRepository};

pub struct GetUserProfileUseCase {
    repo: Arc<dyn UsersRepository>,
}

impl GetUserProfileUseCase {
    pub fn new(repo: Arc<dyn UsersRepository>) -> Self {
        Self { repo }
    }

    pub async fn execute(&self, user_id: &str) -> DomainResult<User> {
        self.repo
            .find_by_id(user_id)
            .await?
            .ok_or(DomainError::ResourceNotFound)
    }
}
