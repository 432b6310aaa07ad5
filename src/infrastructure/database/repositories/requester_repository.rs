//! SeaORM implementation of RequesterRepository

use async_trait::async_trait;
use log::debug;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, PaginatorTrait, Set};

use super::db_err;
use crate::domain::requester::{Requester, RequesterRepository};
use crate::domain::DomainResult;
use crate::infrastructure::database::entities::requester;

pub struct SeaOrmRequesterRepository {
    db: DatabaseConnection,
}

impl SeaOrmRequesterRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn model_to_domain(m: requester::Model) -> Requester {
    Requester {
        id: m.id,
        email: m.email,
        display_name: m.display_name,
        created_at: m.created_at,
    }
}

#[async_trait]
impl RequesterRepository for SeaOrmRequesterRepository {
    async fn exists(&self, id: i32) -> DomainResult<bool> {
        Ok(self.find_by_id(id).await?.is_some())
    }

    async fn find_by_id(&self, id: i32) -> DomainResult<Option<Requester>> {
        let model = requester::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?;
        Ok(model.map(model_to_domain))
    }

    async fn save(&self, r: Requester) -> DomainResult<()> {
        debug!("Saving requester: {}", r.id);
        let model = requester::ActiveModel {
            id: Set(r.id),
            email: Set(r.email),
            display_name: Set(r.display_name),
            created_at: Set(r.created_at),
        };
        model.insert(&self.db).await.map_err(db_err)?;
        Ok(())
    }

    async fn count(&self) -> DomainResult<u64> {
        requester::Entity::find()
            .count(&self.db)
            .await
            .map_err(db_err)
    }
}
