//! Session Repository

use mongodb::{Collection, Database, bson::doc};

use crate::auth::session::Session;
use crate::shared::error::Result;

pub struct SessionRepository {
    collection: Collection<Session>,
}

impl SessionRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection("sessions"),
        }
    }

    pub async fn insert(&self, session: &Session) -> Result<()> {
        self.collection.insert_one(session).await?;
        Ok(())
    }

    pub async fn find_by_token(&self, token: &str) -> Result<Option<Session>> {
        Ok(self.collection.find_one(doc! { "_id": token }).await?)
    }

    pub async fn delete_by_token(&self, token: &str) -> Result<bool> {
        let result = self.collection.delete_one(doc! { "_id": token }).await?;
        Ok(result.deleted_count > 0)
    }

}
