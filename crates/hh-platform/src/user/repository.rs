//! User Repository

use mongodb::{Collection, Database, bson::doc, bson::Document};
use futures::TryStreamExt;
use crate::user::entity::User;
use crate::shared::error::Result;

pub struct UserRepository {
    collection: Collection<User>,
}

impl UserRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection("users"),
        }
    }

    pub async fn insert(&self, user: &User) -> Result<()> {
        self.collection.insert_one(user).await?;
        Ok(())
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<User>> {
        Ok(self.collection.find_one(doc! { "_id": id }).await?)
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        Ok(self.collection.find_one(doc! { "email": email }).await?)
    }

    pub async fn exists_by_email(&self, email: &str) -> Result<bool> {
        let count = self.collection.count_documents(doc! { "email": email }).await?;
        Ok(count > 0)
    }

    fn search_filter(full_name: Option<&str>, role: Option<&str>) -> Document {
        let mut filter = doc! {};
        if let Some(name) = full_name {
            // Full name is stored split; match the pattern against either part
            let pattern = regex::escape(name);
            filter.insert("$or", vec![
                doc! { "firstName": { "$regex": &pattern, "$options": "i" } },
                doc! { "lastName": { "$regex": &pattern, "$options": "i" } },
            ]);
        }
        if let Some(role) = role {
            filter.insert("roles", role);
        }
        filter
    }

    /// Paginated search with independently optional filters
    pub async fn search(
        &self,
        full_name: Option<&str>,
        role: Option<&str>,
        skip: u64,
        limit: i64,
    ) -> Result<Vec<User>> {
        let filter = Self::search_filter(full_name, role);
        let cursor = self.collection
            .find(filter)
            .sort(doc! { "_id": 1 })
            .skip(skip)
            .limit(limit)
            .await?;
        Ok(cursor.try_collect().await?)
    }

    pub async fn count_with_filters(
        &self,
        full_name: Option<&str>,
        role: Option<&str>,
    ) -> Result<u64> {
        let filter = Self::search_filter(full_name, role);
        Ok(self.collection.count_documents(filter).await?)
    }

    pub async fn update(&self, user: &User) -> Result<()> {
        self.collection
            .replace_one(doc! { "_id": &user.id }, user)
            .await?;
        Ok(())
    }

    pub async fn delete(&self, id: &str) -> Result<bool> {
        let result = self.collection.delete_one(doc! { "_id": id }).await?;
        Ok(result.deleted_count > 0)
    }
}
