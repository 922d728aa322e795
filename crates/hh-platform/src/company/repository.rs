//! Company Repository

use mongodb::{Collection, Database, bson::doc, bson::Document};
use futures::TryStreamExt;
use crate::company::entity::Company;
use crate::shared::error::Result;

pub struct CompanyRepository {
    collection: Collection<Company>,
}

impl CompanyRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection("companies"),
        }
    }

    pub async fn insert(&self, company: &Company) -> Result<()> {
        self.collection.insert_one(company).await?;
        Ok(())
    }

    pub async fn find_by_owner(&self, owner_id: &str) -> Result<Option<Company>> {
        Ok(self.collection.find_one(doc! { "ownerId": owner_id }).await?)
    }

    pub async fn exists_by_name(&self, name: &str) -> Result<bool> {
        Ok(self.collection.count_documents(doc! { "name": name }).await? > 0)
    }

    pub async fn exists_by_logo(&self, logo_url: &str) -> Result<bool> {
        Ok(self.collection.count_documents(doc! { "logoUrl": logo_url }).await? > 0)
    }

    pub async fn exists_by_rut(&self, rut: &str) -> Result<bool> {
        Ok(self.collection.count_documents(doc! { "rut": rut }).await? > 0)
    }

    fn search_filter(name: Option<&str>, owner_name: Option<&str>) -> Document {
        let mut filter = doc! {};
        if let Some(name) = name {
            filter.insert("name", doc! { "$regex": regex::escape(name), "$options": "i" });
        }
        if let Some(owner) = owner_name {
            filter.insert("ownerName", doc! { "$regex": regex::escape(owner), "$options": "i" });
        }
        filter
    }

    pub async fn search(
        &self,
        name: Option<&str>,
        owner_name: Option<&str>,
        skip: u64,
        limit: i64,
    ) -> Result<Vec<Company>> {
        let cursor = self.collection
            .find(Self::search_filter(name, owner_name))
            .sort(doc! { "_id": 1 })
            .skip(skip)
            .limit(limit)
            .await?;
        Ok(cursor.try_collect().await?)
    }

    pub async fn count_with_filters(
        &self,
        name: Option<&str>,
        owner_name: Option<&str>,
    ) -> Result<u64> {
        Ok(self.collection.count_documents(Self::search_filter(name, owner_name)).await?)
    }
}
