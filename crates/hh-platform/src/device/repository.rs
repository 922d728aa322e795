//! Device Repository

use mongodb::{Collection, Database, bson::doc, bson::Document};
use futures::TryStreamExt;
use crate::device::entity::{Device, DeviceKind};
use crate::shared::error::Result;

pub struct DeviceRepository {
    collection: Collection<Device>,
}

impl DeviceRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection("devices"),
        }
    }

    pub async fn insert(&self, device: &Device) -> Result<()> {
        self.collection.insert_one(device).await?;
        Ok(())
    }

    pub async fn insert_many(&self, devices: &[Device]) -> Result<()> {
        if devices.is_empty() {
            return Ok(());
        }
        self.collection.insert_many(devices).await?;
        Ok(())
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<Device>> {
        Ok(self.collection.find_one(doc! { "_id": id }).await?)
    }

    fn search_filter(
        name: Option<&str>,
        model: Option<&str>,
        company_id: Option<&str>,
        kind: Option<DeviceKind>,
    ) -> Document {
        let mut filter = doc! {};
        if let Some(name) = name {
            filter.insert("name", doc! { "$regex": regex::escape(name), "$options": "i" });
        }
        if let Some(model) = model {
            filter.insert("model", doc! { "$regex": regex::escape(model), "$options": "i" });
        }
        if let Some(company_id) = company_id {
            filter.insert("companyId", company_id);
        }
        if let Some(kind) = kind {
            filter.insert("kind", kind.as_str());
        }
        filter
    }

    pub async fn search(
        &self,
        name: Option<&str>,
        model: Option<&str>,
        company_id: Option<&str>,
        kind: Option<DeviceKind>,
        skip: u64,
        limit: i64,
    ) -> Result<Vec<Device>> {
        let cursor = self.collection
            .find(Self::search_filter(name, model, company_id, kind))
            .sort(doc! { "_id": 1 })
            .skip(skip)
            .limit(limit)
            .await?;
        Ok(cursor.try_collect().await?)
    }

    pub async fn count_with_filters(
        &self,
        name: Option<&str>,
        model: Option<&str>,
        company_id: Option<&str>,
        kind: Option<DeviceKind>,
    ) -> Result<u64> {
        Ok(self
            .collection
            .count_documents(Self::search_filter(name, model, company_id, kind))
            .await?)
    }
}
