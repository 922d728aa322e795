//! Home Aggregate Repositories

use mongodb::{Collection, Database, bson::doc};
use futures::TryStreamExt;

use crate::home::entity::{HardwareDevice, Home, Resident, Room};
use crate::shared::error::Result;

pub struct HomeRepository {
    collection: Collection<Home>,
}

impl HomeRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection("homes"),
        }
    }

    pub async fn insert(&self, home: &Home) -> Result<()> {
        self.collection.insert_one(home).await?;
        Ok(())
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<Home>> {
        Ok(self.collection.find_one(doc! { "_id": id }).await?)
    }

    pub async fn find_by_owner(&self, owner_id: &str) -> Result<Vec<Home>> {
        let cursor = self.collection
            .find(doc! { "ownerId": owner_id })
            .sort(doc! { "_id": 1 })
            .await?;
        Ok(cursor.try_collect().await?)
    }

    pub async fn update(&self, home: &Home) -> Result<()> {
        self.collection
            .replace_one(doc! { "_id": &home.id }, home)
            .await?;
        Ok(())
    }
}

pub struct RoomRepository {
    collection: Collection<Room>,
}

impl RoomRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection("rooms"),
        }
    }

    pub async fn insert(&self, room: &Room) -> Result<()> {
        self.collection.insert_one(room).await?;
        Ok(())
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<Room>> {
        Ok(self.collection.find_one(doc! { "_id": id }).await?)
    }

    pub async fn find_by_home(&self, home_id: &str) -> Result<Vec<Room>> {
        let cursor = self.collection
            .find(doc! { "homeId": home_id })
            .sort(doc! { "_id": 1 })
            .await?;
        Ok(cursor.try_collect().await?)
    }

    pub async fn exists_by_home_and_name(&self, home_id: &str, name: &str) -> Result<bool> {
        Ok(self
            .collection
            .count_documents(doc! { "homeId": home_id, "name": name })
            .await?
            > 0)
    }
}

pub struct ResidentRepository {
    collection: Collection<Resident>,
}

impl ResidentRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection("residents"),
        }
    }

    pub async fn insert(&self, resident: &Resident) -> Result<()> {
        self.collection.insert_one(resident).await?;
        Ok(())
    }

    pub async fn find_by_home(&self, home_id: &str) -> Result<Vec<Resident>> {
        let cursor = self.collection
            .find(doc! { "homeId": home_id })
            .sort(doc! { "_id": 1 })
            .await?;
        Ok(cursor.try_collect().await?)
    }

    pub async fn find_by_home_and_user(
        &self,
        home_id: &str,
        user_id: &str,
    ) -> Result<Option<Resident>> {
        Ok(self
            .collection
            .find_one(doc! { "homeId": home_id, "userId": user_id })
            .await?)
    }

    pub async fn find_by_user(&self, user_id: &str) -> Result<Vec<Resident>> {
        let cursor = self.collection
            .find(doc! { "userId": user_id })
            .sort(doc! { "_id": 1 })
            .await?;
        Ok(cursor.try_collect().await?)
    }

    pub async fn update(&self, resident: &Resident) -> Result<()> {
        self.collection
            .replace_one(doc! { "_id": &resident.id }, resident)
            .await?;
        Ok(())
    }
}

pub struct HardwareDeviceRepository {
    collection: Collection<HardwareDevice>,
}

impl HardwareDeviceRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection("hardware_devices"),
        }
    }

    pub async fn insert(&self, device: &HardwareDevice) -> Result<()> {
        self.collection.insert_one(device).await?;
        Ok(())
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<HardwareDevice>> {
        Ok(self.collection.find_one(doc! { "_id": id }).await?)
    }

    pub async fn find_by_home(&self, home_id: &str) -> Result<Vec<HardwareDevice>> {
        let cursor = self.collection
            .find(doc! { "homeId": home_id })
            .sort(doc! { "_id": 1 })
            .await?;
        Ok(cursor.try_collect().await?)
    }

    pub async fn update(&self, device: &HardwareDevice) -> Result<()> {
        self.collection
            .replace_one(doc! { "_id": &device.id }, device)
            .await?;
        Ok(())
    }
}
