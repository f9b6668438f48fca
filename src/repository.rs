use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::domain::order::{AppStatus, Order, OrderError};

// ============================================================================
// Order Repository
// ============================================================================
//
// Injected persistence seam. The orchestration core takes an Order value,
// transforms it, and hands it back here - it never touches shared mutable
// state directly, which keeps every engine operation unit-testable.
//
// ============================================================================

#[async_trait]
pub trait OrderRepository: Send + Sync {
    async fn get(&self, id: &str) -> anyhow::Result<Option<Order>>;

    /// All orders except archived ones (the default operator view).
    async fn list_active(&self) -> anyhow::Result<Vec<Order>>;

    /// Every order, archived included.
    async fn list_all(&self) -> anyhow::Result<Vec<Order>>;

    async fn insert(&self, order: Order) -> anyhow::Result<()>;

    /// Persist a transformed order. Fails for unknown ids.
    async fn save(&self, order: Order) -> anyhow::Result<()>;
}

#[derive(Default)]
pub struct InMemoryOrderRepository {
    orders: RwLock<HashMap<String, Order>>,
}

impl InMemoryOrderRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl OrderRepository for InMemoryOrderRepository {
    async fn get(&self, id: &str) -> anyhow::Result<Option<Order>> {
        let orders = self.orders.read().await;
        Ok(orders.get(id).cloned())
    }

    async fn list_active(&self) -> anyhow::Result<Vec<Order>> {
        let orders = self.orders.read().await;
        let mut active: Vec<Order> = orders
            .values()
            .filter(|o| o.app_status != AppStatus::Archived)
            .cloned()
            .collect();
        active.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(active)
    }

    async fn list_all(&self) -> anyhow::Result<Vec<Order>> {
        let orders = self.orders.read().await;
        let mut all: Vec<Order> = orders.values().cloned().collect();
        all.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(all)
    }

    async fn insert(&self, order: Order) -> anyhow::Result<()> {
        let mut orders = self.orders.write().await;
        orders.insert(order.id.clone(), order);
        Ok(())
    }

    async fn save(&self, order: Order) -> anyhow::Result<()> {
        let mut orders = self.orders.write().await;
        if !orders.contains_key(&order.id) {
            return Err(OrderError::NotFound(order.id.clone()).into());
        }
        orders.insert(order.id.clone(), order);
        Ok(())
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::order::testing;

    #[tokio::test]
    async fn test_insert_get_save_round_trip() {
        let repo = InMemoryOrderRepository::new();
        repo.insert(testing::order("ORD001")).await.unwrap();

        let mut loaded = repo.get("ORD001").await.unwrap().unwrap();
        loaded.app_status = AppStatus::Processing;
        repo.save(loaded).await.unwrap();

        let reloaded = repo.get("ORD001").await.unwrap().unwrap();
        assert_eq!(reloaded.app_status, AppStatus::Processing);
    }

    #[tokio::test]
    async fn test_save_unknown_order_fails() {
        let repo = InMemoryOrderRepository::new();
        let result = repo.save(testing::order("ORD404")).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_active_listing_excludes_archived() {
        let repo = InMemoryOrderRepository::new();
        repo.insert(testing::order("ORD001")).await.unwrap();

        let mut archived = testing::order("ORD002");
        archived.app_status = AppStatus::Archived;
        repo.insert(archived).await.unwrap();

        let active = repo.list_active().await.unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].id, "ORD001");

        let all = repo.list_all().await.unwrap();
        assert_eq!(all.len(), 2);
    }
}
