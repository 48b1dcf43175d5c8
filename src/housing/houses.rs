use std::sync::Arc;

use chrono::Datelike;

use crate::db::HouseStore;
use crate::types::{CreateHouseRequest, House, NewHouse, Result, ValidationError};
use crate::utils::clock::SharedClock;

pub struct HouseService {
    houses: Arc<dyn HouseStore>,
    clock: SharedClock,
}

impl HouseService {
    pub fn new(houses: Arc<dyn HouseStore>, clock: SharedClock) -> Self {
        Self { houses, clock }
    }

    /// Registers a new house. `created_at` and `updated_at` both start at now.
    pub async fn create_house(&self, request: CreateHouseRequest) -> Result<House> {
        let now = self.clock.utc();

        let address = request.address.trim();
        if address.is_empty() {
            return Err(ValidationError::InvalidHouse("address is required".to_string()).into());
        }
        if request.year < 1 || request.year > now.year() {
            return Err(ValidationError::InvalidHouse(format!(
                "year must be between 1 and {}",
                now.year()
            ))
            .into());
        }

        let new_house = NewHouse {
            address: address.to_string(),
            year: request.year,
            developer: request
                .developer
                .map(|d| d.trim().to_string())
                .filter(|d| !d.is_empty()),
        };

        let house = self.houses.create_house(&new_house, now).await?;
        tracing::info!(house_id = house.id, "house created");

        Ok(house)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::traits::MockHouseStore;
    use crate::db::MemoryStore;
    use crate::types::AppError;
    use crate::utils::clock::ManualClock;
    use chrono::{TimeZone, Utc};
    use rstest::rstest;

    fn create_test_service() -> HouseService {
        let clock = ManualClock::new(Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap());
        HouseService::new(Arc::new(MemoryStore::new()), Arc::new(clock))
    }

    fn request(address: &str, year: i32) -> CreateHouseRequest {
        CreateHouseRequest {
            address: address.to_string(),
            year,
            developer: Some("  Stroy  ".to_string()),
        }
    }

    #[tokio::test]
    async fn test_create_house() {
        let service = create_test_service();

        let house = service
            .create_house(request("  Lenina 1  ", 2000))
            .await
            .expect("should create");

        assert_eq!(house.address, "Lenina 1");
        assert_eq!(house.developer.as_deref(), Some("Stroy"));
        assert_eq!(house.created_at, house.updated_at);
    }

    #[rstest]
    #[case("", 2000)]
    #[case("   ", 2000)]
    #[case("Lenina 1", 0)]
    #[case("Lenina 1", 2025)]
    #[tokio::test]
    async fn test_create_house_rejects_bad_input(#[case] address: &str, #[case] year: i32) {
        let mut store = MockHouseStore::new();
        store.expect_create_house().never();
        let service = HouseService::new(
            Arc::new(store),
            Arc::new(ManualClock::new(
                Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap(),
            )),
        );

        assert!(matches!(
            service.create_house(request(address, year)).await,
            Err(AppError::Validation(ValidationError::InvalidHouse(_)))
        ));
    }

    #[tokio::test]
    async fn test_duplicate_address_conflicts() {
        let service = create_test_service();
        service
            .create_house(request("Lenina 1", 2000))
            .await
            .expect("first");

        assert!(matches!(
            service.create_house(request("Lenina 1", 1990)).await,
            Err(AppError::Conflict(_))
        ));
    }
}
