//! # Demo Data
//!
//! The three hard-wired accounts `login` hands out and the sample rides an
//! empty store starts with.
//!
//! | id | name        | role     | balance    |
//! |----|-------------|----------|------------|
//! | 1  | John Doe    | rider    | R$100.00   |
//! | 2  | Jane Driver | driver   | R$500.00   |
//! | 3  | Admin User  | operator | R$1000.00  |

use chrono::{DateTime, Duration, Utc};

use crate::money::Money;
use crate::types::{Location, Principal, RideRecord, RideStatus, Role, VerificationCode};
use crate::DEFAULT_RIDER_PHONE;

/// Generated avatar for a display name.
pub fn avatar_url(name: &str) -> String {
    format!(
        "https://ui-avatars.com/api/?name={}&background=random",
        name.trim().replace(' ', "+")
    )
}

/// The demo account `login` returns for `role`.
pub fn demo_principal(role: Role) -> Principal {
    let (id, name, email, balance_cents) = match role {
        Role::Rider => ("1", "John Doe", "john@example.com", 10_000),
        Role::Driver => ("2", "Jane Driver", "jane@example.com", 50_000),
        Role::Operator => ("3", "Admin User", "admin@example.com", 100_000),
    };
    Principal {
        id: id.to_string(),
        name: name.to_string(),
        email: email.to_string(),
        role,
        avatar: Some(avatar_url(name)),
        account_balance_cents: Some(balance_cents),
    }
}

/// All demo accounts, by id.
pub fn demo_principals() -> Vec<Principal> {
    Role::ALL.iter().map(|&role| demo_principal(role)).collect()
}

/// Sample rides, timestamped relative to `now`.
///
/// 1. pending, Av. Paulista → Rua Augusta, 2.5 km
/// 2. completed by Jane Driver yesterday, 3.2 km
/// 3. accepted by Jane Driver two hours ago, 8.7 km
pub fn sample_rides(now: DateTime<Utc>) -> Vec<RideRecord> {
    let rider = demo_principal(Role::Rider);
    let driver = demo_principal(Role::Driver);

    let ride = |id: &str, pickup: Location, dropoff: Location, distance_km: f64, code: &'static str| {
        RideRecord {
            id: id.to_string(),
            rider_id: rider.id.clone(),
            rider_name: rider.name.clone(),
            rider_phone: Some(DEFAULT_RIDER_PHONE.to_string()),
            pickup,
            dropoff,
            distance_km,
            price_cents: Money::price_for_distance(distance_km).cents(),
            status: RideStatus::Pending,
            created_at: now,
            verification_code: VerificationCode::fixed(code),
            accepted_by: None,
            accepted_at: None,
            en_route_at: None,
            arrived_at: None,
            waiting_time_secs: None,
            in_progress_at: None,
            completed_at: None,
            cancelled_at: None,
            cancellation_fee_cents: None,
        }
    };

    let first = ride(
        "1",
        Location::new(-23.5505, -46.6333, "Av. Paulista, 1000 - São Paulo"),
        Location::new(-23.5608, -46.6500, "Rua Augusta, 500 - São Paulo"),
        2.5,
        "1234",
    );

    let mut second = ride(
        "2",
        Location::new(-23.5555, -46.6420, "Rua Oscar Freire, 300 - São Paulo"),
        Location::new(-23.5650, -46.6610, "Av. Rebouças, 1200 - São Paulo"),
        3.2,
        "5678",
    );
    second.status = RideStatus::Completed;
    second.created_at = now - Duration::hours(24);
    second.accepted_by = Some(driver.id.clone());
    second.accepted_at = Some(now - Duration::hours(23));
    second.completed_at = Some(now - Duration::hours(22));

    let mut third = ride(
        "3",
        Location::new(-23.5505, -46.6333, "Shopping Ibirapuera - São Paulo"),
        Location::new(-23.5800, -46.6700, "Aeroporto de Congonhas - São Paulo"),
        8.7,
        "4321",
    );
    third.status = RideStatus::Accepted;
    third.created_at = now - Duration::hours(2);
    third.accepted_by = Some(driver.id.clone());
    third.accepted_at = Some(now - Duration::hours(1));

    vec![first, second, third]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_demo_principals() {
        let all = demo_principals();
        let ids: Vec<_> = all.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, ["1", "2", "3"]);
        assert_eq!(all[2].balance(), Money::from_cents(100_000));
        assert_eq!(
            all[1].avatar.as_deref(),
            Some("https://ui-avatars.com/api/?name=Jane+Driver&background=random")
        );
    }

    #[test]
    fn test_sample_rides_are_consistent() {
        let now = Utc::now();
        let rides = sample_rides(now);

        assert_eq!(rides.len(), 3);
        let prices: Vec<_> = rides.iter().map(|r| r.price_cents).collect();
        assert_eq!(prices, [450, 576, 1566]);
        assert_eq!(rides[0].status, RideStatus::Pending);
        assert!(rides[1].is_assigned_to("2"));
        assert_eq!(rides[2].verification_code.as_str(), "4321");
        assert!(rides.iter().all(|r| r.created_at <= now));
    }
}
