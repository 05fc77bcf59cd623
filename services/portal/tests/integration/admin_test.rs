use chrono::{Duration, Utc};

use skateleague_domain::registration::RegistrationStatus;
use skateleague_domain::user::UserRole;
use skateleague_portal::domain::types::{Registration, UserProfile};
use skateleague_portal::error::PortalError;
use skateleague_portal::usecase::league::ListLeagueRegistrantsUseCase;

use crate::helpers::*;

fn admin() -> UserProfile {
    UserProfile {
        role: UserRole::Admin,
        ..complete_profile("A1")
    }
}

fn listing(
    profiles: Vec<UserProfile>,
    registrations: Vec<Registration>,
) -> ListLeagueRegistrantsUseCase<MockProfileRepo, MockLeagueRepo, MockRegistrationRepo> {
    ListLeagueRegistrantsUseCase {
        profiles: MockProfileRepo::new(profiles),
        leagues: MockLeagueRepo::new(vec![spring_open()]),
        registrations: MockRegistrationRepo::new(registrations),
    }
}

#[tokio::test]
async fn should_list_registrants_with_profile_and_status() {
    let now = Utc::now();
    let mut approved = Registration::pending(league_id("L1"), identity("U1").user_id, now);
    approved.status = RegistrationStatus::Approved;
    let pending = Registration::pending(
        league_id("L1"),
        identity("U2").user_id,
        now + Duration::minutes(5),
    );
    let elsewhere = Registration::pending(league_id("L2"), identity("U3").user_id, now);
    let usecase = listing(
        vec![admin(), complete_profile("U1"), complete_profile("U2")],
        vec![approved.clone(), pending.clone(), elsewhere],
    );

    let registrants = usecase
        .execute(&identity("A1").user_id, &league_id("L1"))
        .await
        .unwrap();

    assert_eq!(registrants.len(), 2);
    assert_eq!(registrants[0].registration, approved);
    assert_eq!(
        registrants[0].profile.as_ref().and_then(|p| p.name.as_deref()),
        Some("Kim")
    );
    assert_eq!(registrants[1].registration.status, RegistrationStatus::Pending);
    assert_eq!(
        registrants[1].profile.as_ref().map(|p| p.id.clone()),
        Some(identity("U2").user_id)
    );
}

#[tokio::test]
async fn should_keep_registration_whose_profile_is_missing() {
    let orphan = Registration::pending(league_id("L1"), identity("U9").user_id, Utc::now());
    let usecase = listing(vec![admin()], vec![orphan.clone()]);

    let registrants = usecase
        .execute(&identity("A1").user_id, &league_id("L1"))
        .await
        .unwrap();

    assert_eq!(registrants.len(), 1);
    assert_eq!(registrants[0].registration, orphan);
    assert!(registrants[0].profile.is_none());
}

#[tokio::test]
async fn should_refuse_registrant_listing_to_non_admin() {
    let usecase = listing(vec![complete_profile("U1")], vec![]);

    let result = usecase
        .execute(&identity("U1").user_id, &league_id("L1"))
        .await;

    assert!(matches!(result, Err(PortalError::Forbidden)));
}

#[tokio::test]
async fn should_report_unknown_league_to_admin() {
    let usecase = listing(vec![admin()], vec![]);

    let result = usecase
        .execute(&identity("A1").user_id, &league_id("L404"))
        .await;

    assert!(matches!(result, Err(PortalError::LeagueNotFound)));
}
