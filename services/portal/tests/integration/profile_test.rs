use bytes::Bytes;
use chrono::NaiveDate;

use skateleague_domain::registration::RegistrationStatus;
use skateleague_portal::domain::types::{FieldPatch, PictureUpload};
use skateleague_portal::domain::workflow::{Outcome, RedirectTarget};
use skateleague_portal::error::PortalError;
use skateleague_portal::usecase::profile::{
    CompleteProfileInput, CompleteProfileUseCase, GetProfileFormUseCase,
    RemoveProfilePictureUseCase,
};
use skateleague_portal::usecase::registration::{
    LoadRegistrationUseCase, SubmitRegistrationUseCase,
};
use skateleague_portal::usecase::session::ProvisionProfileUseCase;

use crate::helpers::*;

fn kim(continuation: Option<&str>) -> CompleteProfileInput {
    CompleteProfileInput {
        name: Some("Kim".into()),
        date_of_birth: Some("2012-04-01".into()),
        continuation: continuation.map(league_id),
        ..Default::default()
    }
}

fn png() -> PictureUpload {
    PictureUpload {
        file_name: "kim.png".into(),
        content_type: Some("image/png".into()),
        bytes: Bytes::from_static(b"\x89PNG\r\n"),
    }
}

// ── CompleteProfile ──────────────────────────────────────────────────────────

#[tokio::test]
async fn should_send_signed_out_visitor_to_login() {
    let usecase = CompleteProfileUseCase {
        profiles: MockProfileRepo::default(),
        blobs: MockBlobStore::default(),
    };

    let target = usecase.execute(None, kim(Some("L1"))).await.unwrap();

    assert_eq!(target, RedirectTarget::Login);
    assert!(usecase.profiles.upserts.lock().unwrap().is_empty());
}

#[tokio::test]
async fn should_return_to_league_after_completion() {
    let usecase = CompleteProfileUseCase {
        profiles: MockProfileRepo::default(),
        blobs: MockBlobStore::default(),
    };

    let target = usecase
        .execute(Some(identity("U1")), kim(Some("L123")))
        .await
        .unwrap();

    assert_eq!(target, RedirectTarget::LeagueRegistration(league_id("L123")));
    assert_eq!(target.location("/"), "/league/L123/register");
}

#[tokio::test]
async fn should_land_on_default_page_without_continuation() {
    let usecase = CompleteProfileUseCase {
        profiles: MockProfileRepo::default(),
        blobs: MockBlobStore::default(),
    };

    let target = usecase.execute(Some(identity("U1")), kim(None)).await.unwrap();

    assert_eq!(target, RedirectTarget::Landing);
}

#[tokio::test]
async fn should_reject_blank_name_without_writing() {
    let usecase = CompleteProfileUseCase {
        profiles: MockProfileRepo::default(),
        blobs: MockBlobStore::default(),
    };
    let input = CompleteProfileInput {
        name: Some("   ".into()),
        ..kim(None)
    };

    let result = usecase.execute(Some(identity("U1")), input).await;

    assert!(matches!(result, Err(PortalError::MissingRequiredField("name"))));
    assert!(usecase.profiles.upserts.lock().unwrap().is_empty());
}

#[tokio::test]
async fn should_upload_picture_then_store_its_url() {
    let usecase = CompleteProfileUseCase {
        profiles: MockProfileRepo::default(),
        blobs: MockBlobStore::default(),
    };
    let input = CompleteProfileInput {
        picture: Some(png()),
        ..kim(None)
    };

    usecase.execute(Some(identity("U1")), input).await.unwrap();

    let uploads = usecase.blobs.uploads.lock().unwrap().clone();
    assert_eq!(uploads.len(), 1);
    assert!(uploads[0].starts_with("profile_pictures/U1/"));
    assert!(uploads[0].ends_with("_kim.png"));

    let profile = usecase.profiles.get("U1").unwrap();
    assert_eq!(
        profile.profile_picture_url,
        Some(format!("https://cdn.example.com/{}", uploads[0]))
    );
}

#[tokio::test]
async fn should_never_write_profile_when_upload_fails() {
    let usecase = CompleteProfileUseCase {
        profiles: MockProfileRepo::default(),
        blobs: MockBlobStore::failing(),
    };
    let input = CompleteProfileInput {
        picture: Some(png()),
        ..kim(Some("L1"))
    };

    let result = usecase.execute(Some(identity("U1")), input).await;

    match result {
        Err(PortalError::UploadFailed(message)) => assert_eq!(message, "bucket quota exceeded"),
        other => panic!("expected UploadFailed, got {other:?}"),
    }
    assert!(usecase.profiles.upserts.lock().unwrap().is_empty());
    assert!(usecase.profiles.get("U1").is_none());
}

#[tokio::test]
async fn should_keep_fields_absent_from_the_form() {
    let mut stored = complete_profile("U1");
    stored.sponsor = Some("Local Shop".into());
    stored.profile_picture_url = Some("https://cdn.example.com/old.png".into());
    let usecase = CompleteProfileUseCase {
        profiles: MockProfileRepo::new(vec![stored]),
        blobs: MockBlobStore::default(),
    };
    let input = CompleteProfileInput {
        name: Some("Kim Lee".into()),
        ..kim(None)
    };

    usecase.execute(Some(identity("U1")), input).await.unwrap();

    let profile = usecase.profiles.get("U1").unwrap();
    assert_eq!(profile.name.as_deref(), Some("Kim Lee"));
    assert_eq!(profile.sponsor.as_deref(), Some("Local Shop"));
    assert_eq!(
        profile.profile_picture_url.as_deref(),
        Some("https://cdn.example.com/old.png")
    );
}

// ── GetProfileForm ───────────────────────────────────────────────────────────

#[tokio::test]
async fn should_prefill_form_with_identity_email() {
    let usecase = GetProfileFormUseCase {
        profiles: MockProfileRepo::default(),
    };

    let outcome = usecase
        .execute(Some(identity("U1")), Some(league_id("L1")))
        .await
        .unwrap();

    let Outcome::Continue(form) = outcome else {
        panic!("expected a form, got {outcome:?}");
    };
    assert_eq!(form.email, "u1@example.com");
    assert!(form.profile.is_none());
    assert_eq!(form.continuation, Some(league_id("L1")));
}

// ── RemoveProfilePicture ─────────────────────────────────────────────────────

#[tokio::test]
async fn should_delete_blob_then_clear_url() {
    let mut stored = complete_profile("U1");
    stored.profile_picture_url = Some("https://cdn.example.com/profile_pictures/U1/1_kim.png".into());
    let usecase = RemoveProfilePictureUseCase {
        profiles: MockProfileRepo::new(vec![stored]),
        blobs: MockBlobStore::default(),
    };

    usecase.execute(identity("U1")).await.unwrap();

    assert_eq!(
        *usecase.blobs.deletes.lock().unwrap(),
        vec!["https://cdn.example.com/profile_pictures/U1/1_kim.png".to_owned()]
    );
    let upserts = usecase.profiles.upserts.lock().unwrap().clone();
    assert_eq!(upserts.len(), 1);
    assert_eq!(upserts[0].profile_picture_url, FieldPatch::Clear);
    assert!(upserts[0].name.is_omitted());
    assert!(usecase.profiles.get("U1").unwrap().profile_picture_url.is_none());
}

#[tokio::test]
async fn should_skip_removal_without_picture() {
    let usecase = RemoveProfilePictureUseCase {
        profiles: MockProfileRepo::new(vec![complete_profile("U1")]),
        blobs: MockBlobStore::default(),
    };

    usecase.execute(identity("U1")).await.unwrap();

    assert!(usecase.blobs.deletes.lock().unwrap().is_empty());
    assert!(usecase.profiles.upserts.lock().unwrap().is_empty());
}

#[tokio::test]
async fn should_report_missing_profile_on_removal() {
    let usecase = RemoveProfilePictureUseCase {
        profiles: MockProfileRepo::default(),
        blobs: MockBlobStore::default(),
    };

    let result = usecase.execute(identity("U1")).await;

    assert!(matches!(result, Err(PortalError::ProfileNotFound)));
}

// ── Signup through registration ──────────────────────────────────────────────

#[tokio::test]
async fn should_walk_new_registrant_from_signup_to_success() {
    let profiles = MockProfileRepo::default();
    let leagues = MockLeagueRepo::new(vec![spring_open()]);
    let registrations = MockRegistrationRepo::default();
    let flows = MockFlowStore::default();
    let lock = MockSubmissionLock::default();
    let load = LoadRegistrationUseCase {
        profiles: profiles.clone(),
        leagues: leagues.clone(),
        registrations: registrations.clone(),
        flows: flows.clone(),
    };

    // Signup leaves only a stub.
    let signup = ProvisionProfileUseCase {
        profiles: profiles.clone(),
    };
    signup.execute(identity("U1")).await.unwrap();

    // Incomplete profile: sent to completion, carrying the league.
    let outcome = load
        .execute(Some(identity("U1")), Some(league_id("L1")))
        .await
        .unwrap();
    let Outcome::RedirectTo(target) = outcome else {
        panic!("expected a redirect, got {outcome:?}");
    };
    assert_eq!(target.location("/"), "/complete-profile?redirect=L1");

    // Complete without a picture.
    let complete = CompleteProfileUseCase {
        profiles: profiles.clone(),
        blobs: MockBlobStore::default(),
    };
    let target = complete
        .execute(Some(identity("U1")), kim(Some("L1")))
        .await
        .unwrap();
    assert_eq!(target.location("/"), "/league/L1/register");

    let patch = profiles.upserts.lock().unwrap()[0].clone();
    assert_eq!(patch.name, FieldPatch::Set("Kim".to_owned()));
    assert_eq!(
        patch.date_of_birth,
        FieldPatch::Set(NaiveDate::from_ymd_opt(2012, 4, 1).unwrap())
    );
    assert!(patch.profile_picture_url.is_omitted());

    // Back on the registration page: READY with the button enabled.
    let Outcome::Continue(view) = load
        .execute(Some(identity("U1")), Some(league_id("L1")))
        .await
        .unwrap()
    else {
        panic!("expected READY");
    };
    assert_eq!(view.league.name, "Spring Open");
    assert!(view.can_submit);

    // Submit.
    let submit = SubmitRegistrationUseCase {
        profiles: profiles.clone(),
        leagues: leagues.clone(),
        registrations: registrations.clone(),
        flows: flows.clone(),
        lock,
    };
    submit
        .execute(Some(identity("U1")), Some(league_id("L1")))
        .await
        .unwrap();

    let stored = registrations.all();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].league_id, league_id("L1"));
    assert_eq!(stored[0].user_id, identity("U1").user_id);
    assert_eq!(stored[0].status, RegistrationStatus::Pending);

    // The button stays disabled from here on.
    let Outcome::Continue(view) = load
        .execute(Some(identity("U1")), Some(league_id("L1")))
        .await
        .unwrap()
    else {
        panic!("expected READY");
    };
    assert!(view.already_registered);
    assert!(!view.can_submit);
}
