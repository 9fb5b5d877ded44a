//! Live integration tests for hunter-db using `#[sqlx::test]`.
//!
//! Each test gets a fresh, fully-migrated Postgres database spun up by the
//! sqlx test harness. Run with `DATABASE_URL` set and `--ignored`.

use hunter_core::{LeadSource, PipelineStatus};
use hunter_db::{
    create_lead, delete_lead, get_lead, list_leads, update_lead, DbError, LeadUpdate, NewLead,
};

fn google_lead<'a>(name: &'a str, place_id: &'a str) -> NewLead<'a> {
    NewLead {
        address: Some("Hatanpään valtatie 1, Tampere"),
        place_id: Some(place_id),
        website_status: Some("NO_WEBSITE"),
        source: LeadSource::Google,
        ..NewLead::manual(name)
    }
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires DATABASE_URL"]
async fn create_lead_defaults_company_name_and_status(pool: sqlx::PgPool) {
    let row = create_lead(&pool, &google_lead("Pajan Auto", "p1"))
        .await
        .unwrap()
        .expect("first insert should create a row");

    assert_eq!(row.company_name, "Pajan Auto");
    assert_eq!(row.status, "new");
    assert_eq!(row.source, "google");
    assert_eq!(row.lead_key.len(), 64);
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires DATABASE_URL"]
async fn duplicate_place_id_or_key_returns_none(pool: sqlx::PgPool) {
    create_lead(&pool, &google_lead("Pajan Auto", "p1"))
        .await
        .unwrap()
        .unwrap();

    let same_place = create_lead(&pool, &google_lead("Renamed Auto", "p1"))
        .await
        .unwrap();
    assert!(same_place.is_none());

    let same_key = create_lead(&pool, &google_lead("PAJAN  auto", "p2"))
        .await
        .unwrap();
    assert!(same_key.is_none());
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires DATABASE_URL"]
async fn list_leads_filters_by_status(pool: sqlx::PgPool) {
    let a = create_lead(&pool, &NewLead::manual("A")).await.unwrap().unwrap();
    create_lead(&pool, &NewLead::manual("B")).await.unwrap().unwrap();
    update_lead(
        &pool,
        a.id,
        &LeadUpdate {
            status: Some(PipelineStatus::Won),
            ..LeadUpdate::default()
        },
    )
    .await
    .unwrap();

    let all = list_leads(&pool, None, 50).await.unwrap();
    assert_eq!(all.len(), 2);

    let won = list_leads(&pool, Some(PipelineStatus::Won), 50).await.unwrap();
    assert_eq!(won.len(), 1);
    assert_eq!(won[0].name, "A");

    let limited = list_leads(&pool, None, 1).await.unwrap();
    assert_eq!(limited.len(), 1);
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires DATABASE_URL"]
async fn update_lead_is_sparse(pool: sqlx::PgPool) {
    let created = create_lead(
        &pool,
        &NewLead {
            phone: Some("03 123"),
            notes: Some("call after lunch"),
            ..NewLead::manual("Salon Sakset")
        },
    )
    .await
    .unwrap()
    .unwrap();

    let updated = update_lead(
        &pool,
        created.id,
        &LeadUpdate {
            status: Some(PipelineStatus::Contacted),
            notes: Some(None),
            ..LeadUpdate::default()
        },
    )
    .await
    .unwrap();

    assert_eq!(updated.status, "contacted");
    assert_eq!(updated.phone.as_deref(), Some("03 123"));
    assert!(updated.notes.is_none());
    assert!(updated.updated_at >= created.updated_at);
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires DATABASE_URL"]
async fn update_missing_lead_is_not_found(pool: sqlx::PgPool) {
    let err = update_lead(&pool, 999_999, &LeadUpdate::default())
        .await
        .unwrap_err();
    assert!(matches!(err, DbError::NotFound));
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires DATABASE_URL"]
async fn delete_lead_removes_row(pool: sqlx::PgPool) {
    let row = create_lead(&pool, &NewLead::manual("Kahvila Kuppi"))
        .await
        .unwrap()
        .unwrap();

    assert!(delete_lead(&pool, row.id).await.unwrap());
    assert!(get_lead(&pool, row.id).await.unwrap().is_none());
    assert!(!delete_lead(&pool, row.id).await.unwrap());
}
