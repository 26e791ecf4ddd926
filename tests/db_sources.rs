//! Postgres adapter coverage. Needs `DATABASE_URL`; run with `cargo test -- --ignored`.

use sqlx::PgPool;
use time::macros::offset;
use uuid::Uuid;

use memoria::application::repos::{
    CreateEntryParams, CreateVoiceParams, RepoError, TimelineSource, TimelineWriteRepo,
    UpdateEntryParams, UpdateVoiceParams, VoicesRepo, VoicesWriteRepo,
};
use memoria::domain::entities::{DynamicContent, LiveContent};
use memoria::infra::db::PostgresRepositories;

/// 2024-01-15 23:30:00 +08:00, which is still 2024-01-15 in UTC.
const LATE_JAN_15: i64 = 1_705_332_600;
/// 2024-01-16 00:30:00 +08:00, which is 2024-01-15 in UTC.
const EARLY_JAN_16: i64 = LATE_JAN_15 + 3_600;

fn live(title: &str) -> LiveContent {
    LiveContent {
        title: title.to_string(),
        ..Default::default()
    }
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn timeline_tables_range_and_bucket_by_offset(pool: PgPool) {
    let repos = PostgresRepositories::new(pool);
    let lives = repos.lives();

    for (timestamp, last_modified, title) in [
        (EARLY_JAN_16, 300, "second"),
        (LATE_JAN_15, 200, "first"),
    ] {
        lives
            .create(CreateEntryParams {
                timestamp,
                last_modified,
                content: live(title),
            })
            .await
            .expect("insert live");
    }

    let rows = lives
        .list_in_range(LATE_JAN_15, EARLY_JAN_16 + 1)
        .await
        .expect("range");
    let titles: Vec<&str> = rows.iter().map(|row| row.content.title.as_str()).collect();
    assert_eq!(titles, ["first", "second"]);

    let half_open = lives
        .list_in_range(LATE_JAN_15, EARLY_JAN_16)
        .await
        .expect("range");
    assert_eq!(half_open.len(), 1);

    let shanghai = lives.day_counts(offset!(+8)).await.expect("counts");
    let days: Vec<(&str, i64, i64)> = shanghai
        .iter()
        .map(|day| (day.day.as_str(), day.count, day.version))
        .collect();
    assert_eq!(days, [("2024.01.15", 1, 200), ("2024.01.16", 1, 300)]);

    let utc = lives.day_counts(offset!(UTC)).await.expect("counts");
    assert_eq!(utc.len(), 1);
    assert_eq!(utc[0].count, 2);
    assert_eq!(utc[0].version, 300);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn timeline_update_round_trips_payload(pool: PgPool) {
    let repos = PostgresRepositories::new(pool);
    let dynamics = repos.dynamics();

    let created = dynamics
        .create(CreateEntryParams {
            timestamp: LATE_JAN_15,
            last_modified: 1,
            content: DynamicContent {
                title: "draft".into(),
                image_urls: vec!["a.png".into()],
                ..Default::default()
            },
        })
        .await
        .expect("insert dynamic");

    let updated = dynamics
        .update(UpdateEntryParams {
            id: created.id,
            timestamp: EARLY_JAN_16,
            last_modified: 2,
            content: DynamicContent {
                title: "final".into(),
                ..Default::default()
            },
        })
        .await
        .expect("update dynamic");
    assert_eq!(updated.timestamp, EARLY_JAN_16);
    assert_eq!(updated.content.title, "final");

    let found = dynamics
        .find_by_id(created.id)
        .await
        .expect("find")
        .expect("row exists");
    assert_eq!(found, updated);

    let missing = dynamics
        .update(UpdateEntryParams {
            id: Uuid::new_v4(),
            timestamp: 0,
            last_modified: 0,
            content: DynamicContent::default(),
        })
        .await;
    assert!(matches!(missing, Err(RepoError::NotFound)));
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn voices_are_listed_by_sort_order_and_soft_deleted(pool: PgPool) {
    let repos = PostgresRepositories::new(pool);

    let mut ids = Vec::new();
    for (sort_no, title) in [(3, "c"), (1, "a"), (2, "b")] {
        let voice = repos
            .create_voice(CreateVoiceParams {
                liver: "ava".into(),
                category: "greet".into(),
                title: title.into(),
                sort_no,
                remark: String::new(),
                file_path: format!("{title}.mp3"),
                add_time: sort_no,
            })
            .await
            .expect("insert voice");
        ids.push(voice.id);
    }

    let titles: Vec<String> = repos
        .list_by_liver("ava")
        .await
        .expect("list")
        .into_iter()
        .map(|voice| voice.title)
        .collect();
    assert_eq!(titles, ["a", "b", "c"]);

    let moved = repos
        .update_voice(UpdateVoiceParams {
            id: ids[0],
            liver: "bea".into(),
            category: "greet".into(),
            title: "c".into(),
            sort_no: 3,
            remark: "moved".into(),
            file_path: None,
        })
        .await
        .expect("update voice");
    assert_eq!(moved.file_path, "c.mp3");
    assert_eq!(moved.liver, "bea");

    repos.soft_delete_voice(ids[1]).await.expect("delete");
    assert!(repos.find_by_id(ids[1]).await.expect("find").is_none());
    assert!(matches!(
        repos.soft_delete_voice(ids[1]).await,
        Err(RepoError::NotFound)
    ));
    assert_eq!(repos.list_by_liver("ava").await.expect("list").len(), 1);
}
