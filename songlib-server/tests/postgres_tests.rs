//! Integration tests against a real PostgreSQL database
//!
//! Run with: DATABASE_URL=postgres://... cargo test -p songlib-server -- --ignored

use std::sync::atomic::{AtomicU32, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use chrono::NaiveDate;

use songlib_server::db::{
    create_pool, ensure_schema, CoupletRepository, Database, DbContext, DbError, PgCoupletRepo,
    PgSongRepo, SongRepository, Transactor,
};
use songlib_server::models::{
    Couplet, Name, NewSong, Page, SearchQuery, SortCriterion, SongUpdate,
};
use songlib_server::service::{InsertSongInput, SongError, SongService, UpdateSongInput};
use songlib_server::webapi::{SongInfo, SongInfoError, SongInfoSource};

struct StaticSongInfo(&'static str);

#[async_trait]
impl SongInfoSource for StaticSongInfo {
    async fn get(&self, _group: &str, _song: &str) -> Result<SongInfo, SongInfoError> {
        Ok(SongInfo {
            release_date: NaiveDate::from_ymd_opt(1991, 9, 10).unwrap(),
            text: self.0.to_string(),
            link: "https://www.youtube.com/watch?v=hTWKbfoikeg".to_string(),
        })
    }
}

async fn database() -> Database {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL required");
    let pool = create_pool(&url).await.expect("pool creation failed");
    ensure_schema(&pool).await.expect("schema bootstrap failed");
    Database::new(pool)
}

/// Group name no other test run uses
fn unique_group(prefix: &str) -> String {
    static COUNTER: AtomicU32 = AtomicU32::new(0);
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    format!("{prefix}-{nanos}-{}", COUNTER.fetch_add(1, Ordering::Relaxed))
}

fn new_song(group: &str, name: &str) -> NewSong {
    NewSong {
        name: name.to_string(),
        group: group.to_string(),
        link: "https://example.com".to_string(),
        release_date: NaiveDate::from_ymd_opt(2006, 7, 3).unwrap(),
    }
}

#[tokio::test]
#[ignore = "requires database"]
async fn duplicate_song_is_already_exists() {
    let db = database().await;
    let songs = PgSongRepo::new(db.clone());
    let ctx = DbContext::background();
    let group = unique_group("dup");

    songs.insert(&ctx, &new_song(&group, "Uprising")).await.unwrap();
    let err = songs
        .insert(&ctx, &new_song(&group, "Uprising"))
        .await
        .unwrap_err();

    assert!(matches!(err, DbError::AlreadyExists { resource: "song" }));
}

#[tokio::test]
#[ignore = "requires database"]
async fn song_crud_round_trip() {
    let db = database().await;
    let songs = PgSongRepo::new(db.clone());
    let ctx = DbContext::background();
    let group = unique_group("crud");

    let id = songs.insert(&ctx, &new_song(&group, "Starlight")).await.unwrap();
    let song = songs.get_by_id(&ctx, id).await.unwrap();
    assert_eq!(song.group, group);

    let update = SongUpdate {
        link: Some("https://example.com/starlight".into()),
        ..Default::default()
    };
    songs.update_by_id(&ctx, id, &update).await.unwrap();
    assert_eq!(
        songs.get_by_id(&ctx, id).await.unwrap().link,
        "https://example.com/starlight"
    );

    songs.delete_by_id(&ctx, id).await.unwrap();
    assert!(songs.get_by_id(&ctx, id).await.unwrap_err().is_not_found());
    assert!(songs.delete_by_id(&ctx, id).await.unwrap_err().is_not_found());
    assert!(songs
        .update_by_id(&ctx, id, &update)
        .await
        .unwrap_err()
        .is_not_found());
}

#[tokio::test]
#[ignore = "requires database"]
async fn search_filters_sorts_and_pages() {
    let db = database().await;
    let songs = PgSongRepo::new(db.clone());
    let ctx = DbContext::background();
    let group = unique_group("search");

    for name in ["Apple", "Cherry", "Banana"] {
        songs.insert(&ctx, &new_song(&group, name)).await.unwrap();
    }

    let query = SearchQuery {
        filters: [
            ("group".to_string(), group.clone()),
            ("unknown".to_string(), "ignored".to_string()),
        ]
        .into(),
        sort: vec![SortCriterion::new("song", "desc")],
        page: Page::new(Some(1), Some(5)),
    };
    let found = songs.search(&ctx, &query).await.unwrap();

    let names: Vec<_> = found.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, ["Banana", "Apple"]);

    let by_date = SearchQuery {
        filters: [
            ("group".to_string(), group.clone()),
            ("releaseDate".to_string(), "2006-07-03".to_string()),
        ]
        .into(),
        ..Default::default()
    };
    assert_eq!(songs.search(&ctx, &by_date).await.unwrap().len(), 3);
}

#[tokio::test]
#[ignore = "requires database"]
async fn couplet_repository_operations() {
    let db = database().await;
    let songs = PgSongRepo::new(db.clone());
    let couplets = PgCoupletRepo::new(db.clone());
    let ctx = DbContext::background();
    let group = unique_group("couplets");

    let id = songs.insert(&ctx, &new_song(&group, "Hysteria")).await.unwrap();
    assert_eq!(couplets.get_available_sequence_number(&ctx, id).await.unwrap(), 1);

    let rows = songlib_server::models::couplets_from_text(id, "A\n\nB\n\nC");
    couplets.insert(&ctx, &rows).await.unwrap();
    couplets.insert(&ctx, &[]).await.unwrap();

    assert_eq!(couplets.get_couplets_count(&ctx, id).await.unwrap(), 3);
    assert_eq!(couplets.get_available_sequence_number(&ctx, id).await.unwrap(), 4);

    let page = couplets
        .get_by_song_id(&ctx, id, Page::new(Some(1), Some(5)))
        .await
        .unwrap();
    let texts: Vec<_> = page.iter().map(|c| c.text.as_str()).collect();
    assert_eq!(texts, ["B", "C"]);

    assert_eq!(couplets.delete_by_song_id(&ctx, id).await.unwrap(), 3);
    assert_eq!(couplets.delete_by_song_id(&ctx, id).await.unwrap(), 0);
}

#[tokio::test]
#[ignore = "requires database"]
async fn failed_reinsert_rolls_back_couplet_delete() {
    let db = database().await;
    let songs = PgSongRepo::new(db.clone());
    let couplets = PgCoupletRepo::new(db.clone());
    let ctx = DbContext::background();
    let group = unique_group("rollback");

    let id = songs.insert(&ctx, &new_song(&group, "Knights")).await.unwrap();
    couplets
        .insert(&ctx, &songlib_server::models::couplets_from_text(id, "old 1\n\nold 2"))
        .await
        .unwrap();

    // Duplicate sequence numbers violate the primary key on the insert half
    let clashing = vec![
        Couplet {
            song_id: id,
            sequence_number: 1,
            text: "new".into(),
        },
        Couplet {
            song_id: id,
            sequence_number: 1,
            text: "new again".into(),
        },
    ];

    let result = db
        .within_transaction(&ctx, |tx_ctx| {
            let couplets = couplets.clone();
            async move {
                couplets.delete_by_song_id(&tx_ctx, id).await?;
                couplets.insert(&tx_ctx, &clashing).await
            }
        })
        .await;
    assert!(result.is_err());

    let kept = couplets
        .get_by_song_id(&ctx, id, Page::default())
        .await
        .unwrap();
    let texts: Vec<_> = kept.iter().map(|c| c.text.as_str()).collect();
    assert_eq!(texts, ["old 1", "old 2"]);
}

#[tokio::test]
#[ignore = "requires database"]
async fn service_end_to_end() {
    let db = database().await;
    let service = SongService::new(
        PgSongRepo::new(db.clone()),
        PgCoupletRepo::new(db.clone()),
        db.clone(),
        StaticSongInfo("A\n\nB\n\nC"),
    );
    let ctx = DbContext::background();
    let group = unique_group("service");

    let input = InsertSongInput {
        group: Name::new("group", &group).unwrap(),
        song: Name::new("song", "Smells Like Teen Spirit").unwrap(),
    };
    let song = service.insert(&ctx, input.clone()).await.unwrap();

    let text = service
        .get_text(&ctx, song.id, Page::new(Some(0), Some(2)))
        .await
        .unwrap();
    assert_eq!(text.text, ["A", "B"]);
    assert_eq!(text.count, 3);

    let err = service.insert(&ctx, input).await.unwrap_err();
    assert!(matches!(err, SongError::AlreadyExists(_)));

    let err = service
        .update(&ctx, song.id, UpdateSongInput::default())
        .await
        .unwrap_err();
    assert!(matches!(err, SongError::FieldsMissing));

    service.update_text(&ctx, song.id, "X\n\nY").await.unwrap();
    let text = service.get_text(&ctx, song.id, Page::default()).await.unwrap();
    assert_eq!(text.text, ["X", "Y"]);

    service.delete(&ctx, song.id).await.unwrap();
    let err = service.get(&ctx, song.id).await.unwrap_err();
    assert!(matches!(err, SongError::NotFound { .. }));
}
