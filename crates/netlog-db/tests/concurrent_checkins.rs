use chrono::Utc;
use netlog_core::OperatorRecord;
use netlog_db::{checkins, Database};

fn bare(call_sign: String) -> OperatorRecord {
    OperatorRecord {
        call_sign,
        full_name: String::new(),
        address: None,
        city: None,
        province: None,
        postal_code: None,
        qualifications: None,
        status: None,
        expiration_date: None,
        frn: None,
        repeater: "VE7RVF".to_string(),
        checkin_date: Utc::now(),
    }
}

#[tokio::test]
async fn test_concurrent_writers_on_disk() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = dir.path().join("checkins.db");
    let db = Database::open(&path).await.expect("open database");

    let mut handles = Vec::new();
    for i in 0..20 {
        let db = db.clone();
        handles.push(tokio::spawn(async move {
            checkins::insert_checkin(db.pool(), &bare(format!("VE7A{}", char::from(b'A' + i))))
                .await
        }));
    }

    let mut ids = Vec::new();
    for handle in handles {
        ids.push(handle.await.expect("task").expect("insert"));
    }
    ids.sort_unstable();
    ids.dedup();

    assert_eq!(ids.len(), 20);
    assert_eq!(checkins::count(db.pool()).await.expect("count"), 20);
}

#[tokio::test]
async fn test_reopen_keeps_rows() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = dir.path().join("checkins.db");

    let db = Database::open(&path).await.expect("open database");
    let id = checkins::insert_checkin(db.pool(), &bare("VA7XYZ".to_string()))
        .await
        .expect("insert");
    db.close().await;

    let db = Database::open(&path).await.expect("reopen database");
    let stored = checkins::get_by_id(db.pool(), id)
        .await
        .expect("read back")
        .expect("row survives reopen");
    assert_eq!(stored.call_sign, "VA7XYZ");
}
