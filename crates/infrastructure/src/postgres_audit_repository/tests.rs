use smartsales_application::{AuditLogQuery, AuditRepository, NewAuditEntry};

use super::PostgresAuditRepository;
use crate::postgres_support::test_pool::test_pool;

#[tokio::test]
async fn search_matches_action_and_ip_newest_first() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let repository = PostgresAuditRepository::new(pool);
    let marker = uuid::Uuid::new_v4().simple().to_string();

    for (action, ip) in [
        (format!("Creó marca: {marker}"), "10.1.1.1"),
        (format!("Eliminó marca: {marker}"), "10.1.1.2"),
    ] {
        let appended = repository
            .append_entry(NewAuditEntry {
                user_id: None,
                username: Some("auditor".to_owned()),
                action,
                ip: Some(ip.to_owned()),
                success: true,
            })
            .await;
        assert!(appended.is_ok());
    }

    let entries = repository
        .list_entries(AuditLogQuery {
            search: Some(marker.clone()),
            limit: 10,
            offset: 0,
        })
        .await;
    let Ok(entries) = entries else {
        panic!("audit entries should list");
    };
    assert_eq!(entries.len(), 2);
    assert!(entries[0].action.starts_with("Eliminó"));

    let paged = repository
        .list_entries(AuditLogQuery {
            search: Some(marker),
            limit: 1,
            offset: 1,
        })
        .await;
    assert!(matches!(paged, Ok(ref list) if list.len() == 1 && list[0].action.starts_with("Creó")));
}
