// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Tests for the core data model and its wire shapes.

#[cfg(test)]
mod tests {
    use crate::types::{
        generate_id, AclRule, AuthPrincipal, BatchChange, BatchChangeInput, BatchChangeStatus,
        BatchChangeSummary, ChangeInput, ChangeType, RecordData, RecordType, Zone,
    };
    use chrono::Utc;

    fn principal(user_id: &str, groups: &[&str]) -> AuthPrincipal {
        AuthPrincipal {
            user_id: user_id.to_string(),
            user_name: format!("{user_id}-name"),
            group_ids: groups.iter().map(ToString::to_string).collect(),
            is_super: false,
        }
    }

    #[test]
    fn test_generate_id_is_32_hex_chars() {
        let id = generate_id();
        assert_eq!(id.len(), 32);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(id, generate_id());
    }

    #[test]
    fn test_change_input_wire_shape() {
        let json = r#"{
            "changeType": "Add",
            "inputName": "web.example.com.",
            "type": "A",
            "ttl": 300,
            "record": {"address": "10.0.0.1"}
        }"#;
        let change: ChangeInput = serde_json::from_str(json).unwrap();

        assert_eq!(change.change_type, ChangeType::Add);
        assert_eq!(change.input_name, "web.example.com.");
        assert_eq!(change.record_type, RecordType::A);
        assert_eq!(change.ttl, Some(300));
        assert_eq!(change.record.address.as_deref(), Some("10.0.0.1"));
    }

    #[test]
    fn test_delete_change_input_needs_no_record() {
        let json = r#"{
            "changeType": "DeleteRecordSet",
            "inputName": "old.example.com.",
            "type": "TXT"
        }"#;
        let change: ChangeInput = serde_json::from_str(json).unwrap();

        assert_eq!(change.change_type, ChangeType::DeleteRecordSet);
        assert_eq!(change.ttl, None);
        assert_eq!(change.record.text, None);
    }

    #[test]
    fn test_record_type_wire_names() {
        for (record_type, expected) in [
            (RecordType::A, "\"A\""),
            (RecordType::Aaaa, "\"AAAA\""),
            (RecordType::Cname, "\"CNAME\""),
            (RecordType::Mx, "\"MX\""),
            (RecordType::Ns, "\"NS\""),
            (RecordType::Ptr, "\"PTR\""),
            (RecordType::Txt, "\"TXT\""),
        ] {
            assert_eq!(serde_json::to_string(&record_type).unwrap(), expected);
        }
    }

    #[test]
    fn test_record_data_untagged_distinguishes_a_from_aaaa() {
        let ipv4: RecordData = serde_json::from_str(r#"{"address": "10.0.0.1"}"#).unwrap();
        assert!(matches!(ipv4, RecordData::A { .. }));

        let ipv6: RecordData = serde_json::from_str(r#"{"address": "2001:db8::1"}"#).unwrap();
        assert!(matches!(ipv6, RecordData::Aaaa { .. }));
    }

    #[test]
    fn test_record_data_round_trips() {
        let records = vec![
            RecordData::Mx {
                preference: 10,
                exchange: "mail.example.com.".to_string(),
            },
            RecordData::Cname {
                cname: "target.example.com.".to_string(),
            },
            RecordData::Ptr {
                ptrdname: "host.example.com.".to_string(),
            },
            RecordData::Txt {
                text: "v=spf1 -all".to_string(),
            },
        ];
        for record in records {
            let json = serde_json::to_string(&record).unwrap();
            let parsed: RecordData = serde_json::from_str(&json).unwrap();
            assert_eq!(parsed, record);
        }
    }

    #[test]
    fn test_batch_change_input_wire_shape() {
        let json = r#"{
            "comments": "rotate frontends",
            "changes": [
                {"changeType": "Add", "inputName": "a.example.com.", "type": "A",
                 "ttl": 300, "record": {"address": "10.0.0.1"}},
                {"changeType": "DeleteRecordSet", "inputName": "b.example.com.", "type": "A"}
            ]
        }"#;
        let input: BatchChangeInput = serde_json::from_str(json).unwrap();

        assert_eq!(input.comments.as_deref(), Some("rotate frontends"));
        assert_eq!(input.changes.len(), 2);
    }

    #[test]
    fn test_zone_new_normalizes_name() {
        let zone = Zone::new("Example.COM", "admin@example.com", "group-1");
        assert_eq!(zone.name, "example.com.");
        assert_eq!(zone.admin_group_id, "group-1");
        assert_eq!(zone.id.len(), 32);
    }

    #[test]
    fn test_zone_is_reverse() {
        assert!(Zone::new("2.0.192.in-addr.arpa.", "", "g").is_reverse());
        assert!(Zone::new("8.b.d.0.1.0.0.2.ip6.arpa.", "", "g").is_reverse());
        assert!(!Zone::new("example.com.", "", "g").is_reverse());
    }

    #[test]
    fn test_can_modify_zone_via_admin_group() {
        let zone = Zone::new("example.com.", "", "dns-admins");
        assert!(principal("alice", &["dns-admins"]).can_modify_zone(&zone));
        assert!(!principal("bob", &["other-group"]).can_modify_zone(&zone));
    }

    #[test]
    fn test_can_modify_zone_via_acl_rule() {
        let mut zone = Zone::new("example.com.", "", "dns-admins");
        zone.acl.push(AclRule {
            user_id: Some("carol".to_string()),
            group_id: None,
        });
        zone.acl.push(AclRule {
            user_id: None,
            group_id: Some("ops".to_string()),
        });

        assert!(principal("carol", &[]).can_modify_zone(&zone));
        assert!(principal("dave", &["ops"]).can_modify_zone(&zone));
        assert!(!principal("eve", &[]).can_modify_zone(&zone));
    }

    #[test]
    fn test_super_user_can_modify_any_zone() {
        let zone = Zone::new("example.com.", "", "dns-admins");
        let mut root = principal("root", &[]);
        root.is_super = true;
        assert!(root.can_modify_zone(&zone));
    }

    #[test]
    fn test_batch_change_summary_from_batch() {
        let batch = BatchChange {
            id: "batch-1".to_string(),
            user_id: "alice".to_string(),
            user_name: "Alice".to_string(),
            comments: Some("note".to_string()),
            created_timestamp: Utc::now(),
            changes: Vec::new(),
            status: BatchChangeStatus::Pending,
        };
        let summary = BatchChangeSummary::from(&batch);

        assert_eq!(summary.id, "batch-1");
        assert_eq!(summary.user_name, "Alice");
        assert_eq!(summary.total_changes, 0);
        assert_eq!(summary.status, BatchChangeStatus::Pending);
    }
}
