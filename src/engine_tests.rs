// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `engine.rs`

#[cfg(test)]
mod tests {
    use super::super::{plan, ApplySummary, Engine, PlannedAction, RefreshSummary};
    use crate::errors::ApiError;
    use crate::lifecycle::{RecordLifecycle, RecordService};
    use crate::record::DeclaredRecord;
    use crate::record_key::RecordIdentifier;
    use crate::state::StateFile;
    use crate::test_support::MockProvider;
    use std::collections::BTreeMap;
    use tempfile::TempDir;

    fn web() -> DeclaredRecord {
        DeclaredRecord::new("www", "example.com.", "A", 300, ["192.0.2.10"])
    }

    fn mail() -> DeclaredRecord {
        DeclaredRecord::new("example.com.", "example.com.", "MX", 3600, ["10 mx1.example.com."])
    }

    fn declared(entries: &[(&str, DeclaredRecord)]) -> BTreeMap<String, DeclaredRecord> {
        entries
            .iter()
            .map(|(name, record)| ((*name).to_string(), record.clone()))
            .collect()
    }

    fn engine() -> (Engine<MockProvider>, TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let engine = Engine::new(
            RecordLifecycle::new(MockProvider::default()),
            dir.path().join("rrstate.state.json"),
        );
        (engine, dir)
    }

    fn server_error() -> ApiError {
        ApiError::Http {
            method: "POST".to_string(),
            url: "https://api.example.net".to_string(),
            status: 400,
            reason: "ProviderBadRequest".to_string(),
            code: None,
            message: "rejected".to_string(),
        }
    }

    // =====================================================
    // plan
    // =====================================================

    #[test]
    fn test_plan_classifies_resources() {
        let mut state = StateFile::default();
        state.insert("web", web().key().identifier(), web());
        state.insert("old", RecordIdentifier::from_raw("old:example.com.:A"), web());
        let mut moved = mail();
        moved.owner_name = "mx".to_string();
        state.insert("mail", moved.key().identifier(), moved);

        let mut web_changed = web();
        web_changed.ttl = 60;
        let records = declared(&[
            ("web", web_changed),
            ("mail", mail()),
            ("api", web()),
        ]);

        let plan = plan(&records, &state);
        let kinds: Vec<_> = plan
            .actions()
            .iter()
            .map(|a| (a.kind(), a.name().to_string()))
            .collect();

        assert_eq!(
            kinds,
            vec![
                ("delete", "old".to_string()),
                ("replace", "mail".to_string()),
                ("create", "api".to_string()),
                ("update", "web".to_string()),
            ]
        );
        assert!(plan.has_changes());
    }

    #[test]
    fn test_plan_equivalent_spellings_are_no_op() {
        let mut state = StateFile::default();
        let mut stored = web();
        stored.owner_name = "www.example.com.".to_string();
        stored.record_type = "A (1)".to_string();
        state.insert("web", web().key().identifier(), stored);

        let plan = plan(&declared(&[("web", web())]), &state);

        assert_eq!(
            plan.actions(),
            &[PlannedAction::NoOp {
                name: "web".to_string()
            }]
        );
        assert!(!plan.has_changes());
        assert!(plan.to_string().ends_with("0 to delete, 1 unchanged"));
    }

    // =====================================================
    // apply
    // =====================================================

    #[tokio::test]
    async fn test_apply_creates_and_records_state() {
        let (engine, _dir) = engine();
        let mut state = engine.load_state().unwrap();

        let summary = engine
            .apply(&declared(&[("web", web()), ("mail", mail())]), &mut state)
            .await
            .unwrap();

        assert_eq!(
            summary,
            ApplySummary {
                created: 2,
                ..ApplySummary::default()
            }
        );
        let saved = engine.load_state().unwrap();
        assert_eq!(saved.get("web").unwrap().id.as_str(), "www:example.com.:A");
        assert_eq!(saved.get("web").unwrap().record, web());
        assert_eq!(saved, state);

        // Second apply has nothing to do
        let summary = engine
            .apply(&declared(&[("web", web()), ("mail", mail())]), &mut state)
            .await
            .unwrap();
        assert_eq!(summary.unchanged, 2);
        assert_eq!(summary.created + summary.updated, 0);
    }

    #[tokio::test]
    async fn test_apply_updates_replaces_and_deletes() {
        let (engine, _dir) = engine();
        let mut state = StateFile::default();
        engine
            .apply(&declared(&[("web", web()), ("mail", mail())]), &mut state)
            .await
            .unwrap();

        let mut web_v2 = web();
        web_v2.ttl = 60;
        let mut api = web();
        api.owner_name = "api".to_string();

        let summary = engine
            .apply(&declared(&[("web", web_v2.clone()), ("api", api)]), &mut state)
            .await
            .unwrap();

        assert_eq!(summary.updated, 1);
        assert_eq!(summary.created, 1);
        assert_eq!(summary.deleted, 1);
        assert!(state.get("mail").is_none());
        assert_eq!(state.get("web").unwrap().record.ttl, 60);
        let provider = engine.lifecycle().service();
        assert_eq!(provider.stored(&web_v2.key()).unwrap().ttl, 60);
        assert!(provider.stored(&mail().key()).is_none());

        let mut moved = web_v2.clone();
        moved.owner_name = "www2".to_string();
        let summary = engine
            .apply(&declared(&[("web", moved.clone())]), &mut state)
            .await
            .unwrap();
        assert_eq!(summary.replaced, 1);
        assert_eq!(state.get("web").unwrap().id.as_str(), "www2:example.com.:A");
        assert!(provider.stored(&web_v2.key()).is_none());
        assert!(provider.stored(&moved.key()).is_some());
    }

    #[tokio::test]
    async fn test_apply_failure_keeps_completed_work() {
        let (engine, _dir) = engine();
        let mut state = StateFile::default();
        engine
            .apply(&declared(&[("web", web())]), &mut state)
            .await
            .unwrap();

        // Deleting "web" succeeds, creating "mail" fails
        let provider = engine.lifecycle().service();
        provider.fail_next_on("create", server_error());
        let records = declared(&[("mail", mail())]);
        assert!(engine.apply(&records, &mut state).await.is_err());

        let saved = engine.load_state().unwrap();
        assert!(saved.get("web").is_none());
        assert!(saved.get("mail").is_none());
        assert!(provider.stored(&web().key()).is_none());
        assert_eq!(provider.calls().last(), Some(&"create"));
    }

    // =====================================================
    // refresh / destroy / import
    // =====================================================

    #[tokio::test]
    async fn test_refresh_realigns_and_drops() {
        let (engine, _dir) = engine();
        let mut state = StateFile::default();
        engine
            .apply(&declared(&[("web", web()), ("mail", mail())]), &mut state)
            .await
            .unwrap();

        let provider = engine.lifecycle().service();
        provider.mutate(&web().key(), |rrset| rrset.ttl = 120);
        provider.delete_record(&mail().key()).await.unwrap();

        let summary = engine.refresh(&mut state).await.unwrap();

        assert_eq!(
            summary,
            RefreshSummary {
                checked: 2,
                drifted: 1,
                removed: 1
            }
        );
        assert_eq!(state.get("web").unwrap().record.ttl, 120);
        assert_eq!(state.get("web").unwrap().record.owner_name, "www");
        assert!(state.get("mail").is_none());
        assert_eq!(engine.load_state().unwrap(), state);
    }

    #[tokio::test]
    async fn test_preview_reports_drift_without_writing_state() {
        let (engine, _dir) = engine();
        let mut state = StateFile::default();
        engine
            .apply(&declared(&[("web", web())]), &mut state)
            .await
            .unwrap();
        let before = engine.load_state().unwrap();

        engine
            .lifecycle()
            .service()
            .mutate(&web().key(), |rrset| rrset.ttl = 120);
        let plan = engine
            .preview(&declared(&[("web", web())]), &state)
            .await
            .unwrap();

        assert_eq!(plan.count("update"), 1);
        assert_eq!(state.get("web").unwrap().record.ttl, 300);
        assert_eq!(engine.load_state().unwrap(), before);
    }

    #[tokio::test]
    async fn test_destroy_removes_everything() {
        let (engine, _dir) = engine();
        let mut state = StateFile::default();
        engine
            .apply(&declared(&[("web", web()), ("mail", mail())]), &mut state)
            .await
            .unwrap();
        // Already gone remotely; destroy still succeeds
        engine
            .lifecycle()
            .service()
            .delete_record(&web().key())
            .await
            .unwrap();

        let summary = engine.destroy(&mut state).await.unwrap();

        assert_eq!(summary.deleted, 2);
        assert!(state.resources.is_empty());
        assert!(engine.load_state().unwrap().resources.is_empty());
    }

    #[tokio::test]
    async fn test_import_existing_record_set() {
        let (engine, _dir) = engine();
        let provider = engine.lifecycle().service();
        provider
            .create_record(&web().key(), &web().to_rrset())
            .await
            .unwrap();
        let mut state = StateFile::default();
        let id = RecordIdentifier::from_raw("www:example.com.:A");

        let record = engine.import("web", &id, &mut state).await.unwrap();

        assert_eq!(record, web());
        assert_eq!(engine.load_state().unwrap().get("web").unwrap().id, id);

        // Importing the same name twice is refused
        assert!(engine.import("web", &id, &mut state).await.is_err());
    }

    #[tokio::test]
    async fn test_import_missing_record_set() {
        let (engine, _dir) = engine();
        let mut state = StateFile::default();
        let id = RecordIdentifier::from_raw("nope:example.com.:A");

        let err = engine.import("nope", &id, &mut state).await.unwrap_err();

        assert!(err.to_string().contains("does not exist"));
        assert!(state.resources.is_empty());
    }
}
