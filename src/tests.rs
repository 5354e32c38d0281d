#[cfg(test)]
mod tests {
    use std::env;

    use chrono::{TimeDelta, Utc};
    use serde_json::{json, Value};
    use serial_test::serial;
    use wiremock::matchers::{header, method, path, query_param, query_param_is_missing};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use crate::cache::{Cache, MemoryCache};
    use crate::feature::ProjectFlag;
    use crate::{ApiError, Auth, Client, ClientBuilder, CIRCUIT_OPEN_SECONDS};

    fn project_flag_json(id: i64, name: &str, default_enabled: bool) -> Value {
        json!({
            "created_date": "2024-03-01T09:30:00.000000Z",
            "default_enabled": default_enabled,
            "id": id,
            "initial_value": null,
            "is_archived": false,
            "is_num_identity_overrides_complete": true,
            "is_server_key_only": false,
            "multivariate_options": [],
            "name": name,
            "num_identity_overrides": 0,
            "num_segment_overrides": null,
            "owners": [],
            "owner_groups": [],
            "metadata": [],
            "project": 1,
            "tags": [],
            "type": "STANDARD",
            "uuid": format!("00000000-0000-0000-0000-{:012}", id)
        })
    }

    fn project_flag(id: i64, name: &str, default_enabled: bool) -> ProjectFlag {
        serde_json::from_value(project_flag_json(id, name, default_enabled)).unwrap()
    }

    // Helper function to create a test client with mocked API
    async fn create_test_client(server: &MockServer) -> Client {
        Client::builder()
            .with_base_url(&server.uri())
            .with_auth(Auth::ApiKey("test-key".to_string()))
            .with_project(1)
            .with_memory_cache()
            .build()
            .unwrap()
    }

    async fn mount_flags(server: &MockServer, flags: Vec<Value>) {
        Mock::given(method("GET"))
            .and(path("/projects/1/features/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "count": flags.len(),
                "next": null,
                "previous": null,
                "results": flags
            })))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_client_initialization() {
        let client = Client::builder()
            .with_base_url("https://test-api.example.com/api/v1")
            .with_max_retries(5)
            .with_auth(Auth::Token("token".to_string()))
            .with_project(7)
            .build()
            .unwrap();

        assert_eq!(client.base_url, "https://test-api.example.com/api/v1");
        assert_eq!(client.max_retries, 5);
        assert_eq!(client.project_id, Some(7));
        assert!(client.auth.is_some());
        assert!(client.debug_info().contains("authenticated: true"));
    }

    #[tokio::test]
    async fn test_build_rejects_non_http_base_url() {
        let result = Client::builder().with_base_url("ftp://example.com").build();
        assert!(matches!(result, Err(ApiError::ConfigError(_))));
    }

    #[tokio::test]
    async fn test_endpoint_joins_trailing_slash() {
        let client = Client::builder()
            .with_base_url("https://example.com/api/v1/")
            .build()
            .unwrap();

        assert_eq!(
            client.endpoint("/projects/"),
            "https://example.com/api/v1/projects/"
        );
    }

    #[tokio::test]
    async fn test_requests_send_auth_header() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/projects/"))
            .and(header("authorization", "Api-Key test-key"))
            .and(header("accept", "application/json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server).await;
        let projects = client.projects().await.unwrap();
        assert!(projects.is_empty());
    }

    #[tokio::test]
    async fn test_token_auth_scheme() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/organisations/"))
            .and(header("authorization", "Token user-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"results": []})))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = Client::builder()
            .with_base_url(&mock_server.uri())
            .with_auth(Auth::Token("user-token".to_string()))
            .build()
            .unwrap();

        let organisations = client.organisations().await.unwrap();
        assert!(organisations.is_empty());
        assert!(!organisations.has_next());
    }

    #[tokio::test]
    async fn test_missing_auth_fails_before_request() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&mock_server)
            .await;

        let client = Client::builder()
            .with_base_url(&mock_server.uri())
            .build()
            .unwrap();

        let result = client.project(1).await;
        assert!(matches!(result, Err(ApiError::AuthError(_))));
    }

    #[tokio::test]
    async fn test_empty_api_key_is_rejected() {
        let mock_server = MockServer::start().await;
        let client = Client::builder()
            .with_base_url(&mock_server.uri())
            .with_auth(Auth::ApiKey(String::new()))
            .build()
            .unwrap();

        let result = client.projects().await;
        assert!(matches!(result, Err(ApiError::AuthError(_))));
    }

    #[tokio::test]
    async fn test_error_status_carries_body() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/features/workflows/change-requests/99/"))
            .respond_with(ResponseTemplate::new(404).set_body_string("{\"detail\":\"Not found.\"}"))
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server).await;
        match client.change_request(99).await {
            Err(ApiError::StatusError { status, body }) => {
                assert_eq!(status, 404);
                assert!(body.contains("Not found."));
            }
            other => panic!("expected status error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_undecodable_body_is_decode_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/audit/5/"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server).await;
        let result = client.audit_log(5).await;
        assert!(matches!(result, Err(ApiError::DecodeError(_))));
    }

    #[tokio::test]
    async fn test_environments_filtered_by_project() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/environments/"))
            .and(query_param("project", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "count": 1,
                "results": [{
                    "id": 10,
                    "name": "Production",
                    "is_creating": false,
                    "api_key": "env-key",
                    "project": 1,
                    "allow_client_traits": true,
                    "hide_sensitive_data": false,
                    "use_v2_feature_versioning": true,
                    "metadata": [],
                    "use_identity_overrides_in_local_eval": false,
                    "use_identity_composite_key_for_hashing": true,
                    "hide_disabled_flags": null,
                    "use_mv_v2_evaluation": true,
                    "show_disabled_flags": false
                }]
            })))
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server).await;
        let environments = client.environments(1).await.unwrap();
        assert_eq!(environments.count, Some(1));
        assert_eq!(environments.results[0].api_key, "env-key");
        assert_eq!(environments.results[0].hide_disabled_flags, None);
    }

    #[tokio::test]
    async fn test_all_project_flags_follows_next_links() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/projects/1/features/"))
            .and(query_param("page", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "count": 3,
                "next": format!("{}/projects/1/features/?page=2", mock_server.uri()),
                "previous": null,
                "results": [project_flag_json(1, "first", true), project_flag_json(2, "second", false)]
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        Mock::given(method("GET"))
            .and(path("/projects/1/features/"))
            .and(query_param("page", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "count": 3,
                "next": null,
                "previous": format!("{}/projects/1/features/?page=1", mock_server.uri()),
                "results": [project_flag_json(3, "third", true)]
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server).await;
        let flags = client.all_project_flags(1).await.unwrap();

        let names: Vec<_> = flags.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["first", "second", "third"]);
    }

    #[tokio::test]
    async fn test_all_project_flags_stops_on_repeated_next_link() {
        let mock_server = MockServer::start().await;
        let second_page = format!("{}/projects/1/features/?page=2", mock_server.uri());

        Mock::given(method("GET"))
            .and(path("/projects/1/features/"))
            .and(query_param("page", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "count": 2,
                "next": second_page,
                "previous": null,
                "results": [project_flag_json(1, "first", true)]
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        Mock::given(method("GET"))
            .and(path("/projects/1/features/"))
            .and(query_param("page", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "count": 2,
                "next": second_page,
                "previous": null,
                "results": [project_flag_json(2, "second", false)]
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server).await;
        let flags = client.all_project_flags(1).await.unwrap();

        let names: Vec<_> = flags.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["first", "second"]);
    }

    #[tokio::test]
    async fn test_next_link_to_other_host_is_not_followed() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/projects/1/features/"))
            .and(query_param("page", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "count": 2,
                "next": "http://other.example.com/projects/1/features/?page=2",
                "previous": null,
                "results": [project_flag_json(1, "first", true)]
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server).await;
        let result = client.all_project_flags(1).await;

        match result {
            Err(ApiError::ForeignHostError(url)) => assert!(url.starts_with("http://other.example.com/")),
            other => panic!("expected ForeignHostError, got {:?}", other),
        }
        assert_eq!(mock_server.received_requests().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_all_edge_identities_follows_cursor() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/environments/env-key/edge-identities/"))
            .and(query_param_is_missing("last_evaluated_key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "results": [{"id": "a", "identifier": "alice"}],
                "last_evaluated_key": "cursor-1",
                "pages": [null]
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        Mock::given(method("GET"))
            .and(path("/environments/env-key/edge-identities/"))
            .and(query_param("last_evaluated_key", "cursor-1"))
            .and(query_param("page_size", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "results": [{"id": "b", "identifier": "bob", "dashboard_alias": "Bobby"}],
                "pages": [null, "cursor-1"]
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server).await;
        let identities = client.all_edge_identities("env-key", 1).await.unwrap();

        assert_eq!(identities.len(), 2);
        assert_eq!(identities[0].display_name(), "alice");
        assert_eq!(identities[1].display_name(), "Bobby");
    }

    #[tokio::test]
    async fn test_all_edge_identities_stops_on_repeated_cursor() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/environments/env-key/edge-identities/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "results": [{"id": "a", "identifier": "alice"}],
                "last_evaluated_key": "stuck"
            })))
            .expect(2)
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server).await;
        let identities = client.all_edge_identities("env-key", 10).await.unwrap();
        assert_eq!(identities.len(), 2);
    }

    #[tokio::test]
    async fn test_release_pipeline_detail() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/projects/1/release-pipelines/3/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": 3,
                "name": "Rollout",
                "project": 1,
                "description": "",
                "stages_count": 2,
                "published_at": "2025-01-10T12:00:00Z",
                "published_by": 4,
                "features_count": 1,
                "completed_features": [],
                "stages": [
                    {
                        "id": 21, "name": "Production", "pipeline": 3, "environment": 11, "order": 1,
                        "trigger": {"trigger_type": "WAIT_FOR", "trigger_body": {"wait_for": "1:00:00"}},
                        "actions": [{"id": 1, "action_type": "TOGGLE_FEATURE", "action_body": {"enabled": true}}],
                        "features": []
                    },
                    {
                        "id": 20, "name": "Staging", "pipeline": 3, "environment": 10, "order": 0,
                        "trigger": {"trigger_type": "ON_ENTER", "trigger_body": null},
                        "actions": [],
                        "features": [42]
                    }
                ]
            })))
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server).await;
        let pipeline = client.release_pipeline(1, 3).await.unwrap();

        let names: Vec<_> = pipeline.ordered_stages().iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Staging", "Production"]);
        assert_eq!(pipeline.stage_of(42).map(|s| s.id), Some(20));
    }

    #[tokio::test]
    async fn test_flag_lookup_from_cache() {
        let mock_server = MockServer::start().await;
        mount_flags(
            &mock_server,
            vec![project_flag_json(1, "Test-Flag", true), project_flag_json(2, "disabled-flag", false)],
        )
        .await;

        let client = create_test_client(&mock_server).await;

        assert!(client.flag("test-flag").default_enabled().await);
        assert!(!client.flag("disabled-flag").default_enabled().await);
        assert!(!client.flag("non-existent-flag").default_enabled().await);

        let flag = client.flag("TEST-FLAG").get().await.unwrap();
        assert_eq!(flag.id, 1);
    }

    #[tokio::test]
    async fn test_flag_list_uses_single_fetch() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/projects/1/features/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "results": [project_flag_json(2, "flag2", false), project_flag_json(1, "flag1", true)]
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server).await;

        let _ = client.flag("flag1").get().await;
        let flags = client.list().await.unwrap();

        assert_eq!(flags.len(), 2);
        assert_eq!(flags[0].name, "flag1");
        assert_eq!(flags[1].name, "flag2");
    }

    #[tokio::test]
    async fn test_flag_lookup_without_project_is_empty() {
        let mock_server = MockServer::start().await;
        let client = Client::builder()
            .with_base_url(&mock_server.uri())
            .with_auth(Auth::ApiKey("test-key".to_string()))
            .build()
            .unwrap();

        assert!(client.flag("anything").get().await.is_none());
        assert!(client.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    #[serial]
    async fn test_local_environment_flags() {
        env::set_var("FLAGSMITH_FLAG_TEST_ENV_FLAG", "true");
        env::set_var("FLAGSMITH_FLAG_ANOTHER_FLAG", "false");

        let mock_server = MockServer::start().await;
        mount_flags(&mock_server, vec![project_flag_json(1, "another_flag", true)]).await;
        let client = create_test_client(&mock_server).await;

        assert!(client.flag("test_env_flag").default_enabled().await);
        assert!(client.flag("test-env-flag").default_enabled().await);
        assert!(client.flag("test env flag").default_enabled().await);
        // The environment wins over the project default.
        assert!(!client.flag("another_flag").default_enabled().await);

        env::remove_var("FLAGSMITH_FLAG_TEST_ENV_FLAG");
        env::remove_var("FLAGSMITH_FLAG_ANOTHER_FLAG");
    }

    #[tokio::test]
    #[serial]
    async fn test_builder_from_env() {
        env::set_var("FLAGSMITH_API_URL", "https://flags.internal.example.com/api/v1");
        env::set_var("FLAGSMITH_API_TOKEN", "from-env");
        env::remove_var("FLAGSMITH_API_KEY");
        env::set_var("FLAGSMITH_PROJECT_ID", "12");

        let client = ClientBuilder::from_env().unwrap().build().unwrap();
        assert_eq!(client.base_url, "https://flags.internal.example.com/api/v1");
        assert_eq!(client.project_id, Some(12));
        assert!(matches!(client.auth, Some(Auth::Token(ref t)) if t == "from-env"));

        env::set_var("FLAGSMITH_PROJECT_ID", "twelve");
        assert!(matches!(ClientBuilder::from_env(), Err(ApiError::ConfigError(_))));

        env::remove_var("FLAGSMITH_API_URL");
        env::remove_var("FLAGSMITH_API_TOKEN");
        env::remove_var("FLAGSMITH_PROJECT_ID");
    }

    #[tokio::test]
    #[serial]
    async fn test_builder_from_env_skips_blank_credentials() {
        env::remove_var("FLAGSMITH_API_URL");
        env::remove_var("FLAGSMITH_PROJECT_ID");
        env::set_var("FLAGSMITH_API_KEY", "");
        env::set_var("FLAGSMITH_API_TOKEN", "from-env");

        let builder = ClientBuilder::from_env().unwrap();
        assert!(matches!(builder.auth, Some(Auth::Token(ref t)) if t == "from-env"));

        env::set_var("FLAGSMITH_API_TOKEN", "  ");
        let builder = ClientBuilder::from_env().unwrap();
        assert!(builder.auth.is_none());

        env::remove_var("FLAGSMITH_API_KEY");
        env::remove_var("FLAGSMITH_API_TOKEN");
    }

    #[tokio::test]
    async fn test_circuit_breaker() {
        let _ = env_logger::builder().is_test(true).try_init();
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/projects/1/features/"))
            .respond_with(ResponseTemplate::new(500)
                .set_body_json(json!({"error": "Internal Server Error"}))
            )
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = Client::builder()
            .with_base_url(&mock_server.uri())
            .with_auth(Auth::ApiKey("test-key".to_string()))
            .with_project(1)
            .with_max_retries(1)
            .build()
            .unwrap();

        // Fails without panicking and opens the circuit
        assert!(!client.flag("circuit-test-flag").default_enabled().await);
        assert!(client.circuit_state.read().await.is_open);

        // While open, lookups are served from the cache without a request
        assert!(client.flag("circuit-test-flag").get().await.is_none());
    }

    #[tokio::test]
    async fn test_flag_served_after_retry() {
        let _ = env_logger::builder().is_test(true).try_init();
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/projects/1/features/"))
            .respond_with(ResponseTemplate::new(500))
            .up_to_n_times(1)
            .expect(1)
            .mount(&mock_server)
            .await;
        mount_flags(&mock_server, vec![project_flag_json(1, "retry-flag", true)]).await;

        let client = Client::builder()
            .with_base_url(&mock_server.uri())
            .with_auth(Auth::ApiKey("test-key".to_string()))
            .with_project(1)
            .with_max_retries(2)
            .build()
            .unwrap();

        assert!(client.flag("retry-flag").default_enabled().await);

        let circuit_state = client.circuit_state.read().await;
        assert!(!circuit_state.is_open);
        assert_eq!(circuit_state.failure_count, 0);
    }

    #[tokio::test]
    async fn test_circuit_closes_after_open_window() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/projects/1/features/"))
            .respond_with(ResponseTemplate::new(500))
            .up_to_n_times(1)
            .mount(&mock_server)
            .await;
        mount_flags(&mock_server, vec![project_flag_json(1, "window-flag", true)]).await;

        let client = Client::builder()
            .with_base_url(&mock_server.uri())
            .with_auth(Auth::ApiKey("test-key".to_string()))
            .with_project(1)
            .with_max_retries(1)
            .build()
            .unwrap();

        assert!(!client.flag("window-flag").default_enabled().await);
        assert!(client.circuit_state.read().await.is_open);

        // Still inside the window: no request goes out
        assert!(client.flag("window-flag").get().await.is_none());
        assert_eq!(mock_server.received_requests().await.unwrap().len(), 1);

        client.circuit_state.write().await.last_failure =
            Some(Utc::now() - TimeDelta::seconds(CIRCUIT_OPEN_SECONDS + 1));

        assert!(client.flag("window-flag").default_enabled().await);
        assert!(!client.circuit_state.read().await.is_open);
        assert_eq!(mock_server.received_requests().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_memory_cache() {
        let mut cache = MemoryCache::new();
        cache.init().await.unwrap();

        assert!(cache.should_refresh_cache().await);
        assert!(cache.get("test-flag").await.unwrap().is_none());

        cache.refresh(&[project_flag(1, "Test-Flag", true)], 60).await.unwrap();

        let flag = cache.get("test-flag").await.unwrap().unwrap();
        assert!(flag.default_enabled);
        assert_eq!(cache.get_all().await.unwrap().len(), 1);
        assert!(!cache.should_refresh_cache().await);
    }

    #[tokio::test]
    async fn test_cache_refresh_replaces_contents() {
        let mut cache = MemoryCache::new();

        cache.refresh(&[project_flag(1, "old-flag", true)], 0).await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        assert!(cache.should_refresh_cache().await);

        cache.refresh(&[project_flag(2, "new-flag", false)], 60).await.unwrap();

        assert!(cache.get("old-flag").await.unwrap().is_none());
        let flag = cache.get("new-flag").await.unwrap().unwrap();
        assert!(!flag.default_enabled);
    }
}
