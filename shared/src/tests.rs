#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::collections::{HashMap, VecDeque};
    use std::rc::Rc;

    use async_trait::async_trait;
    use futures::executor::block_on;
    use serde_json::{json, Value};

    use crate::action::ActionOutcome;
    use crate::admin::{self, AdminApi, AdminEvent, AdminState, Panel, Refresh, ALL_REFRESHES};
    use crate::alert::AlertLevel;
    use crate::error::{ErrorResponse, TransportError, NETWORK_ERROR_MESSAGE};
    use crate::gateway::{ApiRequest, ApiResponse, FormValue, Gateway, Method, RequestBody, RequestOptions, Transport, UploadFile};
    use crate::models::{ElectionsPayload, Empty, VoterRequest};
    use crate::portal::{self, PortalApi, PortalState};
    use crate::render::{uploaded_photo_url, PortalBanner, ResultsView, StatusPanel};
    use crate::session::{ProbeOutcome, View};
    use crate::validation::ValidationError;

    type Reply = Result<String, TransportError>;

    /// Scripted backend. Each path answers from its queue; the last answer
    /// repeats. Unscripted paths fail at the transport level.
    #[derive(Clone, Default)]
    struct MockTransport {
        routes: Rc<RefCell<HashMap<String, VecDeque<Reply>>>>,
        sent: Rc<RefCell<Vec<ApiRequest>>>,
    }

    impl MockTransport {
        fn reply(&self, path: &str, body: Value) -> &Self {
            self.script(path, Ok(body.to_string()))
        }

        fn reply_raw(&self, path: &str, body: &str) -> &Self {
            self.script(path, Ok(body.to_string()))
        }

        fn refuse(&self, path: &str, message: &str) -> &Self {
            let body = serde_json::to_string(&ErrorResponse::new(message)).unwrap();
            self.script(path, Ok(body))
        }

        fn drop_connection(&self, path: &str) -> &Self {
            self.script(path, Err(TransportError::Network("connection reset".into())))
        }

        fn script(&self, path: &str, reply: Reply) -> &Self {
            self.routes.borrow_mut().entry(path.to_string()).or_default().push_back(reply);
            self
        }

        fn requests(&self) -> Vec<ApiRequest> {
            self.sent.borrow().clone()
        }

        fn paths(&self) -> Vec<String> {
            self.sent.borrow().iter().map(|r| r.path.clone()).collect()
        }

        fn json_body(&self, path: &str) -> Value {
            let sent = self.sent.borrow();
            let request = sent.iter().rev().find(|r| r.path == path).expect("request was sent");
            match &request.body {
                RequestBody::Json(body) => serde_json::from_str(body).unwrap(),
                other => panic!("expected a JSON body, got {:?}", other),
            }
        }
    }

    #[async_trait(?Send)]
    impl Transport for MockTransport {
        async fn send(&self, request: ApiRequest) -> Reply {
            let path = request.path.clone();
            self.sent.borrow_mut().push(request);
            let mut routes = self.routes.borrow_mut();
            match routes.get_mut(&path) {
                Some(queue) if queue.len() > 1 => queue.pop_front().unwrap(),
                Some(queue) => queue.front().cloned().unwrap(),
                None => Err(TransportError::Network(format!("no route for {}", path))),
            }
        }
    }

    fn election(id: &str, title: &str, status: &str) -> Value {
        let ended_at = if status == "ended" { json!("2024-03-06T18:00:00") } else { Value::Null };
        json!({
            "id": id,
            "title": title,
            "description": format!("{} description", title),
            "status": status,
            "created_at": "2024-03-01T09:00:00.123456",
            "started_at": "2024-03-05T14:30:00",
            "ended_at": ended_at,
        })
    }

    fn voter() -> Value {
        json!({ "name": "Asha", "roll_number": "R-17", "phone": "5550100", "email": "asha@example.edu", "photo": null, "has_voted": false })
    }

    fn candidates() -> Value {
        json!([
            { "id": "cand_X", "name": "Xavier", "photo": null, "votes": 0 },
            { "id": "cand_Y", "name": "Yara", "photo": null, "votes": 0 },
        ])
    }

    fn rejected_locally<T>(outcome: &ActionOutcome<T>, err: ValidationError) -> bool {
        matches!(outcome, ActionOutcome::Invalid(alert) if alert.message == err.to_string())
    }

    fn never(_: &str) -> bool {
        false
    }

    fn always(_: &str) -> bool {
        true
    }

    fn signed_in_portal(mock: &MockTransport) -> (PortalApi<MockTransport>, PortalState) {
        mock.reply("/voter-info", json!({ "success": true, "voter": voter(), "has_voted": false, "current_election": null }));
        let api = PortalApi::new(mock.clone());
        let mut state = PortalState::default();
        assert!(state.apply_probe(block_on(portal::bootstrap(&api))));
        (api, state)
    }

    // Gateway

    #[test]
    fn test_gateway_sets_json_content_type() {
        let mock = MockTransport::default();
        mock.reply("/admin/create-election", json!({ "success": true }));
        let gateway = Gateway::new(mock.clone());

        let response: ApiResponse<Empty> = block_on(gateway.post_json("/admin/create-election", &json!({ "title": "T" })));
        assert!(response.success);

        let request = &mock.requests()[0];
        assert_eq!(request.method, Method::Post);
        assert_eq!(request.header("content-type"), Some("application/json"));
    }

    #[test]
    fn test_gateway_caller_headers_override_defaults() {
        let mock = MockTransport::default();
        mock.reply("/x", json!({ "success": true }));
        let gateway = Gateway::new(mock.clone());

        let options = RequestOptions {
            headers: vec![("content-type".into(), "text/plain".into()), ("X-Trace".into(), "1".into())],
            ..Default::default()
        };
        let _: ApiResponse<Empty> = block_on(gateway.call("/x", options));

        let request = &mock.requests()[0];
        assert_eq!(request.header("Content-Type"), Some("text/plain"));
        assert_eq!(request.header("x-trace"), Some("1"));
        assert_eq!(request.headers.iter().filter(|(k, _)| k.eq_ignore_ascii_case("content-type")).count(), 1);
    }

    #[test]
    fn test_gateway_leaves_multipart_content_type_to_transport() {
        let mock = MockTransport::default();
        mock.reply("/admin/load-voters", json!({ "success": true }));
        let api = AdminApi::new(mock.clone());
        let file = UploadFile { file_name: "voters.xlsx".into(), content_type: "application/octet-stream".into(), bytes: vec![1, 2, 3] };

        assert!(block_on(api.load_voters(file)).success);
        assert_eq!(mock.requests()[0].header("content-type"), None);
    }

    #[test]
    fn test_gateway_folds_failures_into_network_error() {
        let mock = MockTransport::default();
        mock.drop_connection("/down").reply_raw("/garbled", "<html>502</html>");
        let gateway = Gateway::new(mock);

        let down: ApiResponse<Empty> = block_on(gateway.get("/down"));
        let garbled: ApiResponse<Empty> = block_on(gateway.get("/garbled"));
        for response in [down, garbled] {
            assert!(!response.success);
            assert_eq!(response.message.as_deref(), Some(NETWORK_ERROR_MESSAGE));
        }
    }

    #[test]
    fn test_missing_success_flag_counts_as_failure() {
        let response = ApiResponse::<Empty>::decode(r#"{"message": "hmm"}"#).unwrap();
        assert!(!response.success);
        assert_eq!(response.payload, None);

        let response = ApiResponse::<Empty>::decode(r#"{"success": "yes"}"#).unwrap();
        assert!(!response.success);
    }

    // Session bootstrap

    #[test]
    fn test_admin_probe_fails_open_to_login() {
        let mock = MockTransport::default();
        mock.drop_connection("/admin/elections");
        let api = AdminApi::new(mock.clone());
        let mut state = AdminState::default();

        let refreshes = state.apply(block_on(admin::bootstrap(&api)));
        assert_eq!(state.view, View::Login);
        assert!(refreshes.is_empty());

        mock.routes.borrow_mut().clear();
        mock.refuse("/admin/elections", "Unauthorized");
        let mut state = AdminState::default();
        state.apply(block_on(admin::bootstrap(&api)));
        assert_eq!(state.view, View::Login);
    }

    #[test]
    fn test_admin_probe_success_loads_everything() {
        let mock = MockTransport::default();
        mock.reply("/admin/elections", json!({ "success": true, "elections": [], "current_election": null }));
        let api = AdminApi::new(mock);
        let mut state = AdminState::default();

        let refreshes = state.apply(block_on(admin::bootstrap(&api)));
        assert_eq!(state.view, View::Dashboard);
        assert_eq!(refreshes, ALL_REFRESHES.to_vec());
    }

    #[test]
    fn test_portal_probe_without_voter_is_anonymous() {
        let mock = MockTransport::default();
        mock.reply("/voter-info", json!({ "success": true }));
        let api = PortalApi::new(mock);
        let mut state = PortalState::default();

        assert!(!state.apply_probe(block_on(portal::bootstrap(&api))));
        assert_eq!(state.view(), View::Login);
        assert!(!state.session.is_authenticated());
    }

    // Admin handlers

    #[test]
    fn test_login_requires_password_before_any_request() {
        let mock = MockTransport::default();
        let api = AdminApi::new(mock.clone());

        let outcome = block_on(admin::login(&api, "   "));
        let alert = outcome.alert().unwrap();
        assert_eq!(alert.level, AlertLevel::Warning);
        assert_eq!(alert.message, "Please enter the admin password");
        assert!(mock.requests().is_empty());
    }

    #[test]
    fn test_login_success_switches_to_dashboard() {
        let mock = MockTransport::default();
        mock.reply("/admin/login", json!({ "success": true, "message": "ok" }));
        let api = AdminApi::new(mock.clone());
        let mut state = AdminState::default();

        let followup = state.absorb(block_on(admin::login(&api, " s3cret ")));
        assert_eq!(state.view, View::Dashboard);
        assert_eq!(followup.refreshes, ALL_REFRESHES.to_vec());
        assert_eq!(state.alerts.last().unwrap().message, "Admin authenticated successfully!");
        assert_eq!(mock.json_body("/admin/login"), json!({ "secret_key": "s3cret" }));
    }

    #[test]
    fn test_login_failure_shows_server_message() {
        let mock = MockTransport::default();
        mock.refuse("/admin/login", "Invalid secret key");
        let api = AdminApi::new(mock);

        let outcome = block_on(admin::login(&api, "wrong"));
        assert!(matches!(&outcome, ActionOutcome::Failed(alert) if alert.message == "Invalid secret key" && alert.level == AlertLevel::Danger));
    }

    #[test]
    fn test_declined_confirmation_sends_nothing() {
        let mock = MockTransport::default();
        let api = AdminApi::new(mock.clone());

        assert_eq!(block_on(admin::stop_election(&api, &never)), ActionOutcome::Aborted);
        assert_eq!(block_on(admin::delete_candidate(&api, "cand_X", "Xavier", &never)), ActionOutcome::Aborted);
        assert_eq!(block_on(admin::delete_voter(&api, "5550100", "Asha", &never)), ActionOutcome::Aborted);
        assert!(mock.requests().is_empty());
    }

    #[test]
    fn test_confirmation_prompts_name_the_target() {
        let mock = MockTransport::default();
        mock.reply("/admin/delete-voter", json!({ "success": true, "message": "Voter Asha deleted" }));
        let api = AdminApi::new(mock);
        let prompts = RefCell::new(Vec::new());
        let confirm = |message: &str| {
            prompts.borrow_mut().push(message.to_string());
            true
        };

        let outcome = block_on(admin::delete_voter(&api, "5550100", "Asha", &confirm));
        assert_eq!(prompts.borrow()[0], "Are you sure you want to delete voter \"Asha\"?\n\nThis action cannot be undone.");
        match outcome {
            ActionOutcome::Succeeded(sync) => {
                assert_eq!(sync.alert.unwrap().message, "Voter Asha deleted");
                assert_eq!(sync.resync, vec![Refresh::Voters]);
            }
            other => panic!("unexpected outcome {:?}", other),
        }
    }

    #[test]
    fn test_election_deletion_needs_exact_phrase() {
        let mock = MockTransport::default();
        mock.reply("/admin/delete-election", json!({ "success": true }));
        let api = AdminApi::new(mock.clone());

        for typed in ["delete", " DELETE", ""] {
            let outcome = block_on(admin::delete_election(&api, "election_1", typed));
            assert!(rejected_locally(&outcome, ValidationError::ConfirmationMismatch));
        }
        assert!(mock.requests().is_empty());

        let outcome = block_on(admin::delete_election(&api, "election_1", "DELETE"));
        match outcome {
            ActionOutcome::Succeeded(sync) => assert_eq!(sync.resync, vec![Refresh::Elections, Refresh::ElectionStatus]),
            other => panic!("unexpected outcome {:?}", other),
        }
        assert_eq!(mock.json_body("/admin/delete-election"), json!({ "election_id": "election_1" }));
    }

    #[test]
    fn test_start_and_stop_resync_status_and_results() {
        let mock = MockTransport::default();
        mock.reply("/admin/start-election", json!({ "success": true }))
            .reply("/admin/stop-election", json!({ "success": true }));
        let api = AdminApi::new(mock);

        let expected = vec![Refresh::ElectionStatus, Refresh::Results];
        assert!(matches!(block_on(admin::start_election(&api, "election_2")), ActionOutcome::Succeeded(s) if s.resync == expected));
        assert!(matches!(block_on(admin::stop_election(&api, &always)), ActionOutcome::Succeeded(s) if s.resync == expected));
        assert!(rejected_locally(&block_on(admin::start_election(&api, "")), ValidationError::NoElectionSelected));
    }

    #[test]
    fn test_voter_forms_validate_every_field() {
        let mock = MockTransport::default();
        let api = AdminApi::new(mock.clone());
        let incomplete = VoterRequest { name: "Asha".into(), phone: " ".into(), roll_number: "R-17".into(), email: "a@b.c".into() };

        assert!(rejected_locally(&block_on(admin::add_voter(&api, &incomplete)), ValidationError::IncompleteVoter));
        assert!(rejected_locally(&block_on(admin::update_voter(&api, "5550100", &incomplete)), ValidationError::IncompleteVoterEdit));
        assert!(rejected_locally(&block_on(admin::upload_voters(&api, None)), ValidationError::MissingSpreadsheet));
        assert!(mock.requests().is_empty());
    }

    #[test]
    fn test_update_voter_sends_original_phone_alongside_fields() {
        let mock = MockTransport::default();
        mock.reply("/admin/update-voter", json!({ "success": true }));
        let api = AdminApi::new(mock.clone());
        let edited = VoterRequest { name: "Asha K".into(), phone: "5550199".into(), roll_number: "R-17".into(), email: "asha@example.edu".into() };

        assert!(block_on(admin::update_voter(&api, "5550100", &edited)).is_success());
        assert_eq!(
            mock.json_body("/admin/update-voter"),
            json!({ "original_phone": "5550100", "name": "Asha K", "phone": "5550199", "roll_number": "R-17", "email": "asha@example.edu" })
        );
    }

    #[test]
    fn test_edit_voter_looks_up_by_phone() {
        let mock = MockTransport::default();
        mock.reply("/admin/voters", json!({ "success": true, "voters": [voter()] }));
        let api = AdminApi::new(mock);

        assert!(matches!(block_on(admin::edit_voter(&api, "5550100")), ActionOutcome::Succeeded(v) if v.name == "Asha"));
        assert_eq!(block_on(admin::edit_voter(&api, "0000000")), ActionOutcome::Aborted);
    }

    #[test]
    fn test_admin_logout_returns_to_login_even_when_call_fails() {
        let mock = MockTransport::default();
        mock.drop_connection("/admin/logout");
        let api = AdminApi::new(mock);
        let mut state = AdminState { view: View::Dashboard, ..Default::default() };
        state.apply(AdminEvent::VotersLoaded(ApiResponse { success: true, message: None, payload: Some(Default::default()) }));

        state.absorb(block_on(admin::logout(&api)));
        assert_eq!(state.view, View::Login);
        assert_eq!(state.voters, Panel::Loading);
    }

    // Refreshes

    #[test]
    fn test_refresh_is_idempotent() {
        let mock = MockTransport::default();
        mock.reply("/admin/results", json!({
            "success": true,
            "results": { "election": election("election_1", "Council", "active"), "candidates": candidates(), "total_votes": 0 }
        }))
        .reply("/admin/elections", json!({
            "success": true,
            "elections": [election("election_1", "Council", "active"), election("election_0", "Old", "ended")],
            "current_election": election("election_1", "Council", "active"),
        }));
        let api = AdminApi::new(mock);

        let mut once = AdminState::default();
        for which in ALL_REFRESHES {
            if which != Refresh::Candidates && which != Refresh::Voters {
                once.apply(block_on(admin::refresh(&api, which)));
            }
        }
        let mut twice = once.clone();
        for which in [Refresh::Results, Refresh::ElectionStatus, Refresh::PastElections, Refresh::Elections] {
            twice.apply(block_on(admin::refresh(&api, which)));
        }
        assert_eq!(once, twice);
        assert_eq!(once.status, Panel::Ready(StatusPanel::Active { title: "Council".into(), description: "Council description".into() }));
        assert_eq!(once.startable_elections().len(), 1);
    }

    #[test]
    fn test_failed_refresh_keeps_or_reports_per_section() {
        let mut state = AdminState::default();
        let payload = ElectionsPayload { elections: vec![], current_election: None };
        state.apply(AdminEvent::StatusLoaded(ApiResponse { success: true, message: None, payload: Some(payload) }));

        state.apply(AdminEvent::StatusLoaded(ApiResponse::network_failure()));
        state.apply(AdminEvent::ResultsLoaded(ApiResponse { success: false, message: Some("Database unavailable".into()), payload: None }));

        assert_eq!(state.status, Panel::Ready(StatusPanel::Inactive));
        assert_eq!(state.results, Panel::Failed("Database unavailable".into()));
    }

    #[test]
    fn test_results_without_election_explain_themselves() {
        let mut state = AdminState::default();
        state.apply(AdminEvent::ResultsLoaded(ApiResponse { success: true, message: None, payload: Some(Default::default()) }));
        assert_eq!(
            state.results,
            Panel::Ready(ResultsView::Unavailable("No active election. Start an election to see results."))
        );
    }

    #[test]
    fn test_absorbed_alerts_can_be_dismissed() {
        let mut state = AdminState::default();
        let followup = state.absorb(ValidationError::MissingCandidateName.into());
        let id = followup.alert.unwrap();
        assert!(!state.alerts.is_empty());
        state.alerts.dismiss(id);
        assert!(state.alerts.is_empty());
    }

    // Voter portal

    #[test]
    fn test_vote_x_then_y_sends_y() {
        let mock = MockTransport::default();
        let (api, mut state) = signed_in_portal(&mock);
        mock.reply("/check-voter-status", json!({ "success": true, "has_voted": false }))
            .reply("/get-candidates", json!({ "success": true, "candidates": candidates() }))
            .reply("/cast-vote", json!({ "success": true, "message": "Vote recorded" }));

        state.absorb_candidates(block_on(portal::start_voting(&api, "5550100")));
        state.select("cand_X");
        state.select("cand_Y");
        state.proceed();
        let (candidate, phone) = state.begin_vote().unwrap();
        let followup = state.absorb_vote(block_on(portal::cast_vote(&api, &candidate, &phone)));

        assert_eq!(mock.json_body("/cast-vote"), json!({ "candidate_id": "cand_Y", "phone": "5550100" }));
        assert_eq!(mock.paths().iter().filter(|p| *p == "/cast-vote").count(), 1);
        assert!(followup.reload_status);
        assert_eq!(followup.alerts.len(), 2);
        assert_eq!(state.flow.selected(), None);
        assert!(!state.flow.is_open());
    }

    #[test]
    fn test_rejected_vote_keeps_selection() {
        let mock = MockTransport::default();
        let (api, mut state) = signed_in_portal(&mock);
        mock.reply("/check-voter-status", json!({ "success": true, "has_voted": false }))
            .reply("/get-candidates", json!({ "success": true, "candidates": candidates() }))
            .refuse("/cast-vote", "Already voted");

        state.absorb_candidates(block_on(portal::start_voting(&api, "5550100")));
        state.select("cand_X");
        state.proceed();
        let (candidate, phone) = state.begin_vote().unwrap();
        let followup = state.absorb_vote(block_on(portal::cast_vote(&api, &candidate, &phone)));

        assert!(!followup.reload_status);
        assert_eq!(state.flow.selected(), Some("cand_X"));
        let alert = state.alerts.last().unwrap();
        assert_eq!(alert.level, AlertLevel::Danger);
        assert_eq!(alert.message, "Already voted");
    }

    #[test]
    fn test_proceed_without_selection_warns() {
        let mock = MockTransport::default();
        let (api, mut state) = signed_in_portal(&mock);
        mock.reply("/check-voter-status", json!({ "success": true, "has_voted": false }))
            .reply("/get-candidates", json!({ "success": true, "candidates": candidates() }));

        state.absorb_candidates(block_on(portal::start_voting(&api, "5550100")));
        let followup = state.proceed();
        assert_eq!(followup.alerts.len(), 1);
        assert_eq!(state.alerts.last().unwrap().message, "Please select a candidate first");
        assert_eq!(state.begin_vote(), None);
    }

    #[test]
    fn test_start_voting_rechecks_has_voted() {
        let mock = MockTransport::default();
        let (api, mut state) = signed_in_portal(&mock);
        mock.reply("/check-voter-status", json!({ "success": true, "has_voted": true }));

        state.absorb_candidates(block_on(portal::start_voting(&api, "5550100")));
        assert!(!mock.paths().contains(&"/get-candidates".to_string()));
        assert!(!state.flow.is_open());
        let alert = state.alerts.last().unwrap();
        assert_eq!(alert.level, AlertLevel::Warning);
        assert_eq!(alert.message, "You have already voted in this election.");
    }

    #[test]
    fn test_status_banner_falls_back_to_last_election() {
        let mock = MockTransport::default();
        mock.reply("/election-status", json!({ "success": true, "election": null }))
            .reply("/get-last-election", json!({ "success": true, "election": election("election_0", "Old", "ended") }));
        let api = PortalApi::new(mock.clone());

        let banner = block_on(portal::load_election_status(&api, "5550100"));
        assert_eq!(banner, PortalBanner::Ended { title: "Old".into(), ended: Some("2024-03-06 18:00".into()) });
        assert!(banner.shows_results());
        assert!(!mock.paths().contains(&"/check-voter-status".to_string()));
    }

    #[test]
    fn test_status_banner_for_voter_who_already_voted() {
        let mock = MockTransport::default();
        let (api, mut state) = signed_in_portal(&mock);
        mock.reply("/election-status", json!({ "success": true, "election": election("election_1", "Council", "active") }))
            .reply("/check-voter-status", json!({ "success": true, "has_voted": false }))
            .reply("/get-candidates", json!({ "success": true, "candidates": candidates() }));
        state.absorb_candidates(block_on(portal::start_voting(&api, "5550100")));
        assert!(state.flow.is_open());

        mock.routes.borrow_mut().remove("/check-voter-status");
        mock.reply("/check-voter-status", json!({ "success": true, "has_voted": true }));
        state.set_banner(block_on(portal::load_election_status(&api, "5550100")));

        assert_eq!(state.banner, PortalBanner::Voted { title: "Council".into() });
        assert!(!state.flow.is_open());
    }

    #[test]
    fn test_photo_upload_validates_then_posts_multipart() {
        let mock = MockTransport::default();
        let (api, mut state) = signed_in_portal(&mock);
        mock.reply("/upload-voter-photo", json!({ "success": true, "filename": "5550100.jpg" }));

        let text = UploadFile { file_name: "notes.txt".into(), content_type: "text/plain".into(), bytes: vec![0; 10] };
        let huge = UploadFile { file_name: "big.png".into(), content_type: "image/png".into(), bytes: vec![0; 5 * 1024 * 1024 + 1] };
        assert!(rejected_locally(&block_on(portal::upload_photo(&api, "5550100", None)), ValidationError::MissingPhoto));
        assert!(rejected_locally(&block_on(portal::upload_photo(&api, "5550100", Some(text))), ValidationError::NotAnImage));
        assert!(rejected_locally(&block_on(portal::upload_photo(&api, "5550100", Some(huge))), ValidationError::PhotoTooLarge));
        assert!(!mock.paths().contains(&"/upload-voter-photo".to_string()));

        let photo = UploadFile { file_name: "me.jpg".into(), content_type: "image/jpeg".into(), bytes: vec![0xFF, 0xD8] };
        state.absorb_photo(block_on(portal::upload_photo(&api, "5550100", Some(photo))));
        assert_eq!(state.photo_url().as_deref(), Some(uploaded_photo_url("5550100.jpg").as_str()));

        let request = mock.requests().into_iter().find(|r| r.path == "/upload-voter-photo").unwrap();
        match request.body {
            RequestBody::Multipart(parts) => {
                assert_eq!(parts[0].name, "photo");
                assert_eq!(parts[1].name, "phone");
                assert_eq!(parts[1].value, FormValue::Text("5550100".into()));
            }
            other => panic!("expected multipart, got {:?}", other),
        }
    }

    #[test]
    fn test_portal_logout_clears_session_regardless_of_server() {
        let mock = MockTransport::default();
        let (api, mut state) = signed_in_portal(&mock);
        mock.drop_connection("/logout");

        assert_eq!(block_on(portal::logout(&api, &never)), ActionOutcome::Aborted);
        assert!(state.session.is_authenticated());

        assert!(block_on(portal::logout(&api, &always)).is_success());
        state.logged_out();
        assert_eq!(state.view(), View::Login);
        assert_eq!(state.session.voter(), None);
        assert_eq!(state.banner, PortalBanner::Loading);
    }

    #[test]
    fn test_identity_verification() {
        let mock = MockTransport::default();
        mock.refuse("/verify-google-token", "Email not registered as voter");
        let api = PortalApi::new(mock.clone());
        let mut state = PortalState::default();

        let followup = state.absorb_identity(block_on(portal::verify_identity(&api, "token-1")));
        assert!(!followup.reload_status);
        assert_eq!(state.alerts.last().unwrap().message, "Email not registered as voter");
        assert_eq!(mock.json_body("/verify-google-token"), json!({ "idToken": "token-1" }));

        mock.routes.borrow_mut().clear();
        mock.reply("/verify-google-token", json!({ "success": true, "voter": voter() }));
        let followup = state.absorb_identity(block_on(portal::verify_identity(&api, "token-2")));
        assert!(followup.reload_status);
        assert_eq!(state.view(), View::Dashboard);
    }

    #[test]
    fn test_sign_in_error_messages() {
        assert_eq!(
            portal::sign_in_error_message("auth/popup-blocked", None),
            "Google Sign-In failed: Popup was blocked. Please allow popups and try again."
        );
        assert_eq!(portal::sign_in_error_message("auth/other", Some("boom")), "Google Sign-In failed: boom");
        assert_eq!(portal::sign_in_error_message("auth/other", None), "Google Sign-In failed: Unknown error occurred.");
    }

    #[test]
    fn test_portal_results_view() {
        let mock = MockTransport::default();
        mock.reply("/get-election-results", json!({
            "success": true,
            "results": {
                "election": election("election_0", "Old", "ended"),
                "candidates": [
                    { "id": "a", "name": "A", "votes": 1 },
                    { "id": "b", "name": "B", "votes": 3 },
                ],
                "total_votes": 4,
            }
        }));
        let api = PortalApi::new(mock);
        let mut state = PortalState::default();

        state.absorb_results(block_on(portal::view_results(&api)));
        match state.results {
            Some(ResultsView::Tally(view)) => {
                assert_eq!(view.leader().unwrap().name, "B");
                assert_eq!(view.rows.items()[0].percentage_label, "75.0");
            }
            other => panic!("unexpected results {:?}", other),
        }
    }

    #[test]
    fn test_probe_outcome_maps_to_view() {
        let probe: ProbeOutcome<Empty> = ProbeOutcome::from_response(ApiResponse::network_failure());
        assert_eq!(probe.view(), View::Login);
    }

    // Models

    #[test]
    fn test_timestamps_render_to_the_minute() {
        use crate::models::{format_date, format_timestamp};
        assert_eq!(format_timestamp("2024-03-05T14:30:59.123456"), "2024-03-05 14:30");
        assert_eq!(format_timestamp("2024-03-05T14:30:00+00:00"), "2024-03-05 14:30");
        assert_eq!(format_timestamp("yesterday"), "yesterday");
        assert_eq!(format_date("2024-03-05T14:30:00"), "2024-03-05");
    }

    #[test]
    fn test_unknown_election_status_decodes_as_created() {
        use crate::models::{Election, ElectionStatus};
        let election: Election = serde_json::from_value(json!({ "id": "election_9", "title": "T", "status": "archived" })).unwrap();
        assert_eq!(election.status, ElectionStatus::Created);
        assert!(!election.is_active());
    }

    #[test]
    fn test_blank_photos_fall_back_to_placeholder() {
        use crate::models::{Candidate, UploadPayload, Voter};
        use crate::render::{candidate_rows, tally_rows, voter_card, voter_rows};

        let candidate: Candidate = serde_json::from_value(json!({ "id": "alice", "name": "Alice", "votes": 0, "photo": "" })).unwrap();
        let mut asha = voter();
        asha["photo"] = json!("  ");
        let voter: Voter = serde_json::from_value(asha).unwrap();
        let upload: UploadPayload = serde_json::from_value(json!({ "filename": "" })).unwrap();

        assert_eq!(candidate.photo, None);
        assert_eq!(tally_rows(&[candidate.clone()], 0)[0].photo, None);
        assert_eq!(candidate_rows(&[candidate]).items()[0].photo, None);
        assert_eq!(voter_card(&voter).photo_url, None);
        assert!(!voter_rows(&[voter]).items()[0].has_photo);
        assert_eq!(upload.filename, None);
    }

    #[test]
    fn test_stored_photos_are_kept() {
        use crate::models::{Candidate, Voter};
        use crate::render::{uploaded_photo_url, voter_card};

        let candidate: Candidate = serde_json::from_value(json!({ "id": "b", "name": "B", "photo": "https://img/b.png" })).unwrap();
        let mut asha = voter();
        asha["photo"] = json!("5550100.jpg");
        let voter: Voter = serde_json::from_value(asha).unwrap();

        assert_eq!(candidate.photo.as_deref(), Some("https://img/b.png"));
        assert_eq!(voter_card(&voter).photo_url.as_deref(), Some(uploaded_photo_url("5550100.jpg").as_str()));
    }

    #[test]
    fn test_past_election_rows_open_their_details() {
        use crate::models::Election;
        use crate::render::past_elections_summary;

        let elections: Vec<Election> = serde_json::from_value(json!([
            election("election_1", "Council", "active"),
            election("election_0", "Old", "ended"),
        ])).unwrap();
        let summary = past_elections_summary(&elections);
        let row = &summary.rows.items()[0];
        assert_eq!(row.id, "election_0");

        let mock = MockTransport::default();
        mock.reply("/admin/election-details/election_0", json!({
            "success": true,
            "results": { "election": election("election_0", "Old", "ended"), "candidates": candidates(), "total_votes": 0 }
        }));
        let api = AdminApi::new(mock.clone());
        assert!(matches!(block_on(admin::view_election_results(&api, &row.id)), ActionOutcome::Succeeded(ResultsView::Tally(_))));
        assert_eq!(mock.paths(), vec!["/admin/election-details/election_0".to_string()]);
    }

    #[test]
    fn test_vote_now_is_offered_only_while_no_ballot_is_open() {
        let mock = MockTransport::default();
        let (api, mut state) = signed_in_portal(&mock);
        mock.reply("/election-status", json!({ "success": true, "election": election("election_1", "Council", "active") }))
            .reply("/check-voter-status", json!({ "success": true, "has_voted": false }))
            .reply("/get-candidates", json!({ "success": true, "candidates": candidates() }));

        assert!(!state.can_start_voting());
        state.set_banner(block_on(portal::load_election_status(&api, "5550100")));
        assert!(state.can_start_voting());

        state.absorb_candidates(block_on(portal::start_voting(&api, "5550100")));
        assert!(!state.can_start_voting());

        state.cancel_voting();
        assert!(state.can_start_voting());
    }

    #[test]
    fn test_aborted_vote_returns_to_selection() {
        let mock = MockTransport::default();
        let (api, mut state) = signed_in_portal(&mock);
        mock.reply("/check-voter-status", json!({ "success": true, "has_voted": false }))
            .reply("/get-candidates", json!({ "success": true, "candidates": candidates() }));

        state.absorb_candidates(block_on(portal::start_voting(&api, "5550100")));
        state.select("cand_Y");
        state.proceed();
        assert!(state.begin_vote().is_some());

        let followup = state.absorb_vote(ActionOutcome::Aborted);
        assert_eq!(followup, Default::default());
        assert_eq!(state.flow.selected(), Some("cand_Y"));
        assert!(!state.flow.is_submitting());
    }

    #[test]
    fn test_unreadable_file_is_reported_not_treated_as_missing() {
        use crate::action::FILE_UNREADABLE_MESSAGE;

        let mut admin_state = AdminState::default();
        let followup = admin_state.absorb(ActionOutcome::unreadable_file());
        assert!(followup.alert.is_some());
        let alert = admin_state.alerts.last().unwrap();
        assert_eq!(alert.level, AlertLevel::Danger);
        assert_eq!(alert.message, FILE_UNREADABLE_MESSAGE);
        assert_ne!(alert.message, ValidationError::MissingSpreadsheet.to_string());

        let mut portal_state = PortalState::default();
        portal_state.absorb_photo(ActionOutcome::unreadable_file());
        let alert = portal_state.alerts.last().unwrap();
        assert_eq!(alert.level, AlertLevel::Danger);
        assert_ne!(alert.message, ValidationError::MissingPhoto.to_string());
        assert_eq!(portal_state.photo_url(), None);
    }
}
