//! Focused unit tests covering command configuration and input loading.

use super::helpers::{Workspace, write_utf8};
use super::*;
use crate::adjust::{AdjustArgs, AdjustConfig};
use crate::inputs::{load_json, load_planner_config};
use crate::output::save_outcome;
use crate::plan::{DEFAULT_CATALOG, PlanArgs, PlanConfig, config_from_layers_for_test};
use camino::Utf8PathBuf;
use rstest::{fixture, rstest};
use sojourn_core::{BuildOutcome, Infeasible, InfeasibleReason};
use sojourn_planner::{PlanRequest, PlannerConfig};
use std::time::Duration;

#[fixture]
fn workspace() -> Workspace {
    Workspace::new()
}

fn config(workspace: &Workspace) -> PlanConfig {
    PlanConfig {
        request_path: workspace.path("request.json"),
        catalog: workspace.path("catalogue.json"),
        history_db: None,
        user: None,
        osrm_base_url: "http://localhost:5000".to_owned(),
        weather_api_key: None,
        news_api_key: None,
        planner_config: None,
        save: None,
    }
}

#[rstest]
fn converting_plan_without_request_errors() {
    let err = PlanConfig::try_from(PlanArgs::default()).expect_err("missing request");
    match err {
        CliError::MissingArgument { field, env } => {
            assert_eq!(field, ARG_PLAN_REQUEST);
            assert_eq!(env, ENV_PLAN_REQUEST);
        }
        other => panic!("expected MissingArgument, found {other:?}"),
    }
}

#[rstest]
fn plan_config_applies_defaults() {
    let args = PlanArgs {
        request_path: Some(Utf8PathBuf::from("request.json")),
        ..PlanArgs::default()
    };

    let config = PlanConfig::try_from(args).expect("config should build");
    assert_eq!(config.catalog, Utf8PathBuf::from(DEFAULT_CATALOG));
    assert_eq!(config.osrm_base_url, "http://localhost:5000");
    assert_eq!(config.history_db, None);
    assert_eq!(config.save, None);
}

#[rstest]
#[case::missing_request(ARG_PLAN_REQUEST, false, true)]
#[case::missing_catalog(ARG_CATALOG, true, false)]
fn validate_sources_reports_missing_inputs(
    workspace: Workspace,
    #[case] expected_field: &'static str,
    #[case] with_request: bool,
    #[case] with_catalog: bool,
) {
    if with_request {
        workspace.write_request("Springfield");
    }
    if with_catalog {
        workspace.write_catalogue();
    }

    let err = config(&workspace)
        .validate_sources()
        .expect_err("expected failure");
    match err {
        CliError::MissingSourceFile { field, .. } => assert_eq!(field, expected_field),
        other => panic!("expected MissingSourceFile, found {other:?}"),
    }
}

#[rstest]
fn validate_sources_reports_not_file(workspace: Workspace) {
    workspace.write_catalogue();
    let request_path = workspace.path("request.json");
    std::fs::create_dir(&request_path).expect("request directory");

    let err = config(&workspace)
        .validate_sources()
        .expect_err("expected directory path to fail validation");
    match err {
        CliError::SourcePathNotFile { field, path } => {
            assert_eq!(field, ARG_PLAN_REQUEST);
            assert_eq!(path, request_path);
        }
        other => panic!("expected SourcePathNotFile, found {other:?}"),
    }
}

#[rstest]
fn validate_sources_checks_the_planner_config(workspace: Workspace) {
    workspace.write_request("Springfield");
    workspace.write_catalogue();
    let mut with_planner = config(&workspace);
    with_planner.planner_config = Some(workspace.path("planner.json"));

    let err = with_planner
        .validate_sources()
        .expect_err("missing planner config");
    match err {
        CliError::MissingSourceFile { field, .. } => assert_eq!(field, ARG_PLANNER_CONFIG),
        other => panic!("expected MissingSourceFile, found {other:?}"),
    }
}

#[rstest]
fn load_json_decodes_requests(workspace: Workspace) {
    let path = workspace.write_request("Springfield");
    let request: PlanRequest = load_json(&path, ARG_PLAN_REQUEST).expect("request decodes");
    assert_eq!(request.city, "Springfield");
    assert_eq!(request.start.name, "hotel");
}

#[rstest]
fn load_json_rejects_invalid_json(workspace: Workspace) {
    let path = workspace.path("request.json");
    write_utf8(&path, b"{ not valid json");

    let err = load_json::<PlanRequest>(&path, ARG_PLAN_REQUEST).expect_err("invalid JSON");
    match err {
        CliError::ParseInput {
            field,
            path: failed,
            ..
        } => {
            assert_eq!(field, ARG_PLAN_REQUEST);
            assert_eq!(failed, path);
        }
        other => panic!("expected ParseInput, found {other:?}"),
    }
}

#[rstest]
fn load_json_io_error_returns_open_error(workspace: Workspace) {
    let path = workspace.path("absent.json");
    let err = load_json::<PlanRequest>(&path, ARG_ITINERARY).expect_err("missing file");
    match err {
        CliError::OpenInput { field, .. } => assert_eq!(field, ARG_ITINERARY),
        other => panic!("expected OpenInput, found {other:?}"),
    }
}

#[rstest]
fn planner_config_defaults_when_absent() {
    let config = load_planner_config(None).expect("defaults");
    assert_eq!(config, PlannerConfig::default());
}

#[rstest]
fn planner_config_files_may_be_partial(workspace: Workspace) {
    let path = workspace.path("planner.json");
    write_utf8(&path, br#"{"meal_break": {"enabled": false}}"#);

    let config = load_planner_config(Some(&path)).expect("config decodes");
    assert!(!config.meal_break.enabled);
    assert_eq!(config.meal_break.duration, Duration::from_secs(45 * 60));
    assert_eq!(config.weights, PlannerConfig::default().weights);
}

#[rstest]
fn merge_layers_maps_configuration_errors() {
    use ortho_config::MergeComposer;
    use serde_json::json;

    let mut composer = MergeComposer::new();
    composer.push_cli(json!({ "request_path": 42 }));

    let err = config_from_layers_for_test(composer.layers())
        .expect_err("invalid config layer should map to CliError::Configuration");
    match err {
        CliError::Configuration(_) => {}
        other => panic!("expected CliError::Configuration, found {other:?}"),
    }
}

#[rstest]
fn merge_layers_honours_precedence(workspace: Workspace) {
    use ortho_config::MergeComposer;
    use serde_json::json;

    let env_request = workspace.path("from-env-request.json");
    let cli_catalog = workspace.path("from-cli.json");
    let mut composer = MergeComposer::new();
    composer.push_file(
        json!({
            "catalog": workspace.path("from-file.json").as_str(),
            "osrm_base_url": "http://from-file:5000",
            "weather_api_key": "file-key",
        }),
        None,
    );
    composer.push_environment(json!({
        "request_path": env_request.as_str(),
        "catalog": workspace.path("from-env.json").as_str(),
    }));
    composer.push_cli(json!({
        "catalog": cli_catalog.as_str(),
    }));

    let config =
        config_from_layers_for_test(composer.layers()).expect("merged config should build");
    assert_eq!(config.request_path, env_request);
    assert_eq!(config.catalog, cli_catalog);
    assert_eq!(config.osrm_base_url, "http://from-file:5000");
    assert_eq!(config.weather_api_key.as_deref(), Some("file-key"));
}

#[rstest]
fn debug_output_redacts_api_keys(workspace: Workspace) {
    let mut keyed = config(&workspace);
    keyed.weather_api_key = Some("secret-weather".to_owned());
    keyed.news_api_key = Some("secret-news".to_owned());

    let rendered = format!("{keyed:?}");
    assert!(!rendered.contains("secret-weather"));
    assert!(!rendered.contains("secret-news"));
    assert!(rendered.contains("<redacted>"));
}

#[rstest]
#[case::itinerary(None, Some("adjustment.json"), ARG_ITINERARY, ENV_ADJUST_ITINERARY)]
#[case::adjustment(Some("itinerary.json"), None, ARG_ADJUSTMENT, ENV_ADJUST_ADJUSTMENT)]
fn converting_adjust_without_inputs_errors(
    #[case] itinerary: Option<&str>,
    #[case] adjustment: Option<&str>,
    #[case] expected_field: &'static str,
    #[case] expected_env: &'static str,
) {
    let args = AdjustArgs {
        itinerary_path: itinerary.map(Utf8PathBuf::from),
        adjustment_path: adjustment.map(Utf8PathBuf::from),
        ..AdjustArgs::default()
    };

    let err = AdjustConfig::try_from(args).expect_err("missing input");
    match err {
        CliError::MissingArgument { field, env } => {
            assert_eq!(field, expected_field);
            assert_eq!(env, expected_env);
        }
        other => panic!("expected MissingArgument, found {other:?}"),
    }
}

#[rstest]
fn infeasible_outcomes_are_not_saved(workspace: Workspace) {
    let path = workspace.path("saved/itinerary.json");
    let outcome = BuildOutcome::Infeasible(Infeasible::new(
        InfeasibleReason::EmptyPool,
        "no candidates",
    ));

    save_outcome(&path, &outcome).expect("nothing to save");

    assert!(!path.exists());
}
