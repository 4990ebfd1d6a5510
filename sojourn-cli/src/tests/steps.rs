//! Behaviour-driven step definitions driving the plan and adjust commands.

use super::helpers::{StubServices, Workspace, visits_in, write_utf8};
use super::*;
use crate::adjust::run_adjust_with;
use crate::plan::run_plan_with;
use camino::Utf8PathBuf;
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use sojourn_core::{AdjustmentRequest, EntryRef, Itinerary};
use sojourn_planner::{AdjustError, EngineError};
use std::cell::RefCell;

struct CommandWorld {
    workspace: Workspace,
    include_request: RefCell<bool>,
    include_adjustment: RefCell<bool>,
    save: RefCell<bool>,
    stdout: RefCell<Vec<u8>>,
    result: RefCell<Option<Result<(), CliError>>>,
}

impl CommandWorld {
    fn new() -> Self {
        Self {
            workspace: Workspace::new(),
            include_request: RefCell::new(true),
            include_adjustment: RefCell::new(true),
            save: RefCell::new(false),
            stdout: RefCell::new(Vec::new()),
            result: RefCell::new(None),
        }
    }

    fn request_path(&self) -> Utf8PathBuf {
        self.workspace.path("request.json")
    }

    fn saved_path(&self) -> Utf8PathBuf {
        self.workspace.path("saved/itinerary.json")
    }

    fn adjustment_path(&self) -> Utf8PathBuf {
        self.workspace.path("adjustment.json")
    }

    fn plan_command_line(&self) -> Vec<String> {
        let mut argv = vec!["sojourn".to_owned(), "plan".to_owned()];
        if *self.include_request.borrow() {
            argv.push(self.request_path().into_string());
        }
        argv.extend([
            format!("--{ARG_CATALOG}"),
            self.workspace.path("catalogue.json").into_string(),
        ]);
        if *self.save.borrow() {
            argv.extend([format!("--{ARG_SAVE}"), self.saved_path().into_string()]);
        }
        argv
    }

    fn adjust_command_line(&self) -> Vec<String> {
        let mut argv = vec![
            "sojourn".to_owned(),
            "adjust".to_owned(),
            self.saved_path().into_string(),
        ];
        if *self.include_adjustment.borrow() {
            argv.push(self.adjustment_path().into_string());
        }
        argv.extend([format!("--{ARG_SAVE}"), self.saved_path().into_string()]);
        argv
    }

    fn run(&self, argv: Vec<String>) {
        let parsed = Cli::try_parse_from(argv).map_err(CliError::from);
        let services = StubServices::default();
        let mut buffer = self.stdout.borrow_mut();
        buffer.clear();
        let outcome = parsed.and_then(|cli| match cli.command {
            Command::Plan(args) => run_plan_with(args, &services, &mut *buffer),
            Command::Adjust(args) => run_adjust_with(args, &services, &mut *buffer),
        });
        self.result.replace(Some(outcome));
    }

    fn printed(&self) -> serde_json::Value {
        let borrowed = self.result.borrow();
        let result = borrowed.as_ref().expect("result recorded");
        if let Err(err) = result {
            panic!("expected success, found {err:?}");
        }
        serde_json::from_slice(&self.stdout.borrow()).expect("output should be JSON")
    }

    fn error(&self) -> std::cell::Ref<'_, CliError> {
        std::cell::Ref::map(self.result.borrow(), |result| {
            result
                .as_ref()
                .expect("result recorded")
                .as_ref()
                .expect_err("expected error")
        })
    }
}

#[fixture]
fn world() -> CommandWorld {
    CommandWorld::new()
}

#[given("a catalogue exists on disk")]
fn catalogue_exists(#[from(world)] world: &CommandWorld) {
    world.workspace.write_catalogue();
}

#[given("a plan request for {city:word} exists on disk")]
fn plan_request_exists(#[from(world)] world: &CommandWorld, city: String) {
    world.workspace.write_request(&city);
}

#[given("the plan request contains invalid JSON")]
fn plan_request_contains_invalid_json(#[from(world)] world: &CommandWorld) {
    write_utf8(&world.request_path(), b"{ not valid json");
}

#[given("I omit the plan request path")]
fn omit_plan_request_path(#[from(world)] world: &CommandWorld) {
    world.include_request.replace(false);
}

#[given("I ask for the itinerary to be saved")]
fn ask_to_save(#[from(world)] world: &CommandWorld) {
    world.save.replace(true);
}

#[given("a planned itinerary has been saved")]
fn planned_itinerary_saved(#[from(world)] world: &CommandWorld) {
    world.workspace.write_catalogue();
    world.workspace.write_request("Springfield");
    world.save.replace(true);
    world.run(world.plan_command_line());
    assert_eq!(visits_in(&world.printed()), 2);
}

#[given("an adjustment removing the stop at position {index}")]
fn adjustment_removing(#[from(world)] world: &CommandWorld, index: String) {
    let request = AdjustmentRequest::RemoveStop {
        target: EntryRef::Position(index.parse().expect("index")),
    };
    let payload = serde_json::to_string_pretty(&request).expect("serialise adjustment");
    write_utf8(&world.adjustment_path(), payload.as_bytes());
}

#[given("I omit the adjustment path")]
fn omit_adjustment_path(#[from(world)] world: &CommandWorld) {
    world.include_adjustment.replace(false);
}

#[when("I run the plan command")]
fn run_plan_command(#[from(world)] world: &CommandWorld) {
    world.run(world.plan_command_line());
}

#[when("I run the adjust command")]
fn run_adjust_command(#[from(world)] world: &CommandWorld) {
    world.run(world.adjust_command_line());
}

#[then("the command succeeds and prints an itinerary with {count} visits")]
fn prints_itinerary(#[from(world)] world: &CommandWorld, count: String) {
    let report = world.printed();
    assert_eq!(report["status"], "planned");
    assert_eq!(visits_in(&report), count.parse::<usize>().expect("count"));
}

#[then("the saved itinerary has {count} visits")]
fn saved_itinerary_has(#[from(world)] world: &CommandWorld, count: String) {
    let raw = sojourn_fs::read_utf8(&world.saved_path()).expect("saved itinerary");
    let itinerary: Itinerary = serde_json::from_str(&raw).expect("itinerary decodes");
    assert_eq!(
        itinerary.visit_count(),
        count.parse::<usize>().expect("count")
    );
}

#[then("the command succeeds and reports the day as infeasible")]
fn reports_infeasible(#[from(world)] world: &CommandWorld) {
    let report = world.printed();
    assert_eq!(report["status"], "infeasible");
    assert_eq!(report["reason"], "empty_pool");
}

#[then("the command fails because the request JSON is invalid")]
fn fails_invalid_json(#[from(world)] world: &CommandWorld) {
    match &*world.error() {
        CliError::ParseInput { field, .. } => assert_eq!(*field, ARG_PLAN_REQUEST),
        other => panic!("expected ParseInput, found {other:?}"),
    }
}

#[then("the command fails because the catalogue is missing")]
fn fails_missing_catalogue(#[from(world)] world: &CommandWorld) {
    match &*world.error() {
        CliError::MissingSourceFile { field, .. } => assert_eq!(*field, ARG_CATALOG),
        other => panic!("expected MissingSourceFile, found {other:?}"),
    }
}

#[then("the command fails because the request path is missing")]
fn fails_missing_request_path(#[from(world)] world: &CommandWorld) {
    match &*world.error() {
        CliError::MissingArgument { field, .. } => assert_eq!(*field, ARG_PLAN_REQUEST),
        other => panic!("expected MissingArgument, found {other:?}"),
    }
}

#[then("the command fails because the stop does not exist")]
fn fails_unknown_stop(#[from(world)] world: &CommandWorld) {
    match &*world.error() {
        CliError::Adjust(EngineError::Adjust(AdjustError::UnknownEntry { target })) => {
            assert_eq!(*target, EntryRef::Position(7));
        }
        other => panic!("expected UnknownEntry, found {other:?}"),
    }
}

#[then("the command fails because the adjustment path is missing")]
fn fails_missing_adjustment_path(#[from(world)] world: &CommandWorld) {
    match &*world.error() {
        CliError::MissingArgument { field, .. } => assert_eq!(*field, ARG_ADJUSTMENT),
        other => panic!("expected MissingArgument, found {other:?}"),
    }
}

macro_rules! register_scenario {
    ($fn_name:ident, $feature:literal, $scenario_title:literal) => {
        #[scenario(path = $feature, name = $scenario_title)]
        fn $fn_name(#[from(world)] world: CommandWorld) {
            let _ = world;
        }
    };
}

register_scenario!(
    plan_happy_path,
    "tests/features/plan_command.feature",
    "planning a day from JSON"
);
register_scenario!(
    plan_saves_itinerary,
    "tests/features/plan_command.feature",
    "saving the itinerary for later adjustment"
);
register_scenario!(
    plan_infeasible_day,
    "tests/features/plan_command.feature",
    "reporting a day that cannot be planned"
);
register_scenario!(
    plan_invalid_json,
    "tests/features/plan_command.feature",
    "rejecting invalid JSON input"
);
register_scenario!(
    plan_missing_catalogue,
    "tests/features/plan_command.feature",
    "rejecting a missing catalogue"
);
register_scenario!(
    plan_missing_request,
    "tests/features/plan_command.feature",
    "rejecting missing request paths"
);
register_scenario!(
    adjust_remove_first_stop,
    "tests/features/adjust_command.feature",
    "removing the first stop of a saved itinerary"
);
register_scenario!(
    adjust_unknown_stop,
    "tests/features/adjust_command.feature",
    "rejecting an unknown stop"
);
register_scenario!(
    adjust_missing_adjustment,
    "tests/features/adjust_command.feature",
    "rejecting missing adjustment paths"
);
