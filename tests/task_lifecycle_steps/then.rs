//! Then steps for task lifecycle BDD scenarios.

use super::world::LifecycleWorld;
use rstest_bdd_macros::then;
use serde_json::Value;
use taskloom::state::{
    domain::{TaskOutcome, TaskStatus},
    error::{StateError, StateTransitionError, StateUpdateError},
};

fn last_error(world: &LifecycleWorld) -> Result<&StateUpdateError, eyre::Report> {
    match world.last_result.as_ref() {
        Some(Err(error)) => Ok(error),
        Some(Ok(())) => Err(eyre::eyre!("expected the last update to fail")),
        None => Err(eyre::eyre!("no update recorded in scenario world")),
    }
}

fn history_count(
    world: &LifecycleWorld,
    description: &str,
    expected: usize,
) -> Result<(), eyre::Report> {
    let suffix = format!(": {description}");
    let history = world.manager.get_task_history();
    let matching = history
        .iter()
        .filter(|entry| entry.ends_with(&suffix))
        .count();
    if matching != expected || history.len() != expected {
        return Err(eyre::eyre!(
            "expected {expected} history entries for {description}, found {history:?}"
        ));
    }
    Ok(())
}

#[then(r#"the task status is "{status}""#)]
fn task_status_is(world: &LifecycleWorld, status: String) -> Result<(), eyre::Report> {
    let expected = TaskStatus::try_from(status.as_str())
        .map_err(|err| eyre::eyre!("invalid expected status in scenario: {err}"))?;
    let actual = world.manager.task_status();
    if actual != expected {
        return Err(eyre::eyre!("expected status {expected}, found {actual}"));
    }
    Ok(())
}

#[then("no task is active")]
fn no_task_is_active(world: &LifecycleWorld) -> Result<(), eyre::Report> {
    match world.manager.get_current_state().current_task() {
        None => Ok(()),
        Some(task) => Err(eyre::eyre!("expected no active task, found {task}")),
    }
}

#[then(r#"the result for "{description}" is "{result}""#)]
fn result_is(
    world: &LifecycleWorld,
    description: String,
    result: String,
) -> Result<(), eyre::Report> {
    let recorded = world
        .manager
        .get_current_state()
        .agent_results()
        .get(&description);
    if recorded != Some(&TaskOutcome::Result(Value::String(result.clone()))) {
        return Err(eyre::eyre!("expected result {result}, found {recorded:?}"));
    }
    Ok(())
}

#[then(r#"the error recorded for "{description}" is "{error}""#)]
fn error_recorded(
    world: &LifecycleWorld,
    description: String,
    error: String,
) -> Result<(), eyre::Report> {
    let recorded = world
        .manager
        .get_current_state()
        .agent_results()
        .get(&description);
    if recorded != Some(&TaskOutcome::error(error.clone())) {
        return Err(eyre::eyre!("expected error {error}, found {recorded:?}"));
    }
    Ok(())
}

#[then(r#"agent "{agent_id}" has status "{status}""#)]
fn agent_has_status(
    world: &LifecycleWorld,
    agent_id: String,
    status: String,
) -> Result<(), eyre::Report> {
    let record = world.manager.get_agent_state(&agent_id);
    if record.status() != Some(status.as_str()) {
        return Err(eyre::eyre!("expected {agent_id} to be {status}, found {record:?}"));
    }
    Ok(())
}

#[then(r#"the task history has {count:usize} entry for "{description}""#)]
fn history_has_entry(
    world: &LifecycleWorld,
    count: usize,
    description: String,
) -> Result<(), eyre::Report> {
    history_count(world, &description, count)
}

#[then(r#"the task history has {count:usize} entries for "{description}""#)]
fn history_has_entries(
    world: &LifecycleWorld,
    count: usize,
    description: String,
) -> Result<(), eyre::Report> {
    history_count(world, &description, count)
}

#[then("the last update fails with an illegal transition error")]
fn fails_with_illegal_transition(world: &LifecycleWorld) -> Result<(), eyre::Report> {
    let error = last_error(world)?;
    if !matches!(
        error.cause(),
        StateError::Transition(StateTransitionError::Illegal { .. })
    ) {
        return Err(eyre::eyre!("expected illegal transition error, got {error:?}"));
    }
    Ok(())
}

#[then("the last update fails with a no active task error")]
fn fails_with_no_active_task(world: &LifecycleWorld) -> Result<(), eyre::Report> {
    let error = last_error(world)?;
    if !matches!(
        error.cause(),
        StateError::Transition(StateTransitionError::NoActiveTask { .. })
    ) {
        return Err(eyre::eyre!("expected no active task error, got {error:?}"));
    }
    Ok(())
}

#[then("the last update fails with a rate limit error")]
fn fails_with_rate_limit(world: &LifecycleWorld) -> Result<(), eyre::Report> {
    let error = last_error(world)?;
    if !error.is_rate_limited() {
        return Err(eyre::eyre!("expected rate limit error, got {error:?}"));
    }
    Ok(())
}

#[then("no results are recorded")]
fn no_results_recorded(world: &LifecycleWorld) -> Result<(), eyre::Report> {
    let state = world.manager.get_current_state();
    if !state.agent_results().is_empty() || !state.task_history().is_empty() {
        return Err(eyre::eyre!("expected no results or history, found {state:?}"));
    }
    Ok(())
}
