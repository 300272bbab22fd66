//! When steps for task lifecycle BDD scenarios.

use super::world::LifecycleWorld;
use chrono::TimeDelta;
use eyre::WrapErr;
use rstest_bdd_macros::when;
use serde_json::Value;
use taskloom::state::domain::AgentStateRecord;

#[when(r#"the task "{description}" is started"#)]
fn start_task(world: &mut LifecycleWorld, description: String) {
    let result = world.manager.set_task(description);
    world.record(result);
}

#[when(r#"agent "{agent_id}" reports status "{status}""#)]
fn agent_reports_status(world: &mut LifecycleWorld, agent_id: String, status: String) {
    let result = world
        .manager
        .update_agent_state(&agent_id, AgentStateRecord::with_status(status));
    world.record(result);
}

#[when(r#"the current task completes with result "{result}""#)]
fn complete_current_task(world: &mut LifecycleWorld, result: String) {
    let outcome = world.manager.complete_task(Some(Value::String(result)));
    world.record(outcome);
}

#[when("the failed task is retried")]
fn retry_failed_task(world: &mut LifecycleWorld) -> Result<(), eyre::Report> {
    world
        .manager
        .retry_task()
        .wrap_err("retry failed task")?;
    Ok(())
}

#[when(r#"agent "{agent_id}" floods {count:u32} status updates"#)]
fn agent_floods_updates(
    world: &mut LifecycleWorld,
    agent_id: String,
    count: u32,
) -> Result<(), eyre::Report> {
    for attempt in 1..count {
        world
            .manager
            .update_agent_state(&agent_id, AgentStateRecord::with_status("busy"))
            .wrap_err_with(|| format!("update {attempt} should be admitted"))?;
    }
    let last = world
        .manager
        .update_agent_state(&agent_id, AgentStateRecord::with_status("busy"));
    world.record(last);
    Ok(())
}

#[when("the caller pauses before the next update")]
fn caller_pauses(world: &mut LifecycleWorld) {
    world.clock.advance(TimeDelta::milliseconds(150));
}
