//! Given steps for task lifecycle BDD scenarios.

use super::world::LifecycleWorld;
use eyre::WrapErr;
use rstest_bdd_macros::given;

#[given("a fresh conversation state")]
fn fresh_conversation_state(world: &mut LifecycleWorld) {
    *world = LifecycleWorld::default();
}

#[given(r#"the task "{description}" has failed with "{error}""#)]
fn task_has_failed(
    world: &mut LifecycleWorld,
    description: String,
    error: String,
) -> Result<(), eyre::Report> {
    world
        .manager
        .set_task(description)
        .wrap_err("start task in scenario setup")?;
    world
        .manager
        .fail_task(error)
        .wrap_err("fail task in scenario setup")?;
    Ok(())
}
