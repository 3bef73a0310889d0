//! When steps for task status transition BDD scenarios.

use super::world::{TaskStatusWorld, run_async};
use rstest_bdd_macros::when;
use taskboard::task::{domain::TaskStatus, services::UpdateTaskRequest};

#[when(r#"the task status is changed to "{status}""#)]
fn change_status(world: &mut TaskStatusWorld, status: String) -> Result<(), eyre::Report> {
    let target = TaskStatus::try_from(status.as_str())
        .map_err(|err| eyre::eyre!("invalid status in scenario: {err}"))?;
    let id = world.current_task()?.id();

    let result = run_async(
        world
            .tasks
            .update_task(id, UpdateTaskRequest::new().with_status(target)),
    );
    if let Ok(ref updated) = result {
        world.task = Some(updated.clone());
    }
    world.last_result = Some(result);
    Ok(())
}
