//! Command handlers for the Quest Ledger context.

use everloop_core::clock::Clock;
use everloop_core::error::ProgressionError;
use everloop_core::store::{LedgerStore, decode, encode};

use crate::domain::commands::{CreateQuest, ObjectiveUpdate, UpdateQuest};
use crate::domain::records::{Objective, Quest, QuestStatus};

/// Handles the `CreateQuest` command.
///
/// Every listed prerequisite must already be completed for the owner;
/// otherwise nothing is written.
///
/// # Errors
///
/// Returns `ProgressionError::Validation` for an unmet prerequisite, a
/// terminal initial status, or a colliding quest id.
pub async fn handle_create_quest(
    command: &CreateQuest,
    store: &dyn LedgerStore,
) -> Result<Quest, ProgressionError> {
    if command.initial_status.is_terminal() {
        return Err(ProgressionError::Validation(
            "quests cannot be created in a terminal status".to_owned(),
        ));
    }

    for prerequisite in &command.prerequisites {
        let key = Quest::natural_key(*prerequisite);
        let completed = match store.find_one(&command.owner, Quest::COLLECTION, &key).await? {
            Some(record) => decode::<Quest>(&record)?.status == QuestStatus::Completed,
            None => false,
        };
        if !completed {
            return Err(ProgressionError::Validation(format!(
                "prerequisite quest {prerequisite} is not completed"
            )));
        }
    }

    let key = Quest::natural_key(command.quest_id);
    if store
        .find_one(&command.owner, Quest::COLLECTION, &key)
        .await?
        .is_some()
    {
        return Err(ProgressionError::Validation(format!(
            "quest {} already exists",
            command.quest_id
        )));
    }

    let quest = Quest {
        id: command.quest_id,
        title: command.title.clone(),
        description: command.description.clone(),
        category: command.category,
        status: command.initial_status,
        prerequisites: command.prerequisites.clone(),
        objectives: command
            .objectives
            .iter()
            .cloned()
            .map(Objective::from_draft)
            .collect(),
        completed_at: None,
    };

    tracing::debug!(quest_id = %quest.id, title = %quest.title, "quest created");

    let record = store
        .upsert(&command.owner, Quest::COLLECTION, &key, encode(&quest)?)
        .await?;
    decode(&record)
}

/// Handles the `UpdateQuest` command.
///
/// Objective updates apply first. If they leave every objective
/// completed, the quest completes regardless of the requested status;
/// otherwise the requested transition is validated and applied. Entering
/// a terminal status stamps `completed_at` and moves the quest out of
/// the active collection for good.
///
/// # Errors
///
/// Returns `ProgressionError::NotFound` if the quest is missing or not
/// owned, and `Validation` for terminal quests, malformed objective
/// updates, or illegal transitions.
pub async fn handle_update_quest(
    command: &UpdateQuest,
    clock: &dyn Clock,
    store: &dyn LedgerStore,
) -> Result<Quest, ProgressionError> {
    let key = Quest::natural_key(command.quest_id);
    let record = store
        .find_one(&command.owner, Quest::COLLECTION, &key)
        .await?
        .ok_or_else(|| ProgressionError::NotFound {
            entity: "quest",
            key: key.clone(),
        })?;
    let mut quest: Quest = decode(&record)?;

    if quest.status.is_terminal() {
        return Err(ProgressionError::Validation(format!(
            "quest {} is archived and can no longer change",
            quest.id
        )));
    }

    for update in &command.objectives {
        apply_objective_update(&mut quest, update)?;
    }

    if quest.all_objectives_completed() {
        quest.status = QuestStatus::Completed;
        quest.completed_at = Some(clock.now());
    } else if let Some(requested) = command.status {
        validate_transition(quest.status, requested)?;
        if requested.is_terminal() {
            quest.completed_at = Some(clock.now());
        }
        quest.status = requested;
    }

    tracing::debug!(quest_id = %quest.id, status = quest.status.as_str(), "quest updated");

    let record = store
        .upsert(&command.owner, Quest::COLLECTION, &key, encode(&quest)?)
        .await?;
    decode(&record)
}

fn apply_objective_update(
    quest: &mut Quest,
    update: &ObjectiveUpdate,
) -> Result<(), ProgressionError> {
    let Some(objective) = quest
        .objectives
        .iter_mut()
        .find(|o| o.id == update.objective_id)
    else {
        // Unknown objective ids are ignored by contract.
        return Ok(());
    };

    if let Some(progress) = update.progress {
        let Some(target) = objective.target else {
            return Err(ProgressionError::Validation(format!(
                "objective {} has no progress counter",
                update.objective_id
            )));
        };
        objective.progress = Some(progress.min(target));
        if progress >= target {
            objective.completed = true;
        }
    }
    if let Some(completed) = update.completed {
        objective.completed = completed;
    }
    Ok(())
}

fn validate_transition(
    current: QuestStatus,
    requested: QuestStatus,
) -> Result<(), ProgressionError> {
    let allowed = current == requested
        || matches!(
            (current, requested),
            (QuestStatus::NotStarted, QuestStatus::Active)
                | (
                    QuestStatus::Active,
                    QuestStatus::Completed | QuestStatus::Failed
                )
        );
    if allowed {
        Ok(())
    } else {
        Err(ProgressionError::Validation(format!(
            "illegal status transition {} -> {}",
            current.as_str(),
            requested.as_str()
        )))
    }
}
