use std::path::Path;

use gyazo_notes_core::config::SettingsStore;
use gyazo_notes_core::delete::{DeletionOutcome, DeletionWorkflow};
use gyazo_notes_core::remote::GyazoClient;
use gyazo_notes_core::store::FsNoteStore;

use crate::commands::common::{unattended_decision, vault_relative, AppPaths, StdinConfirmation};
use crate::error::CliError;

pub async fn run_delete(
    paths: &AppPaths,
    note: &Path,
    yes: bool,
    keep_note: bool,
) -> Result<(), CliError> {
    let note_path = vault_relative(&paths.vault, note)?;
    let settings = paths.settings_store().load().await?;
    let workflow = DeletionWorkflow::new(
        GyazoClient::from_settings(&settings)?,
        FsNoteStore::new(&paths.vault),
        settings.access_token().as_deref().unwrap_or_default(),
    )?;

    let outcome = if yes {
        workflow
            .delete_note_for_image(&note_path, &unattended_decision(keep_note))
            .await?
    } else {
        workflow
            .delete_note_for_image(&note_path, &StdinConfirmation { keep_note })
            .await?
    };

    match outcome {
        DeletionOutcome::Cancelled => println!("Cancelled"),
        DeletionOutcome::ImageDeleted { image_id } => {
            println!("Deleted Gyazo image {image_id}");
        }
        DeletionOutcome::ImageAndNoteDeleted { image_id } => {
            println!(
                "Deleted Gyazo image {image_id} and {}",
                note_path.display()
            );
        }
    }
    Ok(())
}
