use crate::commands::{CmdMessage, CmdResult};
use crate::error::{RecallError, Result};
use crate::model::{OwnerId, Subject};
use crate::store::DataStore;
use chrono::Utc;

use super::helpers::load_profile;

#[derive(Debug, Clone)]
pub enum SubjectAction {
    List,
    Add { name: String, color: String },
}

pub fn run<S: DataStore>(
    store: &mut S,
    owner: &OwnerId,
    action: SubjectAction,
) -> Result<CmdResult> {
    match action {
        SubjectAction::List => {
            let profile = load_profile(store, owner)?;
            let mut result = CmdResult::default();
            if profile.subjects.is_empty() {
                result.add_message(CmdMessage::info("No subjects yet."));
            }
            Ok(result.with_subjects(profile.subjects))
        }
        SubjectAction::Add { name, color } => {
            if name.trim().is_empty() || color.trim().is_empty() {
                return Err(RecallError::BadRequest(
                    "Subject name and color are required".to_string(),
                ));
            }

            let subject = Subject::new(&name, &color);
            store.update_profile(owner, |profile| {
                if profile.subjects.iter().any(|s| s.id == subject.id) {
                    return Err(RecallError::BadRequest(format!(
                        "Subject already exists: {}",
                        subject.id
                    )));
                }
                profile.subjects.push(subject.clone());
                profile.updated_at = Utc::now();
                Ok(())
            })?;

            let mut result = CmdResult::default();
            result.add_message(CmdMessage::success(format!(
                "Subject added: {} ({})",
                subject.name, subject.id
            )));
            Ok(result.with_subjects(vec![subject]))
        }
    }
}
