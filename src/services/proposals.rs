//! Proposals service

use std::sync::Arc;

use crate::{
    error::{AppError, AppResult},
    models::{proposal::CreateProposal, NewProposal, Organizer, Proposal},
    repository::RecordStore,
};

#[derive(Clone)]
pub struct ProposalsService {
    store: Arc<dyn RecordStore>,
}

impl ProposalsService {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// All proposals, grouped by proposing organizer
    pub async fn list(&self) -> AppResult<Vec<Proposal>> {
        self.store.list_proposals().await
    }

    pub async fn list_for(&self, organizer: &Organizer) -> AppResult<Vec<Proposal>> {
        let proposals = self.store.list_proposals().await?;
        Ok(proposals
            .into_iter()
            .filter(|p| p.organizer_id == organizer.id)
            .collect())
    }

    pub async fn create(&self, organizer: &Organizer, data: &CreateProposal) -> AppResult<Proposal> {
        organizer.require_editor()?;
        let school = self
            .store
            .get_school(data.rbd)
            .await?
            .ok_or_else(|| AppError::Validation(format!("Unknown school RBD {}", data.rbd)))?;

        let proposal = self
            .store
            .insert_proposal(&NewProposal {
                organizer_id: organizer.id,
                organizer_name: organizer.name.clone(),
                rbd: school.rbd,
                school_name: school.name,
            })
            .await?;
        tracing::info!(
            "Proposal {} (RBD {}) created by organizer {}",
            proposal.id,
            proposal.rbd,
            organizer.id
        );
        Ok(proposal)
    }

    pub async fn delete(&self, organizer: &Organizer, id: i32) -> AppResult<()> {
        organizer.require_editor()?;
        let proposal = self
            .store
            .get_proposal(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Proposal {} not found", id)))?;
        organizer.require_owner(proposal.organizer_id, &format!("Proposal {}", id))?;

        if !self.store.delete_proposal(id).await? {
            return Err(AppError::NotFound(format!("Proposal {} not found", id)));
        }
        tracing::info!("Proposal {} deleted by organizer {}", id, organizer.id);
        Ok(())
    }
}
