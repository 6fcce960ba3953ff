// Network profile reducer bank. Every operation overwrites one field.

use docket_common::error::DomainError;
use docket_common::model::network_profile::{self, NetworkProfileAction, NetworkProfileState};
use docket_common::normalize::{dedup_in_order, non_empty};
use docket_common::types::EmptyState;

use crate::model::{DocumentModel, NoLocalAction};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NetworkProfile;

impl DocumentModel for NetworkProfile {
    const DOCUMENT_TYPE: &'static str = network_profile::DOCUMENT_TYPE;

    type Global = NetworkProfileState;
    type Local = EmptyState;
    type GlobalAction = NetworkProfileAction;
    type LocalAction = NoLocalAction;

    fn reduce_global(
        state: &mut NetworkProfileState,
        action: NetworkProfileAction,
    ) -> Result<(), DomainError> {
        match action {
            NetworkProfileAction::SetProfileName(input) => state.name = non_empty(input.name),
            NetworkProfileAction::SetIcon(input) => state.icon = non_empty(input.icon),
            NetworkProfileAction::SetLogo(input) => state.logo = non_empty(input.logo),
            NetworkProfileAction::SetLogoBig(input) => state.logo_big = non_empty(input.logo_big),
            NetworkProfileAction::SetWebsite(input) => state.website = non_empty(input.website),
            NetworkProfileAction::SetDescription(input) => {
                state.description = non_empty(input.description);
            }
            NetworkProfileAction::SetCategory(input) => {
                state.category = dedup_in_order(input.category)
            }
            NetworkProfileAction::SetX(input) => state.x = non_empty(input.x),
            NetworkProfileAction::SetGithub(input) => state.github = non_empty(input.github),
            NetworkProfileAction::SetDiscord(input) => state.discord = non_empty(input.discord),
            NetworkProfileAction::SetYoutube(input) => state.youtube = non_empty(input.youtube),
        }
        Ok(())
    }

    fn reduce_local(_state: &mut EmptyState, action: NoLocalAction) -> Result<(), DomainError> {
        match action {}
    }
}
