use indexmap::IndexMap;
use std::collections::HashMap;

use splitledger_domain::{MemberId, Participant};

use crate::{error::LoadError, model::Ledger};

/// Turns ledger source text into scopes of normalized records.
pub trait LedgerReader {
    fn read(&self, content: &str) -> Result<Ledger, LoadError>;
}

/// Display names for participants. The engine only ever sees ids.
pub trait MemberDirectory: Send + Sync {
    fn display_name(&self, member_id: &MemberId) -> Option<&str>;
}

impl MemberDirectory for HashMap<MemberId, String> {
    fn display_name(&self, member_id: &MemberId) -> Option<&str> {
        self.get(member_id).map(String::as_str)
    }
}

impl MemberDirectory for IndexMap<MemberId, Participant> {
    fn display_name(&self, member_id: &MemberId) -> Option<&str> {
        self.get(member_id)
            .map(|participant| participant.display_name.as_str())
    }
}
