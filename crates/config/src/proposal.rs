//! Intake for configuration changes suggested by the model.
//!
//! A proposal names a zone, a target, a field, and a value. Triage only
//! sorts and logs: nothing here mutates configuration.

use serde::{Deserialize, Serialize};
use tracing::info;

/// How a proposed change may be handled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProposalZone {
    /// Safe to apply without asking
    AutoApply,
    /// Needs the owner's explicit approval
    RequiresApproval,
    /// Never applied
    #[default]
    #[serde(other)]
    Forbidden,
}

impl ProposalZone {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AutoApply => "auto-apply",
            Self::RequiresApproval => "requires-approval",
            Self::Forbidden => "forbidden",
        }
    }
}

impl std::fmt::Display for ProposalZone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One suggested change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigProposal {
    #[serde(default)]
    pub zone: ProposalZone,
    #[serde(default)]
    pub target: String,
    #[serde(default)]
    pub field: String,
    #[serde(default)]
    pub value: serde_json::Value,
}

/// Proposals partitioned by zone.
#[derive(Debug, Clone, Default)]
pub struct Triage {
    pub auto_apply: Vec<ConfigProposal>,
    pub pending_approval: Vec<ConfigProposal>,
    pub rejected: Vec<ConfigProposal>,
}

impl Triage {
    pub fn len(&self) -> usize {
        self.auto_apply.len() + self.pending_approval.len() + self.rejected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Sort proposals by zone, logging each decision.
pub fn triage(proposals: Vec<ConfigProposal>) -> Triage {
    let mut out = Triage::default();

    for proposal in proposals {
        match proposal.zone {
            ProposalZone::AutoApply => {
                info!(target = %proposal.target, field = %proposal.field, "Config proposal is an auto-apply candidate");
                out.auto_apply.push(proposal);
            }
            ProposalZone::RequiresApproval => {
                info!(target = %proposal.target, field = %proposal.field, "Config proposal pending approval");
                out.pending_approval.push(proposal);
            }
            ProposalZone::Forbidden => {
                info!(target = %proposal.target, field = %proposal.field, "Config proposal ignored (forbidden zone)");
                out.rejected.push(proposal);
            }
        }
    }

    out
}
