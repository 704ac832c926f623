//! Suggested follow-up questions per role

use shared_types::Role;

const APPELLATE_ATTORNEY: &[&str] = &[
    "What were the main legal errors raised in the appellant's brief?",
    "How did the court below interpret the precedent on qualified immunity?",
    "Is the majority's reasoning aligned with relevant constitutional clauses?",
    "Does the dissent raise viable counterarguments rooted in case law?",
    "Summarize how the judgment treats the issue of prosecutorial discretion.",
];

const PARALEGAL: &[&str] = &[
    "What are the key deadlines or procedural steps mentioned in this filing?",
    "Are there any inconsistencies in witness statements or timelines?",
    "Does this motion cite relevant statutes or case law correctly?",
    "What are the possible weaknesses in this pleading?",
    "What follow-up documents or filings might be needed?",
];

const CONTRACT_ANALYST: &[&str] = &[
    "What are the key obligations of both parties in this contract?",
    "Are there any hidden penalties, automatic renewal clauses, or cancellation restrictions?",
    "Which clauses deal with intellectual property ownership and usage rights?",
    "Is there any language that poses legal risk or ambiguity for our side?",
    "Can you summarize the dispute resolution and arbitration procedures?",
];

const TENANT: &[&str] = &[
    "Does this lease let my landlord raise rent during the lease period?",
    "What are my rights if the landlord doesn't make repairs?",
    "Can I sublet my apartment under this agreement?",
    "Is there an early termination penalty I should be aware of?",
    "Does this lease comply with California tenant protection laws?",
];

pub fn sample_questions(role: Role) -> &'static [&'static str] {
    match role {
        Role::AppellateAttorney => APPELLATE_ATTORNEY,
        Role::Paralegal => PARALEGAL,
        Role::ContractAnalyst => CONTRACT_ANALYST,
        Role::Tenant => TENANT,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_role_has_questions() {
        for role in Role::ALL {
            let questions = sample_questions(role);
            assert_eq!(questions.len(), 5, "{}", role);
            assert!(questions.iter().all(|q| q.ends_with('?') || q.ends_with('.')));
        }
    }

    #[test]
    fn test_tenant_questions_are_about_leases() {
        assert!(sample_questions(Role::Tenant)
            .iter()
            .any(|q| q.contains("sublet")));
    }
}
