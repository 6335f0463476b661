//! crates/savings_core/src/aggregation.rs
//!
//! Groups a group's contribution history by contributor and sums the amounts.

use crate::domain::Contribution;
use rust_decimal::Decimal;
use std::collections::HashMap;
use uuid::Uuid;

/// One contributor's share of a group's history.
#[derive(Debug, Clone, PartialEq)]
pub struct UserContributions {
    pub user_id: Uuid,
    /// Name snapshot taken from the user's first record in the input.
    pub user_name: String,
    pub total: Decimal,
    /// The user's records, in the same relative order as the input.
    pub contributions: Vec<Contribution>,
}

/// Per-user totals, iterated in order of each user's first appearance in the input.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContributionsByUser {
    entries: Vec<UserContributions>,
    index: HashMap<Uuid, usize>,
}

impl ContributionsByUser {
    pub fn get(&self, user_id: Uuid) -> Option<&UserContributions> {
        self.index.get(&user_id).map(|&i| &self.entries[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = &UserContributions> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of every user's total.
    pub fn grand_total(&self) -> Decimal {
        sum_amounts(self.entries.iter().map(|e| e.total))
    }

    pub fn into_vec(self) -> Vec<UserContributions> {
        self.entries
    }
}

/// Aggregates contributions per user in a single pass without sorting.
pub fn aggregate_by_user(contributions: &[Contribution]) -> ContributionsByUser {
    let mut entries: Vec<UserContributions> = Vec::new();
    let mut index: HashMap<Uuid, usize> = HashMap::new();

    for contribution in contributions {
        let slot = *index.entry(contribution.user_id).or_insert_with(|| {
            entries.push(UserContributions {
                user_id: contribution.user_id,
                user_name: contribution.user_name.clone(),
                total: Decimal::ZERO,
                contributions: Vec::new(),
            });
            entries.len() - 1
        });

        let entry = &mut entries[slot];
        entry.total = entry.total.saturating_add(contribution.amount);
        entry.contributions.push(contribution.clone());
    }

    ContributionsByUser { entries, index }
}

/// Sum of one user's amounts in the given history.
pub fn user_total(contributions: &[Contribution], user_id: Uuid) -> Decimal {
    sum_amounts(
        contributions
            .iter()
            .filter(|c| c.user_id == user_id)
            .map(|c| c.amount),
    )
}

/// Totals saturate at `Decimal::MAX` instead of overflowing.
fn sum_amounts(amounts: impl Iterator<Item = Decimal>) -> Decimal {
    amounts.fold(Decimal::ZERO, Decimal::saturating_add)
}
