//! Ticket search criteria
//!
//! [`TicketFilter`] holds the optional criteria of a listing request.
//! [`TicketFilter::to_predicate`] turns it into a [`TicketPredicate`]: the
//! conjunction of the criteria that are actually present. Every store evaluates the
//! same predicate, either directly through [`TicketPredicate::matches`] or by
//! rendering each [`Criterion`] into its own query language.

use crate::core::entity::{Currency, SupportTicket, TicketStatus};
use chrono::NaiveDateTime;
use rust_decimal::Decimal;

/// Optional search criteria for a listing request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TicketFilter {
    /// Case-insensitive substring of the ticket number or requester name
    pub q: Option<String>,
    pub status: Option<TicketStatus>,
    pub currency: Option<Currency>,
    /// Inclusive lower bound on the estimated cost
    pub min_cost: Option<Decimal>,
    /// Inclusive upper bound on the estimated cost
    pub max_cost: Option<Decimal>,
    /// Inclusive lower bound on the creation timestamp
    pub from: Option<NaiveDateTime>,
    /// Inclusive upper bound on the creation timestamp
    pub to: Option<NaiveDateTime>,
}

impl TicketFilter {
    /// Whether both timestamp bounds are present and `from` is after `to`
    pub fn has_inverted_range(&self) -> bool {
        matches!((self.from, self.to), (Some(from), Some(to)) if from > to)
    }

    /// Build the conjunction of the present criteria
    ///
    /// An empty `q` adds no criterion. With no criteria at all the predicate
    /// matches every ticket.
    pub fn to_predicate(&self) -> TicketPredicate {
        let mut predicate = TicketPredicate::all();

        if let Some(q) = self.q.as_deref().filter(|q| !q.is_empty()) {
            predicate = predicate.and(Criterion::Text(q.to_lowercase()));
        }
        if let Some(status) = self.status {
            predicate = predicate.and(Criterion::Status(status));
        }
        if let Some(currency) = self.currency {
            predicate = predicate.and(Criterion::Currency(currency));
        }
        if let Some(min) = self.min_cost {
            predicate = predicate.and(Criterion::MinCost(min));
        }
        if let Some(max) = self.max_cost {
            predicate = predicate.and(Criterion::MaxCost(max));
        }
        match (self.from, self.to) {
            (Some(from), Some(to)) => {
                predicate = predicate.and(Criterion::CreatedBetween(from, to));
            }
            (Some(from), None) => predicate = predicate.and(Criterion::CreatedFrom(from)),
            (None, Some(to)) => predicate = predicate.and(Criterion::CreatedUntil(to)),
            (None, None) => {}
        }

        predicate
    }
}

/// A single condition on a ticket
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Criterion {
    /// Lower-cased needle contained in the ticket number or requester name
    Text(String),
    Status(TicketStatus),
    Currency(Currency),
    MinCost(Decimal),
    MaxCost(Decimal),
    /// Inclusive on both ends
    CreatedBetween(NaiveDateTime, NaiveDateTime),
    CreatedFrom(NaiveDateTime),
    CreatedUntil(NaiveDateTime),
}

impl Criterion {
    pub fn matches(&self, ticket: &SupportTicket) -> bool {
        match self {
            Criterion::Text(needle) => {
                ticket.ticket_number.to_lowercase().contains(needle.as_str())
                    || ticket.requester_name.to_lowercase().contains(needle.as_str())
            }
            Criterion::Status(status) => ticket.status == *status,
            Criterion::Currency(currency) => ticket.currency == *currency,
            Criterion::MinCost(min) => ticket.estimated_cost >= *min,
            Criterion::MaxCost(max) => ticket.estimated_cost <= *max,
            Criterion::CreatedBetween(from, to) => {
                ticket.created_at >= *from && ticket.created_at <= *to
            }
            Criterion::CreatedFrom(from) => ticket.created_at >= *from,
            Criterion::CreatedUntil(to) => ticket.created_at <= *to,
        }
    }
}

/// Conjunction of criteria
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TicketPredicate {
    criteria: Vec<Criterion>,
}

impl TicketPredicate {
    /// The predicate that matches every ticket
    pub fn all() -> Self {
        Self::default()
    }

    pub fn and(mut self, criterion: Criterion) -> Self {
        self.criteria.push(criterion);
        self
    }

    pub fn criteria(&self) -> &[Criterion] {
        &self.criteria
    }

    pub fn is_empty(&self) -> bool {
        self.criteria.is_empty()
    }

    pub fn matches(&self, ticket: &SupportTicket) -> bool {
        self.criteria.iter().all(|c| c.matches(ticket))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::entity::Priority;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn at(day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 1, day)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    fn ticket(number: &str, name: &str, cost: Decimal, created_at: NaiveDateTime) -> SupportTicket {
        SupportTicket {
            id: 1,
            ticket_number: number.to_string(),
            requester_name: name.to_string(),
            status: TicketStatus::Open,
            priority: Priority::Medium,
            category: "Billing".to_string(),
            estimated_cost: cost,
            currency: Currency::Usd,
            created_at,
            due_date: NaiveDate::from_ymd_opt(2025, 2, 1).unwrap(),
        }
    }

    #[test]
    fn test_empty_filter_matches_everything() {
        let predicate = TicketFilter::default().to_predicate();
        assert!(predicate.is_empty());
        assert!(predicate.matches(&ticket("ST-1", "Ana", dec!(1), at(1, 0))));
    }

    #[test]
    fn test_empty_q_adds_no_criterion() {
        let filter = TicketFilter {
            q: Some(String::new()),
            ..Default::default()
        };
        assert!(filter.to_predicate().is_empty());
    }

    #[test]
    fn test_text_is_case_insensitive_on_both_fields() {
        let filter = TicketFilter {
            q: Some("ANA".to_string()),
            ..Default::default()
        };
        let predicate = filter.to_predicate();

        assert!(predicate.matches(&ticket("ST-1", "Mariana", dec!(1), at(1, 0))));
        assert!(predicate.matches(&ticket("ST-ANA1", "Luis", dec!(1), at(1, 0))));
        assert!(!predicate.matches(&ticket("ST-2", "Luis", dec!(1), at(1, 0))));
    }

    #[test]
    fn test_cost_bounds_are_inclusive() {
        let filter = TicketFilter {
            min_cost: Some(dec!(50)),
            max_cost: Some(dec!(100.00)),
            ..Default::default()
        };
        let predicate = filter.to_predicate();

        assert!(predicate.matches(&ticket("a", "a", dec!(50.00), at(1, 0))));
        assert!(predicate.matches(&ticket("a", "a", dec!(100), at(1, 0))));
        assert!(!predicate.matches(&ticket("a", "a", dec!(100.01), at(1, 0))));
        assert!(!predicate.matches(&ticket("a", "a", dec!(49.99), at(1, 0))));
    }

    #[test]
    fn test_inverted_cost_bounds_match_nothing() {
        let filter = TicketFilter {
            min_cost: Some(dec!(100)),
            max_cost: Some(dec!(10)),
            ..Default::default()
        };
        assert!(!filter.to_predicate().matches(&ticket("a", "a", dec!(50), at(1, 0))));
    }

    #[test]
    fn test_date_range_variants() {
        let both = TicketFilter {
            from: Some(at(2, 0)),
            to: Some(at(3, 0)),
            ..Default::default()
        };
        assert_eq!(
            both.to_predicate().criteria(),
            &[Criterion::CreatedBetween(at(2, 0), at(3, 0))]
        );
        assert!(both.to_predicate().matches(&ticket("a", "a", dec!(1), at(3, 0))));
        assert!(!both.to_predicate().matches(&ticket("a", "a", dec!(1), at(3, 1))));

        let only_from = TicketFilter {
            from: Some(at(2, 0)),
            ..Default::default()
        };
        assert_eq!(
            only_from.to_predicate().criteria(),
            &[Criterion::CreatedFrom(at(2, 0))]
        );

        let only_to = TicketFilter {
            to: Some(at(2, 0)),
            ..Default::default()
        };
        assert!(only_to.to_predicate().matches(&ticket("a", "a", dec!(1), at(1, 0))));
        assert!(!only_to.to_predicate().matches(&ticket("a", "a", dec!(1), at(2, 1))));
    }

    #[test]
    fn test_inverted_range_detection() {
        let filter = TicketFilter {
            from: Some(at(5, 0)),
            to: Some(at(1, 0)),
            ..Default::default()
        };
        assert!(filter.has_inverted_range());
        assert!(!TicketFilter::default().has_inverted_range());
    }

    #[test]
    fn test_criteria_are_conjunctive() {
        let filter = TicketFilter {
            status: Some(TicketStatus::Open),
            currency: Some(Currency::Eur),
            ..Default::default()
        };
        // status matches, currency does not
        assert!(!filter.to_predicate().matches(&ticket("a", "a", dec!(1), at(1, 0))));
    }
}
