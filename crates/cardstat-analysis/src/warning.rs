use serde::Serialize;

use crate::config::FilteredReviewPolicy;

/// A classification whose rule is uncertain relative to the host
/// application. Reported alongside the tables; never fatal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, derive_more::Display)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum AmbiguousRuleWarning {
    #[display(
        "{reviews} filtered-deck reviews classified for accuracy with policy `{policy}`; \
         the host's rule for these is unverified"
    )]
    FilteredDeckAccuracy {
        reviews: usize,
        policy: FilteredReviewPolicy,
    },
    #[display(
        "retrievability of {cards} cards estimated from stability and the last review; \
         the host may compute it differently"
    )]
    RetrievabilityEstimated { cards: usize },
    #[display(
        "{cards} exported retrievability values lie within 0.0005 of a 5% bin boundary \
         and may be binned differently by the host"
    )]
    RetrievabilityPrecision { cards: usize },
}
