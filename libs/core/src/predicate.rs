//! Conjunctive checks across a set of load balancers.
//!
//! Every member is invoked exactly once per pass, whatever the earlier
//! results were. Mutating checks (register, deregister) must reach every load
//! balancer, and read-only checks must observe and log every one of them on
//! each tick.

use std::future::Future;

use futures_util::future::join_all;

use crate::types::{LoadBalancerName, LoadBalancerSet};

/// How calls within one pass are issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FanOut {
    /// One call at a time, in set order.
    #[default]
    Sequential,

    /// All calls at once, joined before the result is reduced.
    Concurrent,
}

/// Apply `check` to every load balancer and AND the results.
pub async fn all_satisfy<'a, F, Fut>(
    load_balancers: &'a LoadBalancerSet,
    fan_out: FanOut,
    mut check: F,
) -> bool
where
    F: FnMut(&'a LoadBalancerName) -> Fut,
    Fut: Future<Output = bool>,
{
    match fan_out {
        FanOut::Sequential => {
            let mut result = true;
            for load_balancer in load_balancers {
                let ok = check(load_balancer).await;
                result = result && ok;
            }
            result
        }
        FanOut::Concurrent => {
            let pending: Vec<Fut> = load_balancers.iter().map(&mut check).collect();
            join_all(pending)
                .await
                .into_iter()
                .fold(true, |acc, ok| acc && ok)
        }
    }
}
