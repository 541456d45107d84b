//! Domain types shared by the controller and the orchestrator.

use std::fmt;

/// Opaque identifier of a compute instance (e.g. `i-0123456789abcdef0`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct InstanceId(String);

impl InstanceId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for InstanceId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Name of a load balancer.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LoadBalancerName(String);

impl LoadBalancerName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LoadBalancerName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for LoadBalancerName {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Free-form classification tag read from instance metadata.
///
/// Only used to correlate log output across a fleet.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Lane(String);

impl Lane {
    /// Value used when the instance carries no lane tag.
    pub const NOT_SET: &'static str = "not-set";

    pub fn new(lane: impl Into<String>) -> Self {
        Self(lane.into())
    }

    /// Lane for an instance without a tag.
    pub fn not_set() -> Self {
        Self(Self::NOT_SET.to_string())
    }

    /// Build a lane from an optional tag value.
    pub fn from_tag(value: Option<&str>) -> Self {
        match value {
            Some(v) => Self::new(v),
            None => Self::not_set(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for Lane {
    fn default() -> Self {
        Self::not_set()
    }
}

impl fmt::Display for Lane {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The instance a run operates on. Resolved once and never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instance {
    pub id: InstanceId,
    pub region: String,
    pub lane: Lane,
}

impl Instance {
    pub fn new(id: InstanceId, region: impl Into<String>, lane: Lane) -> Self {
        Self {
            id,
            region: region.into(),
            lane,
        }
    }
}

/// The load balancers an instance belongs to for the duration of one run.
///
/// Never empty, never contains duplicates, keeps discovery order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadBalancerSet(Vec<LoadBalancerName>);

impl LoadBalancerSet {
    /// Build a set from discovered names, dropping repeats.
    ///
    /// Returns `None` when there is nothing to drain.
    pub fn new(names: impl IntoIterator<Item = LoadBalancerName>) -> Option<Self> {
        let mut unique: Vec<LoadBalancerName> = Vec::new();
        for name in names {
            if !unique.contains(&name) {
                unique.push(name);
            }
        }

        if unique.is_empty() {
            None
        } else {
            Some(Self(unique))
        }
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, LoadBalancerName> {
        self.0.iter()
    }
}

impl<'a> IntoIterator for &'a LoadBalancerSet {
    type Item = &'a LoadBalancerName;
    type IntoIter = std::slice::Iter<'a, LoadBalancerName>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Display for LoadBalancerSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.0.iter().map(|n| n.as_str()).collect();
        write!(f, "[{}]", names.join(", "))
    }
}

/// Health of one instance as reported by one load balancer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthState {
    /// Receiving traffic.
    InService,

    /// Registered but not receiving traffic.
    OutOfService,

    /// Registration still settling.
    Unknown,

    /// Deregistration in progress.
    Draining,

    /// The load balancer has no record of the instance, or could not be asked.
    Gone,

    /// Any other state the backend reports.
    Other(String),
}

impl HealthState {
    /// Map a backend state string onto a known state.
    pub fn parse(state: &str) -> Self {
        match state {
            "InService" => Self::InService,
            "OutOfService" => Self::OutOfService,
            "Unknown" => Self::Unknown,
            "draining" | "Draining" => Self::Draining,
            "Gone" => Self::Gone,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn is_in_service(&self) -> bool {
        matches!(self, Self::InService)
    }

    /// `Gone` counts as out of service: an instance the balancer does not
    /// know about receives no traffic from it.
    pub fn is_out_of_service(&self) -> bool {
        matches!(self, Self::OutOfService | Self::Gone)
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::InService => "InService",
            Self::OutOfService => "OutOfService",
            Self::Unknown => "Unknown",
            Self::Draining => "Draining",
            Self::Gone => "Gone",
            Self::Other(s) => s,
        }
    }
}

impl fmt::Display for HealthState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A load balancer and the instances it currently lists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadBalancerDescription {
    pub name: LoadBalancerName,
    pub instances: Vec<InstanceId>,
}

/// One entry of a health query response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceHealth {
    pub instance_id: InstanceId,
    pub state: HealthState,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_lane_defaults_to_not_set() {
        assert_eq!(Lane::from_tag(None).as_str(), "not-set");
        assert_eq!(Lane::from_tag(Some("canary")).as_str(), "canary");
        assert_eq!(Lane::default(), Lane::not_set());
    }

    #[test]
    fn test_load_balancer_set_rejects_empty() {
        assert!(LoadBalancerSet::new(Vec::new()).is_none());
    }

    #[test]
    fn test_load_balancer_set_dedupes_in_order() {
        let set = LoadBalancerSet::new(vec![
            LoadBalancerName::from("web"),
            LoadBalancerName::from("api"),
            LoadBalancerName::from("web"),
        ])
        .unwrap();

        let names: Vec<&str> = set.iter().map(|n| n.as_str()).collect();
        assert_eq!(names, vec!["web", "api"]);
        assert_eq!(set.to_string(), "[web, api]");
    }

    #[rstest]
    #[case("InService", HealthState::InService)]
    #[case("OutOfService", HealthState::OutOfService)]
    #[case("Unknown", HealthState::Unknown)]
    #[case("draining", HealthState::Draining)]
    #[case("Gone", HealthState::Gone)]
    #[case("Initial", HealthState::Other("Initial".to_string()))]
    fn test_health_state_parse(#[case] raw: &str, #[case] expected: HealthState) {
        assert_eq!(HealthState::parse(raw), expected);
    }

    #[rstest]
    #[case(HealthState::InService, true, false)]
    #[case(HealthState::OutOfService, false, true)]
    #[case(HealthState::Gone, false, true)]
    #[case(HealthState::Unknown, false, false)]
    #[case(HealthState::Draining, false, false)]
    fn test_health_state_predicates(
        #[case] state: HealthState,
        #[case] healthy: bool,
        #[case] out_of_service: bool,
    ) {
        assert_eq!(state.is_in_service(), healthy);
        assert_eq!(state.is_out_of_service(), out_of_service);
    }
}
