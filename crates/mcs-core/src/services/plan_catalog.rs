use std::collections::BTreeMap;

use crate::error::{HostingError, Result};
use crate::models::Plan;

/// Read-only plan lookup, fixed at startup.
#[derive(Debug, Clone)]
pub struct PlanCatalog {
    plans: BTreeMap<String, Plan>,
}

impl PlanCatalog {
    pub fn new(plans: Vec<Plan>) -> Result<Self> {
        let mut by_id = BTreeMap::new();
        for plan in plans {
            if plan.memory_gb == 0 {
                return Err(HostingError::InvalidConfig(format!(
                    "plan '{}' has no memory",
                    plan.id
                )));
            }
            let id = plan.id.clone();
            if by_id.insert(id.clone(), plan).is_some() {
                return Err(HostingError::InvalidConfig(format!(
                    "duplicate plan '{id}'"
                )));
            }
        }
        Ok(Self { plans: by_id })
    }

    pub fn lookup(&self, plan_id: &str) -> Option<&Plan> {
        self.plans.get(plan_id)
    }

    /// All plans ordered by id.
    pub fn plans(&self) -> impl Iterator<Item = &Plan> {
        self.plans.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> PlanCatalog {
        PlanCatalog::new(vec![Plan::new("basic", 2), Plan::new("pro", 8)]).unwrap()
    }

    #[test]
    fn lookup_known_plan() {
        let catalog = catalog();
        let plan = catalog.lookup("pro").unwrap();
        assert_eq!(plan.memory_gb, 8);
    }

    #[test]
    fn lookup_unknown_plan_is_none() {
        assert!(catalog().lookup("enterprise").is_none());
        assert!(catalog().lookup("").is_none());
    }

    #[test]
    fn plans_are_sorted_by_id() {
        let ids: Vec<_> = catalog().plans().map(|p| p.id.clone()).collect();
        assert_eq!(ids, vec!["basic", "pro"]);
    }

    #[test]
    fn rejects_zero_memory() {
        let err = PlanCatalog::new(vec![Plan::new("free", 0)]).unwrap_err();
        assert!(matches!(err, HostingError::InvalidConfig(_)));
    }

    #[test]
    fn rejects_duplicates() {
        let err = PlanCatalog::new(vec![Plan::new("pro", 8), Plan::new("pro", 16)]).unwrap_err();
        assert!(matches!(err, HostingError::InvalidConfig(_)));
        assert!(err.to_string().contains("duplicate plan 'pro'"));
    }
}
