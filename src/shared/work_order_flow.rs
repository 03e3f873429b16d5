pub const WORK_TYPES: &[&str] = &[
    "installation",
    "repair",
    "maintenance",
    "inspection",
    "removal",
    "upgrade",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkOrderStatus {
    Pending,
    Assigned,
    InProgress,
    OnHold,
    Completed,
    Cancelled,
}

impl WorkOrderStatus {
    pub fn parse(s: &str) -> Option<WorkOrderStatus> {
        match s {
            "pending" => Some(WorkOrderStatus::Pending),
            "assigned" => Some(WorkOrderStatus::Assigned),
            "in_progress" => Some(WorkOrderStatus::InProgress),
            "on_hold" => Some(WorkOrderStatus::OnHold),
            "completed" => Some(WorkOrderStatus::Completed),
            "cancelled" => Some(WorkOrderStatus::Cancelled),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            WorkOrderStatus::Pending => "pending",
            WorkOrderStatus::Assigned => "assigned",
            WorkOrderStatus::InProgress => "in_progress",
            WorkOrderStatus::OnHold => "on_hold",
            WorkOrderStatus::Completed => "completed",
            WorkOrderStatus::Cancelled => "cancelled",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, WorkOrderStatus::Completed | WorkOrderStatus::Cancelled)
    }

    /// Completion only follows actual work, so pending and assigned orders
    /// have to be started first.
    pub fn can_transition_to(&self, next: WorkOrderStatus) -> bool {
        use WorkOrderStatus::*;
        match (self, next) {
            (Pending, Assigned | InProgress | OnHold | Cancelled) => true,
            (Assigned, InProgress | OnHold | Cancelled) => true,
            (InProgress, OnHold | Completed | Cancelled) => true,
            (OnHold, Assigned | InProgress | Cancelled) => true,
            _ => false,
        }
    }
}

/// Labor plus parts, when either is known.
pub fn total_cost(labor: Option<f64>, parts: Option<f64>) -> Option<f64> {
    match (labor, parts) {
        (None, None) => None,
        (labor, parts) => Some(crate::shared::utils::round2(
            labor.unwrap_or(0.0) + parts.unwrap_or(0.0),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::WorkOrderStatus::*;
    use super::*;

    #[test]
    fn orders_have_to_start_before_completing() {
        assert!(!Pending.can_transition_to(Completed));
        assert!(!Assigned.can_transition_to(Completed));
        assert!(InProgress.can_transition_to(Completed));
        assert!(Pending.can_transition_to(InProgress));
    }

    #[test]
    fn held_orders_resume() {
        assert!(InProgress.can_transition_to(OnHold));
        assert!(OnHold.can_transition_to(InProgress));
        assert!(OnHold.can_transition_to(Assigned));
        assert!(!OnHold.can_transition_to(Pending));
    }

    #[test]
    fn terminal_states_are_final() {
        for from in [Completed, Cancelled] {
            assert!(from.is_terminal());
            for next in [Pending, Assigned, InProgress, OnHold, Completed, Cancelled] {
                assert!(!from.can_transition_to(next));
            }
        }
    }

    #[test]
    fn status_names_round_trip() {
        for status in [Pending, Assigned, InProgress, OnHold, Completed, Cancelled] {
            assert_eq!(WorkOrderStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(WorkOrderStatus::parse("open"), None);
    }

    #[test]
    fn total_cost_adds_known_parts() {
        assert_eq!(total_cost(Some(150000.0), Some(45000.5)), Some(195000.5));
        assert_eq!(total_cost(None, Some(20000.0)), Some(20000.0));
        assert_eq!(total_cost(None, None), None);
    }
}
