use chrono::NaiveDateTime;

pub const CATEGORIES: &[&str] = &[
    "technical",
    "billing",
    "maintenance",
    "complaint",
    "inquiry",
    "other",
];

pub const PRIORITIES: &[&str] = &["low", "medium", "high", "critical"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TicketStatus {
    Open,
    InProgress,
    WaitingCustomer,
    Resolved,
    Closed,
    Cancelled,
}

impl TicketStatus {
    pub fn parse(s: &str) -> Option<TicketStatus> {
        match s {
            "open" => Some(TicketStatus::Open),
            "in_progress" => Some(TicketStatus::InProgress),
            "waiting_customer" => Some(TicketStatus::WaitingCustomer),
            "resolved" => Some(TicketStatus::Resolved),
            "closed" => Some(TicketStatus::Closed),
            "cancelled" => Some(TicketStatus::Cancelled),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TicketStatus::Open => "open",
            TicketStatus::InProgress => "in_progress",
            TicketStatus::WaitingCustomer => "waiting_customer",
            TicketStatus::Resolved => "resolved",
            TicketStatus::Closed => "closed",
            TicketStatus::Cancelled => "cancelled",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, TicketStatus::Closed | TicketStatus::Cancelled)
    }

    pub fn can_transition_to(&self, next: TicketStatus) -> bool {
        use TicketStatus::*;
        match (self, next) {
            (Open, InProgress | WaitingCustomer | Resolved | Closed | Cancelled) => true,
            (InProgress, WaitingCustomer | Resolved | Cancelled) => true,
            (WaitingCustomer, InProgress | Resolved | Cancelled) => true,
            (Resolved, Closed | Open) => true,
            _ => false,
        }
    }
}

pub fn minutes_between(from: NaiveDateTime, to: NaiveDateTime) -> i32 {
    let minutes = (to - from).num_minutes().max(0);
    i32::try_from(minutes).unwrap_or(i32::MAX)
}

#[cfg(test)]
mod tests {
    use super::TicketStatus::*;
    use super::*;

    #[test]
    fn open_can_move_anywhere_but_open() {
        for next in [InProgress, WaitingCustomer, Resolved, Closed, Cancelled] {
            assert!(Open.can_transition_to(next), "open -> {:?}", next);
        }
        assert!(!Open.can_transition_to(Open));
    }

    #[test]
    fn work_states_toggle_and_finish() {
        assert!(InProgress.can_transition_to(WaitingCustomer));
        assert!(WaitingCustomer.can_transition_to(InProgress));
        assert!(InProgress.can_transition_to(Resolved));
        assert!(!InProgress.can_transition_to(Closed));
        assert!(!WaitingCustomer.can_transition_to(Open));
    }

    #[test]
    fn resolved_closes_or_reopens() {
        assert!(Resolved.can_transition_to(Closed));
        assert!(Resolved.can_transition_to(Open));
        assert!(!Resolved.can_transition_to(InProgress));
    }

    #[test]
    fn terminal_states_are_final() {
        for from in [Closed, Cancelled] {
            assert!(from.is_terminal());
            for next in [Open, InProgress, WaitingCustomer, Resolved, Closed, Cancelled] {
                assert!(!from.can_transition_to(next));
            }
        }
    }

    #[test]
    fn status_names_round_trip() {
        for status in [Open, InProgress, WaitingCustomer, Resolved, Closed, Cancelled] {
            assert_eq!(TicketStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(TicketStatus::parse("pending"), None);
    }
}
