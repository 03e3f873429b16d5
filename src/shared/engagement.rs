use crate::shared::db::models::TipEngagementState;
use chrono::NaiveDateTime;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngagementAction {
    View,
    Like,
    Unlike,
    Bookmark,
    Unbookmark,
    Implement,
}

impl EngagementAction {
    pub fn parse(s: &str) -> Option<EngagementAction> {
        match s {
            "view" => Some(EngagementAction::View),
            "like" => Some(EngagementAction::Like),
            "unlike" => Some(EngagementAction::Unlike),
            "bookmark" => Some(EngagementAction::Bookmark),
            "unbookmark" => Some(EngagementAction::Unbookmark),
            "implement" => Some(EngagementAction::Implement),
            _ => None,
        }
    }
}

/// Changes to the tip's public counters caused by one engagement.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CounterDelta {
    pub views: i32,
    pub likes: i32,
    pub implementations: i32,
}

/// Applies `action` to the customer's engagement row in place. Counters move
/// only when the stored flag actually flips.
pub fn apply_action(
    state: &mut TipEngagementState,
    action: EngagementAction,
    notes: Option<String>,
    rating: Option<i32>,
    now: NaiveDateTime,
) -> CounterDelta {
    let mut delta = CounterDelta::default();
    match action {
        EngagementAction::View => {
            if !state.viewed {
                state.viewed = true;
                state.viewed_at = Some(now);
                delta.views = 1;
            }
        }
        EngagementAction::Like => {
            if !state.liked {
                state.liked = true;
                state.liked_at = Some(now);
                delta.likes = 1;
            }
        }
        EngagementAction::Unlike => {
            if state.liked {
                state.liked = false;
                state.liked_at = None;
                delta.likes = -1;
            }
        }
        EngagementAction::Bookmark => {
            if !state.bookmarked {
                state.bookmarked = true;
                state.bookmarked_at = Some(now);
            }
        }
        EngagementAction::Unbookmark => {
            state.bookmarked = false;
            state.bookmarked_at = None;
        }
        EngagementAction::Implement => {
            if !state.implemented {
                state.implemented = true;
                state.implemented_at = Some(now);
                delta.implementations = 1;
            }
            if notes.is_some() {
                state.implementation_notes = notes;
            }
            if rating.is_some() {
                state.implementation_rating = rating;
            }
        }
    }
    state.updated_at = now;
    delta
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn blank() -> TipEngagementState {
        TipEngagementState {
            viewed: false,
            liked: false,
            bookmarked: false,
            implemented: false,
            viewed_at: None,
            liked_at: None,
            bookmarked_at: None,
            implemented_at: None,
            implementation_notes: None,
            implementation_rating: None,
            updated_at: Utc::now().naive_utc(),
        }
    }

    #[test]
    fn liking_twice_counts_once() {
        let now = Utc::now().naive_utc();
        let mut state = blank();
        let first = apply_action(&mut state, EngagementAction::Like, None, None, now);
        let second = apply_action(&mut state, EngagementAction::Like, None, None, now);
        assert_eq!(first.likes, 1);
        assert_eq!(second.likes, 0);
        assert!(state.liked);
    }

    #[test]
    fn unlike_without_like_is_a_no_op() {
        let now = Utc::now().naive_utc();
        let mut state = blank();
        let delta = apply_action(&mut state, EngagementAction::Unlike, None, None, now);
        assert_eq!(delta, CounterDelta::default());

        apply_action(&mut state, EngagementAction::Like, None, None, now);
        let delta = apply_action(&mut state, EngagementAction::Unlike, None, None, now);
        assert_eq!(delta.likes, -1);
        assert!(state.liked_at.is_none());
    }

    #[test]
    fn implement_records_notes_and_rating() {
        let now = Utc::now().naive_utc();
        let mut state = blank();
        let delta = apply_action(
            &mut state,
            EngagementAction::Implement,
            Some(String::from("fixed the tap")),
            Some(5),
            now,
        );
        assert_eq!(delta.implementations, 1);
        assert_eq!(state.implementation_rating, Some(5));

        let again = apply_action(&mut state, EngagementAction::Implement, None, Some(4), now);
        assert_eq!(again.implementations, 0);
        assert_eq!(state.implementation_rating, Some(4));
        assert_eq!(state.implementation_notes.as_deref(), Some("fixed the tap"));
    }

    #[test]
    fn bookmarks_do_not_touch_counters() {
        let now = Utc::now().naive_utc();
        let mut state = blank();
        let delta = apply_action(&mut state, EngagementAction::Bookmark, None, None, now);
        assert_eq!(delta, CounterDelta::default());
        assert!(state.bookmarked);
        apply_action(&mut state, EngagementAction::Unbookmark, None, None, now);
        assert!(!state.bookmarked);
    }
}
