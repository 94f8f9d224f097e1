//! Developer guardrails and invariants
//!
//! Debug assertions for detecting impossible states during development.
//! These checks are compiled out in release builds.

use crate::models::{MembershipEvent, RoomId};
use crate::state::LifecycleState;

/// Validate that lifecycle state is internally consistent
pub fn assert_state_invariants(state: &LifecycleState) {
    // Empty member sets are removed eagerly
    for (room, members) in state.membership.iter() {
        debug_assert!(
            !members.is_empty(),
            "Room {} is tracked with an empty member set",
            room
        );
    }

    for record in state.dynamic.iter() {
        debug_assert!(
            !record.room_id.is_blank(),
            "Dynamic room record owned by {} has a blank room id",
            record.owner
        );
    }
}

/// A room can't be both a trigger and a room JTC owns
pub fn assert_not_trigger(room: &RoomId, is_trigger: bool) {
    debug_assert!(
        !is_trigger,
        "Room {} is registered as both trigger and dynamic room",
        room
    );
}

/// Members who entered a trigger room are never tracked inside it
pub fn assert_trigger_not_occupied(state: &LifecycleState, event: &MembershipEvent, trigger: &RoomId) {
    debug_assert!(
        !state.membership.contains(trigger, &event.member),
        "Member {} is tracked inside trigger room {}",
        event.member,
        trigger
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{GuildId, MemberId};

    #[test]
    fn test_valid_state() {
        let mut state = LifecycleState::new();
        state.membership.on_join(&RoomId::new("r"), &MemberId::new("m"));
        assert_state_invariants(&state);
    }

    #[test]
    fn test_trigger_not_occupied() {
        let state = LifecycleState::new();
        let event = MembershipEvent::new(
            GuildId::new("g"),
            MemberId::new("m"),
            None,
            Some(RoomId::new("t")),
        );
        assert_trigger_not_occupied(&state, &event, &RoomId::new("t"));
    }

    #[test]
    #[should_panic(expected = "both trigger and dynamic")]
    fn test_trigger_and_dynamic_conflict() {
        assert_not_trigger(&RoomId::new("r"), true);
    }
}
