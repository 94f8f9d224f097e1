//! Event processor - applies membership events to the platform
//!
//! One call to [`EventProcessor::handle`] per platform notification. The
//! lifecycle state lock is held from decision through application, platform
//! calls included, so a registry mutation is only ever committed after the
//! matching platform call has succeeded and overlapping events for the same
//! room converge instead of racing.
//!
//! Known caveat: deletion is only attempted on a membership transition. A
//! dynamic room whose delete fails and that nobody enters or leaves again
//! stays on the platform.

use std::sync::{Arc, Mutex, MutexGuard};

use tracing::{debug, info, instrument, trace, warn};

use crate::error::Result;
use crate::invariants;
use crate::models::{DynamicRoom, GuildId, MemberId, MembershipEvent, RoomId};
use crate::orchestrator::{Decision, MembershipUpdate, Orchestrator};
use crate::platform::{ErrorReporter, PlatformSession, TracingReporter};
use crate::state::{LifecycleSnapshot, LifecycleState, RoomPhase};
use crate::storage::TriggerRepository;

/// Trigger registry shared with the admin surface
pub type SharedTriggers = Arc<Mutex<dyn TriggerRepository>>;

pub struct EventProcessor {
    state: tokio::sync::Mutex<LifecycleState>,
    orchestrator: Orchestrator,
    triggers: SharedTriggers,
    platform: Arc<dyn PlatformSession>,
    reporter: Arc<dyn ErrorReporter>,
}

impl EventProcessor {
    pub fn new(platform: Arc<dyn PlatformSession>, triggers: SharedTriggers) -> Self {
        Self {
            state: tokio::sync::Mutex::new(LifecycleState::new()),
            orchestrator: Orchestrator::default(),
            triggers,
            platform,
            reporter: Arc::new(TracingReporter),
        }
    }

    pub fn with_orchestrator(mut self, orchestrator: Orchestrator) -> Self {
        self.orchestrator = orchestrator;
        self
    }

    pub fn with_reporter(mut self, reporter: Arc<dyn ErrorReporter>) -> Self {
        self.reporter = reporter;
        self
    }

    /// Handle one membership event
    ///
    /// Never fails: every problem is sent to the error reporter and the
    /// processor stays ready for the next event.
    #[instrument(skip_all, fields(member_id = %event.member, guild_id = %event.guild))]
    pub async fn handle(&self, event: MembershipEvent) {
        if let Err(e) = event.validate() {
            self.reporter.report(&event, &e);
            return;
        }
        if event.is_stationary() {
            trace!("Ignoring non-movement signal");
            return;
        }

        let mut state = self.state.lock().await;

        let (current_is_trigger, skip_join) = match self.current_is_trigger(&event) {
            Ok(is_trigger) => (is_trigger, false),
            Err(e) => {
                // Without the trigger lookup only the leave side can be decided
                self.reporter.report(&event, &e);
                (false, true)
            }
        };

        let mut decisions = self
            .orchestrator
            .decide(&event, &state, current_is_trigger);
        if skip_join {
            decisions.retain(|d| !matches!(d, Decision::UpdateOnly(MembershipUpdate::Join(_))));
        }

        for decision in decisions {
            if let Err(e) = self.apply(&mut state, &event, decision).await {
                self.reporter.report(&event, &e);
            }
        }

        invariants::assert_state_invariants(&state);
    }

    /// Read-only view of tracked rooms and owned rooms
    pub async fn snapshot(&self) -> LifecycleSnapshot {
        self.state.lock().await.snapshot()
    }

    /// Whether a room is currently owned by JTC
    pub async fn is_dynamic(&self, room: &RoomId) -> bool {
        self.state.lock().await.dynamic.is_dynamic(room)
    }

    async fn apply(
        &self,
        state: &mut LifecycleState,
        event: &MembershipEvent,
        decision: Decision,
    ) -> Result<()> {
        match decision {
            Decision::Noop => {
                trace!("No lifecycle change");
                Ok(())
            }
            Decision::UpdateOnly(MembershipUpdate::Leave(room)) => {
                let occupancy = state.membership.on_leave(&room, &event.member);
                debug!(room_id = %room, occupancy, "Member left room");
                Ok(())
            }
            Decision::UpdateOnly(MembershipUpdate::Join(room)) => {
                let occupancy = state.membership.on_join(&room, &event.member);
                debug!(room_id = %room, occupancy, "Member joined room");
                Ok(())
            }
            Decision::Delete { room, member } => self.reclaim(state, &room, &member).await,
            Decision::CreateAndMove {
                trigger,
                guild,
                owner,
                room_name,
            } => {
                self.provision(state, &trigger, &guild, &owner, &room_name)
                    .await?;
                invariants::assert_trigger_not_occupied(state, event, &trigger);
                Ok(())
            }
        }
    }

    /// Delete an emptied dynamic room, unregistering it only once the
    /// platform confirms the room is gone
    async fn reclaim(&self, state: &mut LifecycleState, room: &RoomId, member: &MemberId) -> Result<()> {
        state.membership.on_leave(room, member);
        info!(room_id = %room, phase = ?RoomPhase::Empty, "Dynamic room is empty, deleting");

        match self.platform.delete_room(room).await {
            Ok(()) => {}
            Err(e) if e.is_not_found() => {
                warn!(room_id = %room, "Dynamic room was already deleted on the platform");
            }
            Err(e) => return Err(e),
        }

        state.membership.forget(room);
        let record = state.dynamic.unregister(room)?;
        info!(
            room_id = %room,
            owner = %record.owner,
            phase = ?RoomPhase::Deleted,
            "Dynamic room deleted"
        );
        Ok(())
    }

    /// Create a personal room next to the trigger and move the member into it
    async fn provision(
        &self,
        state: &mut LifecycleState,
        trigger: &RoomId,
        guild: &GuildId,
        owner: &MemberId,
        room_name: &str,
    ) -> Result<()> {
        info!(room_id = %trigger, phase = ?RoomPhase::TriggerWait, "Member entered trigger room");

        let trigger_room = match self.platform.get_room(trigger).await {
            Ok(room) => room,
            Err(e) if e.is_not_found() => {
                self.drop_vanished_trigger(trigger);
                return Err(e);
            }
            Err(e) => return Err(e),
        };

        let room = self
            .platform
            .create_room(guild, room_name, trigger_room.parent_id.as_ref())
            .await?;

        if let Err(e) = self.platform.move_member(guild, owner, &room.id).await {
            // The member is still in the trigger room; don't leave an orphan behind
            if let Err(cleanup) = self.platform.delete_room(&room.id).await {
                warn!(
                    room_id = %room.id,
                    error = %cleanup,
                    "Failed to remove room after aborted move"
                );
            }
            return Err(e);
        }

        if cfg!(debug_assertions) {
            invariants::assert_not_trigger(&room.id, self.lookup_trigger(&room.id).unwrap_or(false));
        }
        state.dynamic.register(DynamicRoom::new(&room, owner.clone()));
        info!(
            room_id = %room.id,
            room_name = %room.name,
            owner = %owner,
            "Member moved to their own room"
        );
        Ok(())
    }

    /// Forget a trigger whose room was deleted outside of JTC
    fn drop_vanished_trigger(&self, trigger: &RoomId) {
        match self.lock_triggers().remove_trigger(trigger) {
            Ok(()) => warn!(room_id = %trigger, "Trigger room no longer exists, unregistered it"),
            Err(e) => warn!(room_id = %trigger, error = %e, "Failed to unregister vanished trigger room"),
        }
    }

    fn current_is_trigger(&self, event: &MembershipEvent) -> Result<bool> {
        match &event.current_room {
            Some(room) => self.lookup_trigger(room),
            None => Ok(false),
        }
    }

    fn lookup_trigger(&self, room: &RoomId) -> Result<bool> {
        self.lock_triggers().is_trigger(room)
    }

    fn lock_triggers(&self) -> MutexGuard<'_, dyn TriggerRepository + 'static> {
        match self.triggers.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                tracing::error!("Trigger registry mutex poisoned, recovering");
                poisoned.into_inner()
            }
        }
    }
}
