//! Live game session.
//!
//! `GameSession` owns one game instance: the combatants, the monster, the
//! round counter, and the shared content bundle. It is the transport-facing
//! surface; all rule decisions are delegated to `nightfall-core`, and
//! everything here is synchronous and deterministic so independent sessions
//! can run on separate threads without coordination.

use std::collections::BTreeMap;
use std::sync::Arc;

use nightfall_core::{
    Combatant, InvalidReason, MonsterState, PlayerCombatState, PlayerId, RacialActivation, Round,
    RoundLog, RoundOrchestrator, SubmissionStamp, SubmissionStatus, SubmitOutcome, TargetId,
    ValidationReport,
};

use nightfall_content::ContentBundle;

use crate::error::{Result, SessionError};

/// Serializable state of one session, for persistence and transfer.
///
/// Content is not part of the snapshot; a restored session re-attaches to
/// the shared bundle.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SessionSnapshot {
    pub round: Round,
    pub next_seq: u32,
    pub players: BTreeMap<PlayerId, Combatant>,
    pub monster: MonsterState,
}

/// One running game instance.
pub struct GameSession {
    content: Arc<ContentBundle>,
    players: BTreeMap<PlayerId, Combatant>,
    monster: MonsterState,
    round: Round,
    /// Arrival counter within the current round; stamps submissions so
    /// priority ties resolve by arrival order.
    next_seq: u32,
}

impl GameSession {
    pub fn new(content: Arc<ContentBundle>, monster_hp: i32) -> Self {
        Self {
            content,
            players: BTreeMap::new(),
            monster: MonsterState::new(monster_hp),
            round: 1,
            next_seq: 0,
        }
    }

    /// Rebuilds a session from a snapshot against the shared content bundle.
    pub fn restore(content: Arc<ContentBundle>, snapshot: SessionSnapshot) -> Self {
        Self {
            content,
            players: snapshot.players,
            monster: snapshot.monster,
            round: snapshot.round,
            next_seq: snapshot.next_seq,
        }
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            round: self.round,
            next_seq: self.next_seq,
            players: self.players.clone(),
            monster: self.monster,
        }
    }

    /// Adds a player with the named class and race at the given level.
    pub fn add_player(
        &mut self,
        id: PlayerId,
        class_name: &str,
        race_name: &str,
        level: u8,
        max_hp: i32,
    ) -> Result<()> {
        if self.players.contains_key(&id) {
            return Err(SessionError::DuplicatePlayer(id));
        }
        let class = self
            .content
            .classes
            .get(class_name)
            .ok_or_else(|| SessionError::UnknownClass(class_name.to_string()))?
            .clone();
        let race = self
            .content
            .races
            .get(race_name)
            .ok_or_else(|| SessionError::UnknownRace(race_name.to_string()))?
            .clone();

        let state = PlayerCombatState::new(
            id,
            class,
            race,
            level,
            &self.content.config,
            &self.content.abilities,
        )?;
        self.players.insert(id, Combatant::new(state, max_hp));

        tracing::info!(player = %id, class = class_name, race = race_name, level, "player joined");
        Ok(())
    }

    /// Removes a player mid-game.
    ///
    /// Pending submissions aimed at the departed player are invalidated so
    /// their owners may resubmit. Returns the affected players.
    pub fn remove_player(&mut self, id: PlayerId) -> Result<Vec<PlayerId>> {
        if self.players.remove(&id).is_none() {
            return Err(SessionError::UnknownPlayer(id));
        }

        let mut affected = Vec::new();
        for combatant in self.players.values_mut() {
            let status = combatant.state.submission_status();
            if let Some(action) = status.action
                && action.target == TargetId::Player(id)
            {
                combatant.state.invalidate_submission(InvalidReason::TargetMissing);
                affected.push(combatant.state.id());
            }
        }

        tracing::info!(player = %id, invalidated = affected.len(), "player left");
        Ok(affected)
    }

    /// Submits an action for the current round.
    ///
    /// The first accepted submission per player wins; later calls are
    /// rejected as values until the slot is invalidated or the round
    /// resolves.
    pub fn submit_action(
        &mut self,
        player: PlayerId,
        ability: impl Into<nightfall_core::AbilityId>,
        target: Option<TargetId>,
    ) -> Result<SubmitOutcome> {
        let stamp = SubmissionStamp::new(self.round, self.next_seq);
        let combatant = self
            .players
            .get_mut(&player)
            .ok_or(SessionError::UnknownPlayer(player))?;
        if !combatant.is_alive() {
            return Err(SessionError::PlayerDead(player));
        }

        let ability = ability.into();
        let outcome =
            combatant
                .state
                .submit_action(&self.content.abilities, ability.clone(), target, stamp);

        if outcome.success {
            self.next_seq += 1;
            tracing::debug!(player = %player, ability = %ability, "submission accepted");
        } else {
            tracing::debug!(player = %player, ability = %ability, reason = ?outcome.reason, "submission rejected");
        }
        Ok(outcome)
    }

    /// Activates a player's racial ability.
    pub fn use_racial_ability(&mut self, player: PlayerId) -> Result<RacialActivation> {
        let combatant = self
            .players
            .get_mut(&player)
            .ok_or(SessionError::UnknownPlayer(player))?;
        if !combatant.is_alive() {
            return Err(SessionError::PlayerDead(player));
        }
        let activation = combatant.state.use_racial_ability()?;
        tracing::info!(player = %player, ability = %activation.ability, "racial ability used");
        Ok(activation)
    }

    /// Re-validates every pending submission against current liveness.
    ///
    /// Call after any state change outside round resolution (the resolver
    /// runs its own pass). Returns the report per player that had something
    /// pending.
    pub fn revalidate_all(&mut self) -> Vec<(PlayerId, ValidationReport)> {
        let vitals: Vec<_> = self.players.values().map(Combatant::vitals).collect();
        let monster = self.monster.vitals();

        let mut reports = Vec::new();
        for combatant in self.players.values_mut() {
            if !combatant.state.submission_status().has_submitted {
                continue;
            }
            let id = combatant.state.id();
            let report =
                combatant
                    .state
                    .validate_submitted_action(&self.content.abilities, &vitals, monster);
            if !report.is_valid {
                tracing::debug!(player = %id, reason = ?report.reason, "submission invalidated");
            }
            reports.push((id, report));
        }
        reports
    }

    /// Resolves the current round and advances the round counter.
    pub fn resolve_round(&mut self) -> RoundLog {
        let round = self.round;
        tracing::info!(round, "resolving round");

        let orchestrator = RoundOrchestrator::new(&self.content.abilities);
        let log = orchestrator.resolve_round(round, &mut self.players, &mut self.monster);

        for event in &log.events {
            tracing::debug!(round, ?event, "round event");
        }
        tracing::info!(
            round,
            events = log.events.len(),
            monster_hp = self.monster.hp,
            "round resolved"
        );

        self.round += 1;
        self.next_seq = 0;
        log
    }

    pub fn round(&self) -> Round {
        self.round
    }

    pub fn monster(&self) -> &MonsterState {
        &self.monster
    }

    pub fn player(&self, id: PlayerId) -> Option<&Combatant> {
        self.players.get(&id)
    }

    pub fn player_mut(&mut self, id: PlayerId) -> Option<&mut Combatant> {
        self.players.get_mut(&id)
    }

    pub fn players(&self) -> impl Iterator<Item = &Combatant> {
        self.players.values()
    }

    pub fn submission_status(&self, id: PlayerId) -> Result<SubmissionStatus> {
        self.players
            .get(&id)
            .map(|c| c.state.submission_status())
            .ok_or(SessionError::UnknownPlayer(id))
    }

    /// The game ends when the monster falls or no player remains alive.
    pub fn is_over(&self) -> bool {
        !self.monster.is_alive() || self.players.values().all(|c| !c.is_alive())
    }
}
