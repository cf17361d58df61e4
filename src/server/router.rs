//! Action routing: one entry point per transport event.
//!
//! The router owns the registry, the spell catalog and the root RNG.
//! Each call computes under at most one session lock and returns the
//! complete batch of addressed events; the transport only delivers.
//! Personalized state updates (each recipient sees their own seat) are
//! built here, never inside the session.

use std::sync::{Arc, Mutex};

use super::error::ActionError;
use super::message::{ClientAction, Outbound, RosterEntry, ServerEvent};
use super::registry::SessionRegistry;
use crate::cards::SpellCatalog;
use crate::core::{BattleRng, EntityData};
use crate::session::{ConnectionId, DisconnectOutcome, Session, SessionCode};

/// Stateful dispatcher for a fleet of sessions.
#[derive(Debug)]
pub struct Router {
    registry: SessionRegistry,
    catalog: Arc<SpellCatalog>,
    rng: Mutex<BattleRng>,
}

impl Router {
    /// Create a router over a spell catalog. The RNG seeds session
    /// streams and join codes.
    #[must_use]
    pub fn new(catalog: SpellCatalog, rng: BattleRng) -> Self {
        Self {
            registry: SessionRegistry::new(),
            catalog: Arc::new(catalog),
            rng: Mutex::new(rng),
        }
    }

    /// The session registry, for transport-level introspection.
    #[must_use]
    pub fn registry(&self) -> &SessionRegistry {
        &self.registry
    }

    /// Greet a fresh connection.
    #[must_use]
    pub fn connect(&self, connection: ConnectionId) -> Vec<Outbound> {
        vec![Outbound {
            to: connection,
            event: ServerEvent::Connected {
                message: "Connected to the arena".to_owned(),
            },
        }]
    }

    /// Parse and handle one raw JSON request.
    pub fn handle_json(&self, connection: ConnectionId, text: &str) -> Vec<Outbound> {
        match serde_json::from_str::<ClientAction>(text) {
            Ok(action) => self.handle(connection, action),
            Err(err) => vec![Outbound {
                to: connection,
                event: ServerEvent::Failure {
                    message: ActionError::Malformed(err.to_string()).to_string(),
                },
            }],
        }
    }

    /// Handle one client action. Rejections come back to the requester
    /// alone; successful mutations broadcast to every member.
    pub fn handle(&self, connection: ConnectionId, action: ClientAction) -> Vec<Outbound> {
        let joining = matches!(action, ClientAction::JoinSession { .. });
        match self.dispatch(connection, action) {
            Ok(events) => events,
            Err(err) => {
                let message = err.to_string();
                let event = if joining {
                    ServerEvent::JoinFailure { message }
                } else {
                    ServerEvent::Failure { message }
                };
                vec![Outbound {
                    to: connection,
                    event,
                }]
            }
        }
    }

    /// Tear down a closed connection: vacate its seat, hand off the host
    /// flag, discard the session once the last member leaves. An
    /// abandonment mid-battle can decide the game.
    pub fn disconnect(&self, connection: ConnectionId) -> Vec<Outbound> {
        let Some(code) = self.registry.unbind(connection) else {
            return Vec::new();
        };
        let Some(session) = self.registry.get(&code) else {
            return Vec::new();
        };
        let mut session = session.lock().expect("session lock poisoned");
        match session.disconnect(connection) {
            DisconnectOutcome::NotMember => Vec::new(),
            DisconnectOutcome::SessionEmpty => {
                self.registry.remove(&code);
                Vec::new()
            }
            DisconnectOutcome::StillActive => {
                let mut events = state_updates(&session);
                if let Some(win) = session.check_win() {
                    events.extend(broadcast(
                        &session,
                        ServerEvent::Win {
                            side: win.side,
                            entities: win.entities,
                        },
                    ));
                }
                events
            }
        }
    }

    fn dispatch(
        &self,
        connection: ConnectionId,
        action: ClientAction,
    ) -> Result<Vec<Outbound>, ActionError> {
        match action {
            ClientAction::CreateSession { entity } => self.create_session(connection, entity),
            ClientAction::JoinSession { code, entity } => {
                self.join_session(connection, code, entity)
            }
            ClientAction::AddPassiveEntity { code, entity } => {
                self.with_member_session(connection, &code, |session| {
                    session.join(None, entity)?;
                    Ok(state_updates(session))
                })
            }
            ClientAction::MoveEntity {
                code,
                from_slot,
                to_slot,
            } => self.with_member_session(connection, &code, |session| {
                session.move_combatant(from_slot, to_slot)?;
                Ok(state_updates(session))
            }),
            ClientAction::SetReady { code, deck } => {
                self.with_member_session(connection, &code, |session| {
                    let started = session.set_ready(connection, &deck)?;
                    let mut events = Vec::new();
                    if started {
                        events.extend(broadcast(session, ServerEvent::BattleStarted));
                    }
                    events.extend(state_updates(session));
                    Ok(events)
                })
            }
            ClientAction::ClearReady { code } => {
                self.with_member_session(connection, &code, |session| {
                    session.clear_ready(connection)?;
                    Ok(state_updates(session))
                })
            }
            ClientAction::SelectCard { code, choice } => {
                self.with_member_session(connection, &code, |session| {
                    session.select_card(connection, choice, &self.catalog)?;
                    Ok(self.after_selection(session))
                })
            }
            ClientAction::SelectVictims { code, victims } => {
                self.with_member_session(connection, &code, |session| {
                    session.select_victims(connection, victims)?;
                    Ok(self.after_selection(session))
                })
            }
            ClientAction::SetHand { code, hand } => {
                self.with_member_session(connection, &code, |session| {
                    session.set_hand(connection, hand)?;
                    Ok(state_updates(session))
                })
            }
        }
    }

    fn create_session(
        &self,
        connection: ConnectionId,
        entity: EntityData,
    ) -> Result<Vec<Outbound>, ActionError> {
        let session = {
            let mut rng = self.rng.lock().expect("router rng poisoned");
            let (code, session) = self.registry.create(&mut rng);
            self.registry.bind(connection, code);
            session
        };
        let mut session = session.lock().expect("session lock poisoned");
        session.join(Some(connection), entity).map_err(ActionError::from)?;
        Ok(state_updates(&session))
    }

    fn join_session(
        &self,
        connection: ConnectionId,
        code: SessionCode,
        entity: EntityData,
    ) -> Result<Vec<Outbound>, ActionError> {
        let session = self
            .registry
            .get(&code)
            .ok_or_else(|| ActionError::UnknownSession(code.clone()))?;
        let mut session = session.lock().expect("session lock poisoned");
        session.join(Some(connection), entity)?;
        self.registry.bind(connection, code);
        Ok(state_updates(&session))
    }

    /// A selection arrived: resolve the round if it was the last one,
    /// otherwise broadcast the updated pending state.
    fn after_selection(&self, session: &mut Session) -> Vec<Outbound> {
        let Some(report) = session.try_resolve_round(&self.catalog) else {
            return state_updates(session);
        };
        let mut events = broadcast(
            session,
            ServerEvent::RoundTrace {
                trace: report.trace,
                snapshot: session.snapshot(),
            },
        );
        if let Some(win) = session.check_win() {
            events.extend(broadcast(
                session,
                ServerEvent::Win {
                    side: win.side,
                    entities: win.entities,
                },
            ));
        }
        events
    }

    fn with_member_session<F>(
        &self,
        connection: ConnectionId,
        code: &SessionCode,
        f: F,
    ) -> Result<Vec<Outbound>, ActionError>
    where
        F: FnOnce(&mut Session) -> Result<Vec<Outbound>, ActionError>,
    {
        let session = self
            .registry
            .get(code)
            .ok_or_else(|| ActionError::UnknownSession(code.clone()))?;
        let mut session = session.lock().expect("session lock poisoned");
        if !session.is_member(connection) {
            return Err(ActionError::NotAMember(code.clone()));
        }
        f(&mut session)
    }
}

/// Personalized state broadcast: same snapshot, each recipient's seat.
fn state_updates(session: &Session) -> Vec<Outbound> {
    let snapshot = session.snapshot();
    let roster: Vec<RosterEntry> = session
        .participants
        .iter()
        .map(|p| RosterEntry {
            seat: p.seat,
            ready: p.ready,
            host: p.host,
        })
        .collect();
    session
        .participants
        .iter()
        .map(|p| Outbound {
            to: p.connection,
            event: ServerEvent::StateUpdate {
                code: session.code.clone(),
                snapshot: snapshot.clone(),
                seat: p.seat,
                roster: roster.clone(),
            },
        })
        .collect()
}

/// Deliver the same event to every participant.
fn broadcast(session: &Session, event: ServerEvent) -> Vec<Outbound> {
    session
        .participants
        .iter()
        .map(|p| Outbound {
            to: p.connection,
            event: event.clone(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Element;
    use rustc_hash::FxHashMap;

    fn entity(name: &str) -> EntityData {
        EntityData {
            name: name.into(),
            element: Element::from("fire"),
            max_health: 300,
            critical_rating: 0,
            augments: FxHashMap::default(),
            deck: Vec::new(),
            super_vril_chance: 0.0,
        }
    }

    fn router() -> Router {
        Router::new(SpellCatalog::default(), BattleRng::new(17))
    }

    fn created_code(events: &[Outbound]) -> SessionCode {
        match &events[0].event {
            ServerEvent::StateUpdate { code, .. } => code.clone(),
            other => panic!("expected state update, got {other:?}"),
        }
    }

    #[test]
    fn test_connect_greets() {
        let events = router().connect(ConnectionId(1));
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0].event, ServerEvent::Connected { .. }));
    }

    #[test]
    fn test_create_then_join_broadcasts_to_both() {
        let router = router();
        let events = router.handle(
            ConnectionId(1),
            ClientAction::CreateSession {
                entity: entity("Host"),
            },
        );
        assert_eq!(events.len(), 1);
        let code = created_code(&events);

        let events = router.handle(
            ConnectionId(2),
            ClientAction::JoinSession {
                code: code.clone(),
                entity: entity("Guest"),
            },
        );
        assert_eq!(events.len(), 2);
        let recipients: Vec<ConnectionId> = events.iter().map(|o| o.to).collect();
        assert!(recipients.contains(&ConnectionId(1)));
        assert!(recipients.contains(&ConnectionId(2)));

        // Each recipient sees their own seat.
        for outbound in &events {
            let ServerEvent::StateUpdate { seat, roster, .. } = &outbound.event else {
                panic!("expected state update");
            };
            assert_eq!(roster.len(), 2);
            assert_eq!(seat.index() as u64 + 1, outbound.to.0);
        }
    }

    #[test]
    fn test_join_unknown_code_fails() {
        let router = router();
        let events = router.handle(
            ConnectionId(1),
            ClientAction::JoinSession {
                code: SessionCode::from("XXXX"),
                entity: entity("Guest"),
            },
        );
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].to, ConnectionId(1));
        assert!(matches!(events[0].event, ServerEvent::JoinFailure { .. }));
    }

    #[test]
    fn test_non_member_rejected() {
        let router = router();
        let events = router.handle(
            ConnectionId(1),
            ClientAction::CreateSession {
                entity: entity("Host"),
            },
        );
        let code = created_code(&events);

        let events = router.handle(ConnectionId(9), ClientAction::ClearReady { code });
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0].event, ServerEvent::Failure { .. }));
    }

    #[test]
    fn test_malformed_json_fails() {
        let router = router();
        let events = router.handle_json(ConnectionId(1), "{ not json");
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0].event, ServerEvent::Failure { .. }));
    }

    #[test]
    fn test_last_disconnect_discards_session() {
        let router = router();
        let events = router.handle(
            ConnectionId(1),
            ClientAction::CreateSession {
                entity: entity("Host"),
            },
        );
        let code = created_code(&events);
        assert_eq!(router.registry().len(), 1);

        let events = router.disconnect(ConnectionId(1));
        assert!(events.is_empty());
        assert!(router.registry().get(&code).is_none());
    }

    #[test]
    fn test_disconnect_reassigns_host() {
        let router = router();
        let events = router.handle(
            ConnectionId(1),
            ClientAction::CreateSession {
                entity: entity("Host"),
            },
        );
        let code = created_code(&events);
        router.handle(
            ConnectionId(2),
            ClientAction::JoinSession {
                code,
                entity: entity("Guest"),
            },
        );

        let events = router.disconnect(ConnectionId(1));
        assert_eq!(events.len(), 1);
        let ServerEvent::StateUpdate { roster, .. } = &events[0].event else {
            panic!("expected state update");
        };
        assert!(roster[0].host);
    }
}
