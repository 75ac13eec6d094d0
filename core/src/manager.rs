use chrono::{DateTime, Utc};

use crate::*;

/// Callback handed to `start`, invoked exactly once with the terminal result.
pub type ResultCallback = Box<dyn FnOnce(MinigameResult)>;

/// Observer for manager notifications.
pub type EventObserver = Box<dyn FnMut(&ManagerEvent)>;

/// Notifications emitted around the session lifecycle.
#[derive(Clone, Debug, PartialEq)]
pub enum ManagerEvent {
    Started {
        kind: MinigameType,
        owner_id: String,
    },
    Finished {
        kind: MinigameType,
        owner_id: String,
        result: MinigameResult,
    },
    /// A precondition violation was rejected; never fatal.
    Blocked { reason: String },
}

/// Summary returned to the synchronous caller when a session ends.
#[derive(Clone, Debug, PartialEq)]
pub struct SessionEnd {
    pub kind: MinigameType,
    pub owner_id: String,
    pub result: MinigameResult,
}

struct Session {
    kind: MinigameType,
    owner_id: String,
    adapter: Box<dyn Minigame>,
    on_result: Option<ResultCallback>,
    started_at: DateTime<Utc>,
}

/// Minigame lifecycle manager.
///
/// Tracks the single active session, pauses the outer world while it runs,
/// and relays the terminal result to the caller-supplied callback. Everything
/// runs on one logical thread; the one-session invariant is a plain `Option`
/// check, not a lock.
#[derive(Default)]
pub struct MinigameManager {
    session: Option<Session>,
    observers: Vec<EventObserver>,
    paused: bool,
    input_captured: bool,
}

impl MinigameManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an observer for started/finished/blocked notifications.
    pub fn subscribe(&mut self, observer: EventObserver) {
        self.observers.push(observer);
    }

    pub fn has_active_session(&self) -> bool {
        self.session.is_some()
    }

    /// Type and owner of the active session, if any.
    pub fn active_session(&self) -> Option<(MinigameType, &str)> {
        self.session
            .as_ref()
            .map(|session| (session.kind, session.owner_id.as_str()))
    }

    /// The live adapter, for a front-end to drive the concrete widget.
    pub fn active(&self) -> Option<&dyn Minigame> {
        self.session.as_ref().map(|session| &*session.adapter)
    }

    pub fn active_mut(&mut self) -> Option<&mut dyn Minigame> {
        self.session.as_mut().map(|session| &mut *session.adapter)
    }

    /// Whether the outer world is suspended by an active session.
    pub fn paused(&self) -> bool {
        self.paused
    }

    /// Whether player input is routed to the minigame instead of the world.
    pub fn input_captured(&self) -> bool {
        self.input_captured
    }

    /// Seconds since the active session started, 0 when none is active.
    pub fn session_elapsed_secs(&self) -> u32 {
        match &self.session {
            Some(session) => (Utc::now() - session.started_at).num_seconds().max(0) as u32,
            None => 0,
        }
    }

    /// Starts a session of `kind` on behalf of `owner_id`.
    ///
    /// Fails without side effects when a session is already active, when
    /// `kind` is `None`, or when no constructor is registered for it; the
    /// existing session is never disturbed. Callers must treat an error as
    /// "did not start".
    pub fn start(
        &mut self,
        kind: MinigameType,
        owner_id: &str,
        difficulty: Difficulty,
        params: &Params,
        on_result: ResultCallback,
    ) -> Result<()> {
        if self.session.is_some() {
            log::warn!("Refusing to start {kind}: a session is already active");
            self.emit(&ManagerEvent::Blocked {
                reason: "a minigame session is already active".into(),
            });
            return Err(GameError::SessionActive);
        }
        if kind.is_none() {
            log::warn!("Refusing to start a session for minigame type none");
            self.emit(&ManagerEvent::Blocked {
                reason: "no minigame is attached".into(),
            });
            return Err(GameError::NoMinigame);
        }
        let Some(mut adapter) = construct_minigame(kind) else {
            log::error!("No minigame registered for type {kind}");
            return Err(GameError::UnknownMinigame);
        };

        adapter.setup(owner_id, difficulty, params)?;

        self.session = Some(Session {
            kind,
            owner_id: owner_id.to_owned(),
            adapter,
            on_result: Some(on_result),
            started_at: Utc::now(),
        });
        self.paused = true;
        self.input_captured = true;
        self.emit(&ManagerEvent::Started {
            kind,
            owner_id: owner_id.to_owned(),
        });
        Ok(())
    }

    /// Advances the active adapter's timers and resolves the session once the
    /// adapter reports a terminal result.
    pub fn tick(&mut self, dt: f32) -> Option<SessionEnd> {
        let result = match &mut self.session {
            Some(session) => {
                session.adapter.tick(dt);
                session.adapter.result()
            }
            None => None,
        }?;
        let session = self.session.take()?;
        Some(self.finish(session, result))
    }

    /// Unconditionally terminates the active session with Cancel; error
    /// recovery for stuck sessions.
    pub fn force_close(&mut self) -> Result<SessionEnd> {
        match self.session.take() {
            Some(mut session) => {
                session.adapter.cancel();
                Ok(self.finish(session, MinigameResult::Cancel))
            }
            None => {
                log::warn!("force_close called without an active session");
                Err(GameError::NoSession)
            }
        }
    }

    /// Single teardown path: resumes the world, notifies observers, invokes
    /// the caller callback once, and destroys the session.
    fn finish(&mut self, mut session: Session, result: MinigameResult) -> SessionEnd {
        self.paused = false;
        self.input_captured = false;

        self.emit(&ManagerEvent::Finished {
            kind: session.kind,
            owner_id: session.owner_id.clone(),
            result,
        });

        // Taken out of the session so a stale reference can never fire twice.
        if let Some(callback) = session.on_result.take() {
            callback(result);
        }

        SessionEnd {
            kind: session.kind,
            owner_id: session.owner_id,
            result,
        }
    }

    fn emit(&mut self, event: &ManagerEvent) {
        for observer in &mut self.observers {
            observer(event);
        }
    }
}
