//! Candidate configuration lifecycle.
//!
//! ```text
//!             load_candidate
//!  Unstaged ─────────────────▶ Staged ──commit──▶ Committed
//!  Discarded ────────────────▶   │
//!                                └────discard───▶ Discarded
//! ```
//!
//! Checkpoints of the running and startup configuration are tracked
//! separately from the candidate state. Every transition is a fixed sequence
//! of device commands; none of them is transactional. When a step fails after
//! earlier steps already changed the device, the error is an
//! [`Error::Workflow`] naming the steps that were applied.

use std::path::Path;

use log::{debug, warn};
use regex::bytes::Regex;
use serde::Serialize;

use super::relay::FileRelay;
use super::session::Session;
use crate::channel::{InteractiveEvent, RemoteChannel};
use crate::error::{Error, LifecycleError, Result, TransportError};
use crate::platform::{ArtifactLayout, PlatformDefinition};

/// How a candidate is meant to be applied.
///
/// The device copies the candidate over the running configuration in both
/// cases; the mode is recorded so callers can tell staged replacements from
/// staged merges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LoadMode {
    Replace,
    Merge,
}

/// Where the candidate configuration is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ConfigState {
    Unstaged,
    Staged(LoadMode),
    Committed,
    Discarded,
}

/// Result of a commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub struct CommitOutcome {
    /// False when the candidate was applied but could not be deleted
    /// afterwards; the file is then still on the device.
    pub candidate_discarded: bool,
}

/// A device command plus the text to log in its place.
struct Step {
    command: String,
    shown: String,
}

impl Step {
    fn new(command: String) -> Self {
        Self {
            shown: command.clone(),
            command,
        }
    }

    fn redacted(command: String, shown: String) -> Self {
        Self { command, shown }
    }
}

/// State machine sequencing the configuration workflows.
#[derive(Debug, Clone)]
pub struct ConfigLifecycle {
    artifacts: ArtifactLayout,
    reload_command: String,
    reload_confirm: Regex,
    reload_reply: Regex,
    state: ConfigState,
    running_checkpoint: bool,
    startup_checkpoint: bool,
}

impl ConfigLifecycle {
    pub fn new(platform: &PlatformDefinition) -> Self {
        Self {
            artifacts: platform.artifacts.clone(),
            reload_command: platform.reload_command.clone(),
            reload_confirm: platform.reload_confirm.clone(),
            reload_reply: platform.reload_reply.clone(),
            state: ConfigState::Unstaged,
            running_checkpoint: false,
            startup_checkpoint: false,
        }
    }

    pub fn state(&self) -> ConfigState {
        self.state
    }

    pub fn has_running_checkpoint(&self) -> bool {
        self.running_checkpoint
    }

    pub fn has_startup_checkpoint(&self) -> bool {
        self.startup_checkpoint
    }

    /// Replace the running-config checkpoint with the current running config.
    pub async fn checkpoint_running<C: RemoteChannel>(
        &mut self,
        session: &mut Session<C>,
    ) -> Result<()> {
        let steps = [
            Step::new(self.artifacts.remove_command(&self.artifacts.running_checkpoint)),
            Step::new(self.artifacts.checkpoint_running_command()),
        ];
        match run_steps("checkpoint_running", session, &steps).await {
            Ok(_) => {
                self.running_checkpoint = true;
                Ok(())
            }
            Err(e) => {
                // Once the old checkpoint is deleted there is nothing to roll back to.
                if matches!(e, Error::Workflow { .. }) {
                    self.running_checkpoint = false;
                }
                Err(e)
            }
        }
    }

    /// Replace the startup-config checkpoint with the current startup config.
    pub async fn checkpoint_startup<C: RemoteChannel>(
        &mut self,
        session: &mut Session<C>,
    ) -> Result<()> {
        let steps = [
            Step::new(self.artifacts.remove_command(&self.artifacts.startup_checkpoint)),
            Step::new(self.artifacts.checkpoint_startup_command()),
        ];
        match run_steps("checkpoint_startup", session, &steps).await {
            Ok(_) => {
                self.startup_checkpoint = true;
                Ok(())
            }
            Err(e) => {
                if matches!(e, Error::Workflow { .. }) {
                    self.startup_checkpoint = false;
                }
                Err(e)
            }
        }
    }

    /// Stage `local` through the relay and pull it onto the device as the
    /// candidate. Any earlier candidate is replaced.
    pub async fn load_candidate<C: RemoteChannel, R: FileRelay>(
        &mut self,
        session: &mut Session<C>,
        relay: &R,
        local: &Path,
        mode: LoadMode,
    ) -> Result<()> {
        let staged = relay.stage(local).await?;
        let steps = [
            Step::new(self.artifacts.remove_command(&self.artifacts.candidate)),
            Step::redacted(
                self.artifacts.fetch_candidate_command(&staged.url),
                self.artifacts.fetch_candidate_command(&staged.redacted_url),
            ),
        ];

        match run_steps("load_candidate", session, &steps).await {
            Ok(_) => {
                self.transition(ConfigState::Staged(mode));
                Ok(())
            }
            Err(e) => {
                // The previous candidate is gone once the delete went through.
                if matches!(e, Error::Workflow { .. }) {
                    self.transition(ConfigState::Unstaged);
                }
                Err(e)
            }
        }
    }

    /// Device-computed diff between the running checkpoint and the candidate.
    pub async fn compare<C: RemoteChannel>(&self, session: &mut Session<C>) -> Result<String> {
        if !self.running_checkpoint {
            return Err(LifecycleError::NoRunningCheckpoint.into());
        }
        if !matches!(self.state, ConfigState::Staged(_)) {
            return Err(LifecycleError::NoCandidate.into());
        }
        session.execute(&self.artifacts.diff_command()).await
    }

    /// Apply the staged candidate, then delete it.
    ///
    /// A failed delete after a successful apply is logged and reported
    /// through [`CommitOutcome`]; it is not retried.
    pub async fn commit<C: RemoteChannel>(
        &mut self,
        session: &mut Session<C>,
    ) -> Result<CommitOutcome> {
        self.require_staged("commit")?;

        session
            .execute(&self.artifacts.apply_candidate_command())
            .await?;
        self.transition(ConfigState::Committed);

        let remove = self.artifacts.remove_command(&self.artifacts.candidate);
        let candidate_discarded = match session.execute(&remove).await {
            Ok(_) => true,
            Err(e) => {
                warn!(
                    "Candidate applied but {:?} failed, {} is still on the device: {}",
                    remove, self.artifacts.candidate, e
                );
                false
            }
        };
        Ok(CommitOutcome {
            candidate_discarded,
        })
    }

    /// Delete the staged candidate without applying it.
    pub async fn discard<C: RemoteChannel>(&mut self, session: &mut Session<C>) -> Result<()> {
        self.require_staged("discard")?;
        session
            .execute(&self.artifacts.remove_command(&self.artifacts.candidate))
            .await?;
        self.transition(ConfigState::Discarded);
        Ok(())
    }

    /// Restore the running-config checkpoint and reboot.
    ///
    /// There is no way back from this: the session is unusable afterwards.
    pub async fn rollback<C: RemoteChannel>(&mut self, session: &mut Session<C>) -> Result<()> {
        if !self.running_checkpoint {
            return Err(LifecycleError::NoRunningCheckpoint.into());
        }

        let restore = self.artifacts.restore_running_command();
        session.execute(&restore).await?;

        self.reboot(session).await.map_err(|e| Error::Workflow {
            operation: "rollback",
            completed: vec![restore],
            failed: self.reload_command.clone(),
            source: Box::new(e),
        })
    }

    /// Reload the device, answering its confirmation question.
    ///
    /// A refused reload is [`Error::CommandRejected`] and leaves the session
    /// open. Once the question is answered the session is closed; the device
    /// dropping the connection at that point counts as success.
    pub async fn reboot<C: RemoteChannel>(&self, session: &mut Session<C>) -> Result<()> {
        let ask = InteractiveEvent {
            input: self.reload_command.clone(),
            pattern: Some(self.reload_reply.clone()),
            timeout: None,
        };
        let reply = session.execute_interactive(&[ask]).await?;
        if !self.reload_confirm.is_match(reply.as_bytes()) {
            debug!("{:?} did not ask for confirmation", self.reload_command);
            return Err(Error::CommandRejected {
                command: self.reload_command.clone(),
                output: reply,
            });
        }

        match session
            .execute_interactive(&[InteractiveEvent::send_only("y")])
            .await
        {
            Ok(_) => debug!("Reload confirmed on {}", session.host()),
            Err(Error::Connection(failure))
                if matches!(failure.cause, TransportError::Disconnected) =>
            {
                debug!("{} dropped the session while reloading", session.host());
            }
            Err(e) => return Err(e),
        }

        session.abandon().await;
        Ok(())
    }

    fn require_staged(&self, operation: &'static str) -> Result<()> {
        match self.state {
            ConfigState::Staged(_) => Ok(()),
            state => Err(LifecycleError::InvalidTransition { operation, state }.into()),
        }
    }

    fn transition(&mut self, next: ConfigState) {
        debug!("Candidate state {:?} -> {:?}", self.state, next);
        self.state = next;
    }
}

/// Run `steps` in order and return their outputs.
///
/// A failure on the first step is returned as is; a later failure is
/// wrapped in [`Error::Workflow`] listing the steps already applied.
async fn run_steps<C: RemoteChannel>(
    operation: &'static str,
    session: &mut Session<C>,
    steps: &[Step],
) -> Result<Vec<String>> {
    let mut outputs = Vec::with_capacity(steps.len());
    let mut completed = Vec::new();

    for step in steps {
        match session.execute_as(&step.command, &step.shown).await {
            Ok(output) => {
                outputs.push(output);
                completed.push(step.shown.clone());
            }
            Err(e) if completed.is_empty() => return Err(e),
            Err(e) => {
                return Err(Error::Workflow {
                    operation,
                    completed,
                    failed: step.shown.clone(),
                    source: Box::new(e),
                });
            }
        }
    }
    Ok(outputs)
}
