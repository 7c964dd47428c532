//! Test/apply/rollback of output configurations proposed by a
//! configuration client.

use thiserror::Error;

use crate::backend::{Backend, ConfigurationResult, ModeRequest};
use crate::output::{OutputId, OutputState, Transform};
use crate::state::State;

/// Requested changes for one output; `None` keeps the current value.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct HeadChange {
    pub output: OutputId,
    pub mode: Option<ModeRequest>,
    pub scale: Option<f64>,
    pub transform: Option<Transform>,
    pub adaptive_sync: Option<bool>,
}

impl HeadChange {
    pub fn new(output: OutputId) -> Self {
        Self {
            output,
            ..Self::default()
        }
    }

    fn apply_to(&self, state: OutputState) -> OutputState {
        OutputState {
            mode: self.mode.map_or(state.mode, ModeRequest::resolve),
            scale: self.scale.unwrap_or(state.scale),
            transform: self.transform.unwrap_or(state.transform),
            adaptive_sync: self.adaptive_sync.unwrap_or(state.adaptive_sync),
        }
    }
}

/// A proposal, built against the configuration published under `serial`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct OutputConfiguration {
    pub serial: u32,
    pub heads: Vec<HeadChange>,
}

#[derive(Debug, Error, PartialEq)]
pub enum OutputConfigError {
    #[error("output {0} does not exist")]
    UnknownOutput(OutputId),
    #[error("output {output} rejected the proposed state")]
    TestFailed { output: OutputId },
    #[error("output {output} failed to commit")]
    CommitFailed { output: OutputId },
    #[error("configuration serial {serial} is stale (current {current})")]
    Cancelled { serial: u32, current: u32 },
}

impl<B: Backend> State<B> {
    pub(crate) fn handle_output_configuration(&mut self, configuration: OutputConfiguration, apply: bool) {
        let serial = configuration.serial;
        let result = if apply {
            self.apply_output_configuration(&configuration)
        } else {
            self.test_output_configuration(&configuration)
        };
        let reply = match result {
            Ok(()) => ConfigurationResult::Succeeded,
            Err(OutputConfigError::Cancelled { serial, current }) => {
                log::info!("[output] Configuration {} cancelled, current is {}", serial, current);
                ConfigurationResult::Cancelled
            }
            Err(e) => {
                log::warn!("[output] Configuration {} failed: {}", serial, e);
                ConfigurationResult::Failed
            }
        };
        self.backend.output_configuration_result(serial, reply);
    }

    /// Checks every head without changing any committed state.
    pub fn test_output_configuration(&mut self, configuration: &OutputConfiguration) -> Result<(), OutputConfigError> {
        let staged = self.stage_and_test(configuration)?;
        for output in staged {
            self.backend.rollback_output(output);
        }
        log::debug!("[output] Configuration {} passed test", configuration.serial);
        Ok(())
    }

    /// Tests every head, then commits them all and republishes.
    pub fn apply_output_configuration(&mut self, configuration: &OutputConfiguration) -> Result<(), OutputConfigError> {
        let staged = self.stage_and_test(configuration)?;

        let mut failure = None;
        for (i, head) in configuration.heads.iter().enumerate() {
            if !self.backend.commit_output(head.output) {
                for rest in &staged[i..] {
                    self.backend.rollback_output(*rest);
                }
                failure = Some(OutputConfigError::CommitFailed { output: head.output });
                break;
            }
            if let Some(output) = self.output_mut(head.output) {
                output.state = head.apply_to(output.state);
                log::info!(
                    "[output] {} is now {}x{} scale {} {:?}",
                    output.name,
                    output.state.mode.width,
                    output.state.mode.height,
                    output.state.scale,
                    output.state.transform
                );
            }
        }

        self.place_outputs();
        let ids: Vec<OutputId> = self.outputs.iter().map(|o| o.id).collect();
        for id in ids {
            self.arrange(id);
        }
        self.update_visibility();
        self.publish_output_configuration();

        match failure {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Stages each head in turn and tests it. The first failure rolls back
    /// everything staged so far and leaves later heads untouched.
    fn stage_and_test(&mut self, configuration: &OutputConfiguration) -> Result<Vec<OutputId>, OutputConfigError> {
        if configuration.serial != self.config_serial {
            return Err(OutputConfigError::Cancelled {
                serial: configuration.serial,
                current: self.config_serial,
            });
        }

        let mut staged = Vec::with_capacity(configuration.heads.len());
        for head in &configuration.heads {
            if self.output(head.output).is_none() {
                self.rollback_all(&staged);
                return Err(OutputConfigError::UnknownOutput(head.output));
            }

            if let Some(mode) = head.mode {
                self.backend.set_output_mode(head.output, mode);
            }
            if let Some(scale) = head.scale {
                self.backend.set_output_scale(head.output, scale);
            }
            if let Some(transform) = head.transform {
                self.backend.set_output_transform(head.output, transform);
            }
            if let Some(enabled) = head.adaptive_sync {
                self.backend.set_output_adaptive_sync(head.output, enabled);
            }
            staged.push(head.output);

            if !self.backend.test_output(head.output) {
                self.rollback_all(&staged);
                return Err(OutputConfigError::TestFailed { output: head.output });
            }
        }
        Ok(staged)
    }

    fn rollback_all(&mut self, staged: &[OutputId]) {
        for &output in staged {
            self.backend.rollback_output(output);
        }
    }
}
