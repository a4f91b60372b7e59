/// Poll/execute split for user-invoked tools
use std::fmt;

use tracing::{info, warn};

use crate::error::{PreconditionError, PrepError, PrepResult};
use crate::host::{EditMode, ObjectId, SceneGraph};

/// Severity of a user-facing report line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportLevel {
    Info,
    Warning,
}

/// Message shown to the user when a tool finishes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub level: ReportLevel,
    pub message: String,
}

impl Report {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: ReportLevel::Info,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: ReportLevel::Warning,
            message: message.into(),
        }
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// A tool invoked by a single user command.
///
/// [`run`] calls [`Operator::poll`] first and only calls
/// [`Operator::execute`] when it passes.
pub trait Operator<H: ?Sized> {
    /// Short identifier used in logs.
    fn name(&self) -> &'static str;

    /// Check whether the tool can run against the current host state.
    fn poll(&self, host: &H) -> Result<(), PreconditionError>;

    /// Perform the tool. Only called after `poll` succeeded.
    fn execute(&mut self, host: &mut H) -> PrepResult<Report>;
}

/// Poll then execute `op`, logging the result.
///
/// A failed poll returns [`PrepError::Precondition`] without calling
/// `execute`.
pub fn run<H, O>(op: &mut O, host: &mut H) -> PrepResult<Report>
where
    H: ?Sized,
    O: Operator<H> + ?Sized,
{
    if let Err(reason) = op.poll(host) {
        warn!(operator = op.name(), %reason, "Operator cancelled");
        return Err(PrepError::Precondition(reason));
    }
    let report = op.execute(host).inspect_err(|err| {
        warn!(operator = op.name(), %err, "Operator failed");
    })?;
    info!(operator = op.name(), message = %report, "Operator finished");
    Ok(report)
}

/// Precondition: the host is in `expected` mode
pub fn require_mode<H: SceneGraph + ?Sized>(
    host: &H,
    expected: EditMode,
) -> Result<(), PreconditionError> {
    let actual = host.mode();
    if actual == expected {
        Ok(())
    } else {
        Err(PreconditionError::WrongMode { expected, actual })
    }
}

/// The single selected object, or why there isn't one
pub fn single_selection<H: SceneGraph + ?Sized>(host: &H) -> Result<ObjectId, PreconditionError> {
    match host.selected_objects().as_slice() {
        [] => Err(PreconditionError::NoSelection),
        [only] => Ok(*only),
        many => Err(PreconditionError::MultipleSelection(many.len())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::Scene;

    struct Counter {
        executed: u32,
    }

    impl Operator<Scene> for Counter {
        fn name(&self) -> &'static str {
            "counter"
        }

        fn poll(&self, host: &Scene) -> Result<(), PreconditionError> {
            require_mode(host, EditMode::Edit)
        }

        fn execute(&mut self, _host: &mut Scene) -> PrepResult<Report> {
            self.executed += 1;
            Ok(Report::info("done"))
        }
    }

    #[test]
    fn test_poll_guards_execute() {
        let mut scene = Scene::new();
        let mut op = Counter { executed: 0 };

        let err = run(&mut op, &mut scene).unwrap_err();
        assert_eq!(
            err,
            PrepError::Precondition(PreconditionError::WrongMode {
                expected: EditMode::Edit,
                actual: EditMode::Object,
            })
        );
        assert_eq!(op.executed, 0);

        scene.set_mode(EditMode::Edit);
        let report = run(&mut op, &mut scene).unwrap();
        assert_eq!(report, Report::info("done"));
        assert_eq!(op.executed, 1);
    }
}
