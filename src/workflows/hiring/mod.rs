//! Job application review workflow: commands, the per-application state machine, the
//! registry that owns applications, and the persisted list format.

pub mod application;
pub mod codec;
pub mod collection;
pub mod command;
pub mod domain;
pub mod manager;

pub use application::{
    transition, Application, ApplicationFields, ApplicationView, IllegalTransition,
    InvalidArgument, Transition,
};
pub use codec::{load, save, LoadError, MalformedReason, MalformedRecord, SaveError};
pub use collection::ApplicationCollection;
pub use command::{Command, InvalidCommand};
pub use domain::{Action, ApplicationId, ApplicationKind, Resolution, ReviewState, UnknownToken};
pub use manager::{ApplicationManager, ApplicationRow, ManagerError};
