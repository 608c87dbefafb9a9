pub mod command;
pub mod dispatch;
pub mod editor;
pub mod error;
pub mod message;

pub use command::*;
pub use dispatch::*;
pub use editor::*;
pub use error::*;
pub use message::*;

#[cfg(test)]
mod tests {
    use super::{Command, DispatchError, EditorError, Message, PendingEdit};
    use std::any::TypeId;

    #[test]
    fn crate_root_reexports_dispatch_types() {
        let _ = TypeId::of::<Command>();
        let _ = TypeId::of::<Message>();
        let _ = TypeId::of::<DispatchError>();
        let _ = TypeId::of::<EditorError>();
        let _ = TypeId::of::<PendingEdit>();
    }

    #[test]
    fn crate_root_reexports_the_executor() {
        let _execute: fn(
            super::Command,
            &dyn triage_remote::IncidentApi,
        ) -> super::Message = super::execute;
    }
}
