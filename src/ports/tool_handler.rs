//! Tool Handler Port - Interface for the executable body of a tool.
//!
//! The dispatcher has already checked registration, phase and argument
//! schema by the time a handler runs, so handlers only decode their typed
//! arguments and do the work.
//!
//! # Example
//!
//! ```ignore
//! struct ConfirmOrder;
//!
//! #[async_trait]
//! impl ToolHandler for ConfirmOrder {
//!     async fn call(&self, ctx: &ToolContext<'_>, arguments: Value) -> Result<ToolOutcome, DialogueError> {
//!         let args: ConfirmArgs = decode_arguments("confirm_order", arguments)?;
//!         Ok(ToolOutcome::reply(json!({"confirmed": args.confirmed})).with_field("confirmed", args.confirmed))
//!     }
//! }
//! ```

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::domain::content::ContentLibrary;
use crate::domain::conversation::tools::ToolOutcome;
use crate::domain::conversation::{DialogueError, Session};
use crate::domain::records::NewRecord;
use crate::domain::foundation::RecordId;

use super::RecordStore;

/// What a handler may read and where it may write.
pub struct ToolContext<'a> {
    /// Session as of this point in the turn, including updates from
    /// tools that already ran.
    pub session: &'a Session,
    pub content: &'a ContentLibrary,
    pub store: &'a dyn RecordStore,
}

impl<'a> ToolContext<'a> {
    /// Appends a record for the session's variant and caller.
    pub async fn append(&self, kind: &str, payload: Value) -> Result<RecordId, DialogueError> {
        let record = NewRecord::new(
            self.session.id(),
            self.session.user_id().cloned(),
            kind,
            payload,
        );
        Ok(self.store.append(self.session.variant(), record).await?)
    }
}

/// Executable body of a registered tool.
#[async_trait]
pub trait ToolHandler: Send + Sync {
    /// Runs the tool with already-validated arguments.
    ///
    /// # Errors
    ///
    /// `PersistenceUnavailable` when a write fails; other errors are
    /// reported back to the conversation driver as a rejected call.
    async fn call(&self, ctx: &ToolContext<'_>, arguments: Value) -> Result<ToolOutcome, DialogueError>;
}

/// Decodes validated arguments into a handler's typed argument struct.
pub fn decode_arguments<T: DeserializeOwned>(tool: &str, arguments: Value) -> Result<T, DialogueError> {
    let arguments = if arguments.is_null() {
        Value::Object(Default::default())
    } else {
        arguments
    };
    serde_json::from_value(arguments)
        .map_err(|e| DialogueError::internal(format!("could not decode arguments for '{}': {}", tool, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Deserialize)]
    struct Args {
        item_id: String,
        #[serde(default)]
        quantity: Option<u32>,
    }

    #[test]
    fn decodes_typed_arguments() {
        let args: Args = decode_arguments("add_item", json!({"item_id": "milk"})).unwrap();
        assert_eq!(args.item_id, "milk");
        assert!(args.quantity.is_none());
    }

    #[derive(Debug, Deserialize)]
    struct NoArgs {}

    #[test]
    fn null_decodes_as_empty_object() {
        let _: NoArgs = decode_arguments("show_cart", Value::Null).unwrap();
    }

    #[test]
    fn decode_failure_is_internal() {
        let err = decode_arguments::<Args>("add_item", json!({"quantity": 2})).unwrap_err();
        assert!(matches!(err, DialogueError::Internal(_)));
    }
}
