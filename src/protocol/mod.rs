//! Wire types for the agent-to-agent task protocol.

mod jsonrpc;
mod request;
mod task;

pub use jsonrpc::{JSONRPC_VERSION, JsonRpcError, JsonRpcResponse, PARSE_ERROR_CODE, RequestId};
pub use request::{
    AuthenticationInfo, IncomingMessage, IncomingPart, PushNotificationConfig, SendTaskParams,
    SendTaskRequest, TaskConfiguration,
};
pub use task::{Artifact, Message, Part, Role, Task, TaskState, TaskStatus};
