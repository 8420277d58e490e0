//! Worker message protocol.
//!
//! | Direction | kind           | payload              |
//! |-----------|----------------|----------------------|
//! | in        | `draw`         | `{url, data?}`       |
//! | in        | `draw:abort`   | none                 |
//! | in        | anything else  | routed to a handler  |
//! | out       | `draw:result`  | `{data, url}`        |
//! | out       | `draw:aborted` | none                 |

mod message;
mod port;

pub use message::{
    Command, InboundMessage, OutboundMessage, KIND_DRAW, KIND_DRAW_ABORT, KIND_DRAW_ABORTED,
    KIND_DRAW_RESULT,
};
pub use port::{worker_channel, HostPort, MessageSink, WorkerPort};
