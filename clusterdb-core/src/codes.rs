//! Server error codes.
//!
//! Only the codes the client reacts to are listed here.

/// A host could not be reached.
pub const HOST_UNREACHABLE: i32 = 6;
/// A host name could not be resolved.
pub const HOST_NOT_FOUND: i32 = 7;
/// A network operation on the server timed out.
pub const NETWORK_TIMEOUT: i32 = 89;
/// The server is shutting down.
pub const SHUTDOWN_IN_PROGRESS: i32 = 91;
/// The primary stepped down while the command ran.
pub const PRIMARY_STEPPED_DOWN: i32 = 189;
/// The operation exceeded its time limit on the server.
pub const EXCEEDED_TIME_LIMIT: i32 = 262;
/// Socket failure between cluster members.
pub const SOCKET_EXCEPTION: i32 = 9001;
/// The node is not the primary.
pub const NOT_MASTER: i32 = 10107;
/// The operation was interrupted by shutdown.
pub const INTERRUPTED_AT_SHUTDOWN: i32 = 11600;
/// The operation was interrupted by a replica set state change.
pub const INTERRUPTED_DUE_TO_REPL_STATE_CHANGE: i32 = 11602;
/// Not primary, and secondary reads are not allowed.
pub const NOT_MASTER_NO_SLAVE_OK: i32 = 13435;
/// The node is neither primary nor secondary (it is recovering).
pub const NOT_MASTER_OR_SECONDARY: i32 = 13436;

const NAMES: &[(i32, &str)] = &[
    (HOST_UNREACHABLE, "HostUnreachable"),
    (HOST_NOT_FOUND, "HostNotFound"),
    (NETWORK_TIMEOUT, "NetworkTimeout"),
    (SHUTDOWN_IN_PROGRESS, "ShutdownInProgress"),
    (PRIMARY_STEPPED_DOWN, "PrimarySteppedDown"),
    (EXCEEDED_TIME_LIMIT, "ExceededTimeLimit"),
    (SOCKET_EXCEPTION, "SocketException"),
    (NOT_MASTER, "NotMaster"),
    (INTERRUPTED_AT_SHUTDOWN, "InterruptedAtShutdown"),
    (
        INTERRUPTED_DUE_TO_REPL_STATE_CHANGE,
        "InterruptedDueToReplStateChange",
    ),
    (NOT_MASTER_NO_SLAVE_OK, "NotMasterNoSlaveOk"),
    (NOT_MASTER_OR_SECONDARY, "NotMasterOrSecondary"),
];

/// Codes signalling a topology change the client can ride out.
pub const TRANSIENT_TOPOLOGY_CODES: &[i32] = &[
    HOST_UNREACHABLE,
    HOST_NOT_FOUND,
    NETWORK_TIMEOUT,
    SHUTDOWN_IN_PROGRESS,
    PRIMARY_STEPPED_DOWN,
    EXCEEDED_TIME_LIMIT,
    SOCKET_EXCEPTION,
    NOT_MASTER,
    INTERRUPTED_AT_SHUTDOWN,
    INTERRUPTED_DUE_TO_REPL_STATE_CHANGE,
    NOT_MASTER_NO_SLAVE_OK,
    NOT_MASTER_OR_SECONDARY,
];

/// Codes confirming a primary failover on the server side.
///
/// Unlike the network codes in [`TRANSIENT_TOPOLOGY_CODES`], these prove the
/// write was not applied by a primary.
pub const FAILOVER_CODES: &[i32] = &[
    SHUTDOWN_IN_PROGRESS,
    PRIMARY_STEPPED_DOWN,
    NOT_MASTER,
    INTERRUPTED_AT_SHUTDOWN,
    INTERRUPTED_DUE_TO_REPL_STATE_CHANGE,
    NOT_MASTER_NO_SLAVE_OK,
    NOT_MASTER_OR_SECONDARY,
];

/// Look up the symbolic name of a known code.
#[must_use]
pub fn name(code: i32) -> Option<&'static str> {
    NAMES
        .iter()
        .find(|(known, _)| *known == code)
        .map(|(_, name)| *name)
}
