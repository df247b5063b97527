/// Livy session identifiers are integers assigned by the gateway.
pub type SessionId = i64;
